/// Weekly class timetable core
///
/// Loads a flat list of class sessions, filters them by group, program,
/// semester, degree level, session type, faculty and week, and lays the
/// result out on a Monday-to-Friday grid of 15-minute slots.
pub mod config;
pub mod error;
pub mod logging;
pub mod state;
pub mod timetable;
pub mod week;

pub use error::{ErrorKind, Result, TimetableError};
pub use state::data::{FilterKey, FilterState, ScheduleRecord, Weekday};
pub use state::layout::{Layout, ScheduleSlot};
pub use timetable::{compose, LayoutResult, Timetable};
pub use week::{Direction, WeekRange};
