/// Schedule Layout Builder
///
/// Maps filtered records onto the weekly grid: one column per weekday and
/// one row per 15-minute slot counted from 08:00. Sessions that collide in
/// time are all kept; the grid does not stack or split them.
use std::collections::BTreeMap;

use super::data::{ScheduleRecord, Weekday};
use crate::error::TimetableError;

/// Length of one grid slot in minutes
pub const SLOT_MINUTES: i32 = 15;

/// Minutes since midnight of the first slot (08:00)
pub const GRID_START_MINUTES: i32 = 8 * 60;

/// A record placed on the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSlot {
    pub weekday: Weekday,
    /// Slot index of the start, 0 = 08:00
    pub start_slot: u32,
    /// Number of slots covered, always at least 1
    pub span: u32,
    pub record: ScheduleRecord,
}

impl ScheduleSlot {
    pub fn end_slot(&self) -> u32 {
        self.start_slot + self.span
    }
}

/// Per-weekday placement plus the records that could not be placed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    days: BTreeMap<Weekday, Vec<ScheduleSlot>>,
    rejected: Vec<RejectedRecord>,
}

/// A record left out of the grid because of its time fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    pub id: String,
    pub reason: String,
}

impl Layout {
    /// All five weekdays present, each empty
    pub fn empty() -> Self {
        Layout {
            days: Weekday::ALL.iter().map(|day| (*day, Vec::new())).collect(),
            rejected: Vec::new(),
        }
    }

    pub fn day(&self, weekday: Weekday) -> &[ScheduleSlot] {
        self.days.get(&weekday).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn days(&self) -> impl Iterator<Item = (Weekday, &[ScheduleSlot])> {
        self.days.iter().map(|(day, slots)| (*day, slots.as_slice()))
    }

    pub fn rejected(&self) -> &[RejectedRecord] {
        &self.rejected
    }

    /// Number of placed records across the week
    pub fn placed_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    /// Last occupied slot, used to size the drawing
    pub fn max_end_slot(&self) -> u32 {
        self.days
            .values()
            .flatten()
            .map(ScheduleSlot::end_slot)
            .max()
            .unwrap_or(0)
    }
}

/// Parse "HH:MM" into minutes since midnight
pub fn parse_clock(value: &str) -> Option<i32> {
    let (hours, minutes) = value.trim().split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Slot index for a wall-clock time; negative before 08:00
pub fn slot_index(minutes_since_midnight: i32) -> i32 {
    (minutes_since_midnight - GRID_START_MINUTES).div_euclid(SLOT_MINUTES)
}

/// Compute `(start_slot, span)` for one record
pub fn place(record: &ScheduleRecord) -> Result<(u32, u32), TimetableError> {
    let out_of_grid = || TimetableError::OutOfGridTime {
        id: record.id.clone(),
        start: record.start_time.clone(),
        end: record.end_time.clone(),
    };

    let start = parse_clock(&record.start_time).ok_or_else(out_of_grid)?;
    let end = parse_clock(&record.end_time).ok_or_else(out_of_grid)?;

    let start_slot = slot_index(start);
    let span = slot_index(end) - start_slot;
    if start_slot < 0 || span <= 0 {
        return Err(out_of_grid());
    }

    Ok((start_slot as u32, span as u32))
}

/// Group records by weekday and place them on the slot grid.
///
/// Records with an unknown weekday are dropped silently. Records whose
/// times fall before 08:00 or do not span at least one slot are logged
/// and reported in [`Layout::rejected`].
pub fn build_layout(records: &[ScheduleRecord]) -> Layout {
    let mut layout = Layout::empty();

    let mut by_day: BTreeMap<Weekday, Vec<&ScheduleRecord>> = BTreeMap::new();
    for record in records {
        match Weekday::parse(&record.weekday) {
            Some(day) => by_day.entry(day).or_default().push(record),
            None => tracing::debug!(id = %record.id, weekday = %record.weekday, "not a grid weekday"),
        }
    }

    for (day, mut day_records) in by_day {
        // zero-padded "HH:MM" sorts chronologically as a string
        day_records.sort_by(|a, b| a.start_time.cmp(&b.start_time));

        let slots = layout.days.entry(day).or_default();
        for record in day_records {
            match place(record) {
                Ok((start_slot, span)) => slots.push(ScheduleSlot {
                    weekday: day,
                    start_slot,
                    span,
                    record: record.clone(),
                }),
                Err(err) => {
                    tracing::warn!(kind = ?err.kind(), "{}; left out of the grid", err);
                    layout.rejected.push(RejectedRecord {
                        id: record.id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }
    }

    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, weekday: &str, start: &str, end: &str) -> ScheduleRecord {
        ScheduleRecord {
            id: id.into(),
            weekday: weekday.into(),
            start_time: start.into(),
            end_time: end.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_slot_math() {
        let layout = build_layout(&[record("a", "Monday", "09:00", "10:30")]);
        let slot = &layout.day(Weekday::Monday)[0];
        assert_eq!(slot.start_slot, 4);
        assert_eq!(slot.span, 6);
        assert_eq!(slot.end_slot(), 10);
    }

    #[test]
    fn test_partial_slots_floor() {
        let (start, span) = place(&record("a", "Monday", "08:10", "08:50")).unwrap();
        assert_eq!(start, 0);
        assert_eq!(span, 3);
    }

    #[test]
    fn test_empty_input_has_all_days() {
        let layout = build_layout(&[]);
        assert_eq!(layout.days().count(), 5);
        for day in Weekday::ALL {
            assert!(layout.day(day).is_empty());
        }
        assert!(layout.rejected().is_empty());
        assert_eq!(layout.max_end_slot(), 0);
    }

    #[test]
    fn test_unknown_weekday_dropped() {
        let layout = build_layout(&[
            record("sat", "Saturday", "09:00", "10:00"),
            record("mon", "Monday", "09:00", "10:00"),
        ]);
        assert_eq!(layout.placed_count(), 1);
        assert!(layout.rejected().is_empty());
        for (_, slots) in layout.days() {
            assert!(slots.iter().all(|slot| slot.record.id != "sat"));
        }
    }

    #[test]
    fn test_sorted_by_start_time() {
        let layout = build_layout(&[
            record("late", "Tuesday", "14:00", "15:30"),
            record("early", "Tuesday", "08:00", "09:30"),
            record("mid", "Tuesday", "10:15", "11:45"),
        ]);
        let order: Vec<&str> = layout
            .day(Weekday::Tuesday)
            .iter()
            .map(|slot| slot.record.id.as_str())
            .collect();
        assert_eq!(order, vec!["early", "mid", "late"]);
    }

    #[test]
    fn test_collisions_are_kept() {
        let layout = build_layout(&[
            record("a", "Wednesday", "09:00", "10:30"),
            record("b", "Wednesday", "09:45", "11:00"),
        ]);
        assert_eq!(layout.day(Weekday::Wednesday).len(), 2);
    }

    #[test]
    fn test_out_of_grid_records_rejected() {
        let layout = build_layout(&[
            record("early", "Thursday", "07:30", "09:00"),
            record("backwards", "Thursday", "11:00", "10:00"),
            record("tiny", "Thursday", "09:00", "09:10"),
            record("garbage", "Thursday", "nine", "10:00"),
            record("ok", "Thursday", "12:00", "13:00"),
        ]);
        assert_eq!(layout.day(Weekday::Thursday).len(), 1);
        let rejected: Vec<&str> = layout.rejected().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(rejected.len(), 4);
        for id in ["early", "backwards", "tiny", "garbage"] {
            assert!(rejected.contains(&id), "{} should be rejected", id);
        }
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("08:00"), Some(480));
        assert_eq!(parse_clock("23:59"), Some(1439));
        assert_eq!(parse_clock("24:00"), None);
        assert_eq!(parse_clock("10:60"), None);
        assert_eq!(parse_clock("1000"), None);
    }
}
