/// Weekly grid
/// Draws the five day columns and places each laid-out session as a block
use iced::widget::canvas::{self, Path, Stroke};
use iced::{alignment, Color, Pixels, Point, Rectangle, Size};

use timetable_viewer::state::layout::{Layout, ScheduleSlot, GRID_START_MINUTES, SLOT_MINUTES};
use timetable_viewer::Weekday;

use crate::Message;

/// Height of one 15-minute row in pixels
const SLOT_HEIGHT: f32 = 14.0;
/// Width of the time gutter on the left
const GUTTER_WIDTH: f32 = 52.0;
/// Height of the day-name header
const HEADER_HEIGHT: f32 = 26.0;
/// Slots per hour line
const SLOTS_PER_HOUR: i32 = 60 / SLOT_MINUTES;

const PALETTE_SIZE: usize = 6;

fn palette(index: usize) -> Color {
    match index % PALETTE_SIZE {
        0 => Color::from_rgb(0.35, 0.75, 0.17),
        1 => Color::from_rgb(0.20, 0.52, 0.80),
        2 => Color::from_rgb(0.85, 0.55, 0.15),
        3 => Color::from_rgb(0.62, 0.36, 0.75),
        4 => Color::from_rgb(0.80, 0.30, 0.35),
        _ => Color::from_rgb(0.20, 0.65, 0.62),
    }
}

/// Grid drawing data
#[derive(Debug, Clone)]
pub struct WeekGrid {
    layout: Layout,
    /// First drawn slot (may be > 0 when the window starts after 08:00)
    first_slot: i32,
    /// Slot at the bottom edge of the grid
    last_slot: i32,
}

impl WeekGrid {
    /// `window` is the configured drawing range in minutes since midnight.
    /// It grows to include every placed session.
    pub fn new(layout: Layout, window: (i32, i32)) -> Self {
        let earliest = layout
            .days()
            .flat_map(|(_, slots)| slots.iter())
            .map(|slot| slot.start_slot as i32)
            .min();
        let mut first_slot = slot_of(window.0).max(0);
        if let Some(earliest) = earliest {
            first_slot = first_slot.min(earliest);
        }
        let last_slot = slot_of(window.1 + SLOT_MINUTES - 1)
            .max(layout.max_end_slot() as i32)
            .max(first_slot + 1);
        WeekGrid {
            layout,
            first_slot,
            last_slot,
        }
    }

    /// Pixel height needed to draw every row
    pub fn height(&self) -> f32 {
        HEADER_HEIGHT + (self.last_slot - self.first_slot) as f32 * SLOT_HEIGHT
    }

    fn row_y(&self, slot: i32) -> f32 {
        HEADER_HEIGHT + (slot - self.first_slot) as f32 * SLOT_HEIGHT
    }
}

fn slot_of(minutes: i32) -> i32 {
    (minutes - GRID_START_MINUTES).div_euclid(SLOT_MINUTES)
}

fn clock(slot: i32) -> String {
    let minutes = GRID_START_MINUTES + slot * SLOT_MINUTES;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Stable colour per session type
fn colour_for(session_type: &str) -> Color {
    let hash = session_type
        .bytes()
        .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
    palette(hash)
}

fn label(content: String, position: Point, size: f32, color: Color) -> canvas::Text {
    canvas::Text {
        content,
        position,
        color,
        size: Pixels(size),
        ..canvas::Text::default()
    }
}

impl canvas::Program<Message> for WeekGrid {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: iced::mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let line = Color::from_rgba(1.0, 1.0, 1.0, 0.12);
        let faint = Color::from_rgba(1.0, 1.0, 1.0, 0.05);
        let ink = Color::from_rgb(0.9, 0.9, 0.9);

        let column_width = ((bounds.width - GUTTER_WIDTH) / Weekday::ALL.len() as f32).max(40.0);

        // Day headers and column separators
        for day in Weekday::ALL {
            let x = GUTTER_WIDTH + day.index() as f32 * column_width;
            frame.fill_text(canvas::Text {
                horizontal_alignment: alignment::Horizontal::Center,
                ..label(
                    day.name().to_string(),
                    Point::new(x + column_width / 2.0, 6.0),
                    14.0,
                    ink,
                )
            });
            frame.stroke(
                &Path::line(Point::new(x, 0.0), Point::new(x, bounds.height)),
                Stroke::default().with_color(line).with_width(1.0),
            );
        }

        // Quarter-hour rows, stronger on the hour
        for slot in self.first_slot..=self.last_slot {
            let y = self.row_y(slot);
            let on_hour = slot.rem_euclid(SLOTS_PER_HOUR) == 0;
            frame.stroke(
                &Path::line(Point::new(GUTTER_WIDTH, y), Point::new(bounds.width, y)),
                Stroke::default()
                    .with_color(if on_hour { line } else { faint })
                    .with_width(1.0),
            );
            if on_hour {
                frame.fill_text(label(clock(slot), Point::new(6.0, y - 6.0), 11.0, ink));
            }
        }

        // Sessions
        for (day, slots) in self.layout.days() {
            let x = GUTTER_WIDTH + day.index() as f32 * column_width;
            for slot in slots {
                draw_session(&mut frame, self, slot, x, column_width);
            }
        }

        vec![frame.into_geometry()]
    }
}

fn draw_session(
    frame: &mut canvas::Frame,
    grid: &WeekGrid,
    slot: &ScheduleSlot,
    x: f32,
    column_width: f32,
) {
    let record = &slot.record;
    let top = grid.row_y(slot.start_slot as i32);
    let height = slot.span as f32 * SLOT_HEIGHT - 2.0;
    let origin = Point::new(x + 2.0, top + 1.0);

    let mut fill = colour_for(&record.session_type);
    fill.a = 0.85;
    frame.fill_rectangle(origin, Size::new(column_width - 4.0, height), fill);

    let lines = [
        (record.subject.clone(), 12.0),
        (format!("{}-{} {}", record.start_time, record.end_time, record.room), 10.0),
        (record.instructor.clone(), 10.0),
        (record.session_type.clone(), 10.0),
    ];

    let mut y = origin.y + 3.0;
    for (content, size) in lines {
        if content.trim().is_empty() {
            continue;
        }
        if y + size > origin.y + height {
            break;
        }
        frame.fill_text(label(content, Point::new(origin.x + 4.0, y), size, Color::WHITE));
        y += size + 3.0;
    }
}
