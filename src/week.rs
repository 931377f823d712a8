/// Week Calculator
///
/// Week labels look like `"30.09-06.10"`: a Monday and the following Sunday,
/// each formatted as zero-padded `day.month`. Labels carry no year, so every
/// parse is anchored to a reference year (the current year by default).
/// A label whose end is earlier in the calendar than its start spans New Year
/// and its end is placed in the following year.
///
/// Overlap is tested on calendar dates rather than on the `dd.mm` strings,
/// which keeps `"28.12-03.01"` ordered correctly. The selected week is read
/// in the reference year and a record's range is placed in whichever
/// neighbouring year lies closest to it, so an October-January semester
/// still covers the first weeks of the new year.
use chrono::{Datelike, Duration, Local, NaiveDate};
use std::fmt;

use crate::error::{Result, TimetableError};

/// Separator between the two halves of a week label
pub const LABEL_SEPARATOR: char = '-';

/// Separator between day and month inside one half
const DAY_MONTH_SEPARATOR: char = '.';

/// Direction for week navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// A Monday-to-Sunday span (or any start/end pair read from a label)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl WeekRange {
    /// The Monday-to-Sunday week that contains `date`.
    ///
    /// Sunday counts as day 7, so a Sunday belongs to the week that started
    /// six days earlier.
    pub fn containing(date: NaiveDate) -> Self {
        let offset = i64::from(date.weekday().number_from_monday()) - 1;
        let start = date - Duration::days(offset);
        WeekRange {
            start,
            end: start + Duration::days(6),
        }
    }

    /// Parse a `"dd.mm-dd.mm"` label, anchoring its start in `year`.
    pub fn parse(label: &str, year: i32) -> Result<Self> {
        let (start_part, end_part) = label
            .split_once(LABEL_SEPARATOR)
            .ok_or_else(|| TimetableError::invalid_week(label, "missing '-' separator"))?;

        let start = parse_day_month(label, start_part, year)?;
        let mut end = parse_day_month(label, end_part, year)?;
        if end < start {
            end = parse_day_month(label, end_part, year + 1)?;
        }

        Ok(WeekRange { start, end })
    }

    /// Parse `label` in the year around `anchor` that puts it nearest.
    ///
    /// Candidates are the anchor's start year and one year either side;
    /// ties go to the anchor's own year.
    pub fn parse_near(label: &str, anchor: &WeekRange) -> Result<Self> {
        let year = anchor.start.year();
        let mut best: Option<WeekRange> = None;
        let mut last_err = None;

        for candidate in [year, year - 1, year + 1] {
            match WeekRange::parse(label, candidate) {
                Ok(range) => {
                    let closer = best.map_or(true, |best| {
                        range.gap_days(anchor) < best.gap_days(anchor)
                    });
                    if closer {
                        best = Some(range);
                    }
                }
                Err(err) => last_err = Some(err),
            }
        }

        best.ok_or_else(|| {
            last_err.unwrap_or_else(|| TimetableError::invalid_week(label, "no usable year"))
        })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Shift both halves by seven days
    pub fn step(self, direction: Direction) -> Self {
        let days = match direction {
            Direction::Forward => Duration::days(7),
            Direction::Backward => Duration::days(-7),
        };
        WeekRange {
            start: self.start + days,
            end: self.end + days,
        }
    }

    /// Closed-interval overlap, so touching ranges overlap
    pub fn overlaps(&self, other: &WeekRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    /// Whole days between the two ranges, zero when they overlap
    pub fn gap_days(&self, other: &WeekRange) -> i64 {
        if self.overlaps(other) {
            0
        } else if self.end < other.start {
            (other.start - self.end).num_days()
        } else {
            (self.start - other.end).num_days()
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The label form, e.g. `"30.09-06.10"`
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WeekRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}.{:02}{}{:02}.{:02}",
            self.start.day(),
            self.start.month(),
            LABEL_SEPARATOR,
            self.end.day(),
            self.end.month()
        )
    }
}

fn parse_day_month(label: &str, part: &str, year: i32) -> Result<NaiveDate> {
    let (day, month) = part
        .trim()
        .split_once(DAY_MONTH_SEPARATOR)
        .ok_or_else(|| TimetableError::invalid_week(label, "expected day.month"))?;

    let day: u32 = day
        .parse()
        .map_err(|_| TimetableError::invalid_week(label, format!("non-numeric day {:?}", day)))?;
    let month: u32 = month.parse().map_err(|_| {
        TimetableError::invalid_week(label, format!("non-numeric month {:?}", month))
    })?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        TimetableError::invalid_week(label, format!("no such date {:02}.{:02}.{}", day, month, year))
    })
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Label of the week containing today
pub fn current_week_label() -> WeekRange {
    current_week_label_at(today())
}

pub fn current_week_label_at(date: NaiveDate) -> WeekRange {
    WeekRange::containing(date)
}

/// Step a label one week forward or backward, reading it in the current year
pub fn step_week(label: &str, direction: Direction) -> Result<WeekRange> {
    step_week_in(label, direction, today().year())
}

pub fn step_week_in(label: &str, direction: Direction, year: i32) -> Result<WeekRange> {
    Ok(WeekRange::parse(label, year)?.step(direction))
}

/// Check that a record's week label parses; an empty label is fine.
///
/// The leap-year anchor lets `29.02` through.
pub fn validate_label(label: &str) -> Result<()> {
    if label.is_empty() {
        return Ok(());
    }
    WeekRange::parse(label, LEAP_YEAR).map(|_| ())
}

const LEAP_YEAR: i32 = 2024;

/// Whether the record range `a` overlaps the selected range `b`.
///
/// An empty `b` means no week filter and always matches; an empty `a` is a
/// record without a week restriction and matches too. A label that fails
/// to parse on either side is treated as unconstrained.
pub fn ranges_overlap(a: &str, b: &str) -> bool {
    ranges_overlap_in(a, b, today().year())
}

/// `year` anchors the selected range `b`; `a` is placed next to it.
pub fn ranges_overlap_in(a: &str, b: &str, year: i32) -> bool {
    if a.is_empty() || b.is_empty() {
        return true;
    }

    let overlap = WeekRange::parse(b, year).and_then(|selected| {
        WeekRange::parse_near(a, &selected).map(|record| record.overlaps(&selected))
    });
    match overlap {
        Ok(overlap) => overlap,
        Err(err) => {
            // reported once per load by the repository
            tracing::debug!(kind = ?err.kind(), "{}; week filter ignored", err);
            true
        }
    }
}
