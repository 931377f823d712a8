/// Shared data structures for the timetable state
///
/// These structs represent the data model that flows between
/// the record repository, the filter engine and the layout builder.
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// One scheduled class session as loaded from the store.
///
/// Every filterable field is an opaque string compared byte-for-byte.
/// Missing fields in the payload become empty strings, numbers and booleans
/// their text form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleRecord {
    /// Store key, unique within one loaded set
    #[serde(skip_deserializing)]
    pub id: String,
    /// Day name, see [`Weekday::parse`]
    #[serde(deserialize_with = "scalar_text")]
    pub weekday: String,
    /// "HH:MM"
    #[serde(deserialize_with = "scalar_text")]
    pub start_time: String,
    /// "HH:MM"
    #[serde(deserialize_with = "scalar_text")]
    pub end_time: String,
    #[serde(deserialize_with = "scalar_text")]
    pub group: String,
    #[serde(deserialize_with = "scalar_text")]
    pub program: String,
    #[serde(deserialize_with = "scalar_text")]
    pub instructor: String,
    #[serde(deserialize_with = "scalar_text")]
    pub subject: String,
    #[serde(deserialize_with = "scalar_text")]
    pub room: String,
    #[serde(deserialize_with = "scalar_text")]
    pub semester: String,
    #[serde(deserialize_with = "scalar_text")]
    pub degree_level: String,
    /// "dd.mm-dd.mm"
    #[serde(deserialize_with = "scalar_text")]
    pub week_range: String,
    #[serde(deserialize_with = "scalar_text")]
    pub session_type: String,
    #[serde(deserialize_with = "scalar_text")]
    pub faculty: String,
}

/// Strings as-is, numbers and booleans as text, anything else empty
fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    })
}

impl ScheduleRecord {
    /// Field value for a filter key
    pub fn field(&self, key: FilterKey) -> &str {
        match key {
            FilterKey::Group => &self.group,
            FilterKey::Program => &self.program,
            FilterKey::Semester => &self.semester,
            FilterKey::DegreeLevel => &self.degree_level,
            FilterKey::SessionType => &self.session_type,
            FilterKey::Faculty => &self.faculty,
            FilterKey::WeekRange => &self.week_range,
        }
    }
}

/// The five rendered days
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// Parse an English or Polish day name, ignoring case.
    ///
    /// Weekend days and anything unrecognised return `None`.
    pub fn parse(name: &str) -> Option<Weekday> {
        match name.trim().to_lowercase().as_str() {
            "monday" | "poniedziałek" | "poniedzialek" => Some(Weekday::Monday),
            "tuesday" | "wtorek" => Some(Weekday::Tuesday),
            "wednesday" | "środa" | "sroda" => Some(Weekday::Wednesday),
            "thursday" | "czwartek" => Some(Weekday::Thursday),
            "friday" | "piątek" | "piatek" => Some(Weekday::Friday),
            _ => None,
        }
    }

    /// Column index in the grid, Monday = 0
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The fixed set of filterable fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKey {
    Group,
    Program,
    Semester,
    DegreeLevel,
    SessionType,
    Faculty,
    WeekRange,
}

impl FilterKey {
    pub const ALL: [FilterKey; 7] = [
        FilterKey::Group,
        FilterKey::Program,
        FilterKey::Semester,
        FilterKey::DegreeLevel,
        FilterKey::SessionType,
        FilterKey::Faculty,
        FilterKey::WeekRange,
    ];

    /// Keys compared by plain equality (everything except the week)
    pub const CATEGORICAL: [FilterKey; 6] = [
        FilterKey::Group,
        FilterKey::Program,
        FilterKey::Semester,
        FilterKey::DegreeLevel,
        FilterKey::SessionType,
        FilterKey::Faculty,
    ];

    /// Field name used in preference keys
    pub fn field_name(self) -> &'static str {
        match self {
            FilterKey::Group => "group",
            FilterKey::Program => "program",
            FilterKey::Semester => "semester",
            FilterKey::DegreeLevel => "degree_level",
            FilterKey::SessionType => "session_type",
            FilterKey::Faculty => "faculty",
            FilterKey::WeekRange => "week_range",
        }
    }

    /// Preference storage key, `filter_<fieldname>`
    pub fn preference_key(self) -> String {
        format!("filter_{}", self.field_name())
    }

    /// Human readable label for the filter panel
    pub fn label(self) -> &'static str {
        match self {
            FilterKey::Group => "Group",
            FilterKey::Program => "Program",
            FilterKey::Semester => "Semester",
            FilterKey::DegreeLevel => "Degree level",
            FilterKey::SessionType => "Session type",
            FilterKey::Faculty => "Faculty",
            FilterKey::WeekRange => "Week",
        }
    }
}

/// Current filter selection.
///
/// An empty or absent value puts no constraint on its field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    values: BTreeMap<FilterKey, String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for `key`, empty when unconstrained
    pub fn get(&self, key: FilterKey) -> &str {
        self.values.get(&key).map(String::as_str).unwrap_or("")
    }

    /// Set a value; an empty string clears the constraint
    pub fn set(&mut self, key: FilterKey, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.values.remove(&key);
        } else {
            self.values.insert(key, value);
        }
    }

    pub fn clear(&mut self, key: FilterKey) {
        self.values.remove(&key);
    }

    pub fn with(mut self, key: FilterKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Non-empty constraints in key order
    pub fn active(&self) -> impl Iterator<Item = (FilterKey, &str)> {
        self.values.iter().map(|(key, value)| (*key, value.as_str()))
    }

    pub fn is_unconstrained(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_names() {
        assert_eq!(Weekday::parse("Monday"), Some(Weekday::Monday));
        assert_eq!(Weekday::parse("środa"), Some(Weekday::Wednesday));
        assert_eq!(Weekday::parse("Piątek"), Some(Weekday::Friday));
        assert_eq!(Weekday::parse("Saturday"), None);
        assert_eq!(Weekday::parse("Sobota"), None);
        assert_eq!(Weekday::parse(""), None);
    }

    #[test]
    fn test_empty_value_clears_constraint() {
        let mut filters = FilterState::new().with(FilterKey::Group, "G1");
        assert_eq!(filters.get(FilterKey::Group), "G1");

        filters.set(FilterKey::Group, "");
        assert_eq!(filters.get(FilterKey::Group), "");
        assert!(filters.is_unconstrained());
    }

    #[test]
    fn test_preference_keys() {
        assert_eq!(FilterKey::Group.preference_key(), "filter_group");
        assert_eq!(FilterKey::WeekRange.preference_key(), "filter_week_range");
    }

    #[test]
    fn test_record_deserializes_with_missing_fields() {
        let record: ScheduleRecord =
            serde_json::from_str(r#"{"weekday":"Monday","startTime":"09:00"}"#).unwrap();
        assert_eq!(record.weekday, "Monday");
        assert_eq!(record.start_time, "09:00");
        assert_eq!(record.room, "");
    }

    #[test]
    fn test_record_scalars_become_text() {
        let record: ScheduleRecord = serde_json::from_str(
            r#"{"semester":3,"group":true,"room":null,"faculty":["WI"],"id":"ignored"}"#,
        )
        .unwrap();
        assert_eq!(record.semester, "3");
        assert_eq!(record.group, "true");
        assert_eq!(record.room, "");
        assert_eq!(record.faculty, "");
        assert_eq!(record.id, "");
    }
}
