/// Error types for the timetable core
///
/// No error here is fatal to the running view. Each component decides
/// how to degrade: an empty record set, an unconstrained week filter,
/// or a record left out of the grid.

/// Result type used across the crate
pub type Result<T> = std::result::Result<T, TimetableError>;

/// Coarse classification used for reporting and log fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DataFetchFailed,
    InvalidWeekLabel,
    OutOfGridTime,
    Preferences,
    Config,
}

#[derive(Debug, thiserror::Error)]
pub enum TimetableError {
    /// Repository unreachable or payload malformed
    #[error("failed to fetch schedule records: {0}")]
    DataFetchFailed(String),

    /// Week label missing its separator or carrying non-numeric parts
    #[error("invalid week label {label:?}: {reason}")]
    InvalidWeekLabel { label: String, reason: String },

    /// Record times that do not map onto the slot grid
    #[error("record {id} has out-of-grid time {start}-{end}")]
    OutOfGridTime {
        id: String,
        start: String,
        end: String,
    },

    #[error("preference storage error: {0}")]
    Preferences(#[from] rusqlite::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl TimetableError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TimetableError::DataFetchFailed(_) => ErrorKind::DataFetchFailed,
            TimetableError::InvalidWeekLabel { .. } => ErrorKind::InvalidWeekLabel,
            TimetableError::OutOfGridTime { .. } => ErrorKind::OutOfGridTime,
            TimetableError::Preferences(_) => ErrorKind::Preferences,
            TimetableError::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn invalid_week(label: &str, reason: impl Into<String>) -> Self {
        TimetableError::InvalidWeekLabel {
            label: label.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for TimetableError {
    fn from(err: reqwest::Error) -> Self {
        TimetableError::DataFetchFailed(err.to_string())
    }
}

impl From<serde_json::Error> for TimetableError {
    fn from(err: serde_json::Error) -> Self {
        TimetableError::DataFetchFailed(format!("malformed payload: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let err = TimetableError::invalid_week("30.09", "missing separator");
        assert_eq!(err.kind(), ErrorKind::InvalidWeekLabel);

        let err = TimetableError::OutOfGridTime {
            id: "r1".into(),
            start: "07:00".into(),
            end: "08:00".into(),
        };
        assert_eq!(err.kind(), ErrorKind::OutOfGridTime);
        assert!(err.to_string().contains("r1"));
    }

    #[test]
    fn test_json_error_is_fetch_failure() {
        let err: TimetableError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::DataFetchFailed);
    }
}
