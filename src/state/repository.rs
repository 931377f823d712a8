/// Record Repository
///
/// Fetches the whole record collection once and hands out immutable
/// snapshots. A new load replaces the snapshot pointer in one step, so a
/// filter or layout pass holding the old snapshot never sees a half-updated
/// list.
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, RwLock};

use super::data::ScheduleRecord;
use crate::error::{Result, TimetableError};
use crate::week;

/// Where records come from
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch the full record collection
    async fn fetch_all(&self) -> Result<Vec<ScheduleRecord>>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Realtime database REST endpoint: `GET <database_url>/<collection>.json`
#[derive(Debug, Clone)]
pub struct RealtimeDbSource {
    client: reqwest::Client,
    url: String,
}

impl RealtimeDbSource {
    pub fn new(database_url: &str, collection: &str) -> Self {
        RealtimeDbSource {
            client: reqwest::Client::new(),
            url: collection_url(database_url, collection),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Build the `.json` URL for a collection path; an empty path is the root
pub fn collection_url(database_url: &str, collection: &str) -> String {
    let base = database_url.trim_end_matches('/');
    let path = collection.trim_matches('/');
    if path.is_empty() {
        format!("{}/.json", base)
    } else {
        format!("{}/{}.json", base, path)
    }
}

#[async_trait]
impl RecordSource for RealtimeDbSource {
    async fn fetch_all(&self) -> Result<Vec<ScheduleRecord>> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TimetableError::DataFetchFailed(format!(
                "{} answered {}",
                self.url, status
            )));
        }

        let payload: Value = response.json().await?;
        decode_records(payload)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Fixed records held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<ScheduleRecord>,
}

impl StaticSource {
    pub fn new(records: Vec<ScheduleRecord>) -> Self {
        StaticSource { records }
    }

    /// Build from a store-shaped JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let payload: Value = serde_json::from_str(json)?;
        Ok(StaticSource {
            records: decode_records(payload)?,
        })
    }
}

#[async_trait]
impl RecordSource for StaticSource {
    async fn fetch_all(&self) -> Result<Vec<ScheduleRecord>> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("{} static records", self.records.len())
    }
}

/// Decode a store payload into records.
///
/// `null` is an empty collection. Objects are keyed by record identifier;
/// arrays are the store's encoding of integer keys, with `null` holes.
pub fn decode_records(payload: Value) -> Result<Vec<ScheduleRecord>> {
    let entries: Vec<(String, Value)> = match payload {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, item)| !item.is_null())
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        other => {
            return Err(TimetableError::DataFetchFailed(format!(
                "expected a record collection, got {}",
                type_name(&other)
            )))
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    for (id, value) in entries {
        match value {
            Value::Object(fields) => {
                match serde_json::from_value::<ScheduleRecord>(Value::Object(fields)) {
                    Ok(record) => records.push(ScheduleRecord { id, ..record }),
                    Err(err) => tracing::warn!(id = %id, "skipping undecodable entry: {}", err),
                }
            }
            other => tracing::warn!(id = %id, "skipping {} entry", type_name(&other)),
        }
    }
    Ok(records)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// In-memory view of the loaded record set
#[derive(Debug, Clone, Default)]
pub struct RecordRepository {
    snapshot: Arc<RwLock<Arc<Vec<ScheduleRecord>>>>,
}

impl RecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current record set; cheap to clone and never mutated
    pub fn snapshot(&self) -> Arc<Vec<ScheduleRecord>> {
        match self.snapshot.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Swap in a new record set wholesale
    pub fn replace(&self, records: Vec<ScheduleRecord>) {
        let records = Arc::new(records);
        match self.snapshot.write() {
            Ok(mut guard) => *guard = records,
            Err(poisoned) => *poisoned.into_inner() = records,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Fetch from `source` and swap the result in.
    ///
    /// On failure the error is logged, the previous snapshot stays in place
    /// (empty before the first successful load) and the error is returned
    /// for display.
    pub async fn load(&self, source: &dyn RecordSource) -> Result<usize> {
        match source.fetch_all().await {
            Ok(records) => {
                let malformed = report_malformed_weeks(&records);
                let count = records.len();
                self.replace(records);
                tracing::info!(count, malformed, source = %source.describe(), "schedule records loaded");
                Ok(count)
            }
            Err(err) => {
                tracing::warn!(kind = ?err.kind(), source = %source.describe(), "{}", err);
                Err(err)
            }
        }
    }
}

/// Warn once per bad week label; filtering treats those records as
/// unconstrained without logging again.
fn report_malformed_weeks(records: &[ScheduleRecord]) -> usize {
    let mut malformed = 0;
    for record in records {
        if let Err(err) = week::validate_label(&record.week_range) {
            tracing::warn!(id = %record.id, kind = ?err.kind(), "{}; shown in every week", err);
            malformed += 1;
        }
    }
    malformed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FailingSource;

    #[async_trait]
    impl RecordSource for FailingSource {
        async fn fetch_all(&self) -> Result<Vec<ScheduleRecord>> {
            Err(TimetableError::DataFetchFailed("unreachable".into()))
        }

        fn describe(&self) -> String {
            "failing".into()
        }
    }

    #[test]
    fn test_decode_object_payload() {
        let records = decode_records(json!({
            "-Nabc": {
                "weekday": "Monday",
                "startTime": "09:00",
                "endTime": "10:30",
                "group": "G1",
                "semester": 3,
                "weekRange": "30.09-06.10"
            },
            "-Nabd": "not a record"
        }))
        .unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, "-Nabc");
        assert_eq!(record.start_time, "09:00");
        assert_eq!(record.week_range, "30.09-06.10");
        assert_eq!(record.semester, "3");
        assert_eq!(record.room, "");
    }

    #[test]
    fn test_decode_array_payload_skips_holes() {
        let records = decode_records(json!([null, {"group": "G1"}, null, {"group": "G2"}])).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_decode_null_is_empty() {
        assert!(decode_records(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_decode_scalar_is_error() {
        let err = decode_records(json!(42)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::DataFetchFailed);
    }

    #[test]
    fn test_collection_url() {
        assert_eq!(
            collection_url("https://example.firebasedatabase.app/", ""),
            "https://example.firebasedatabase.app/.json"
        );
        assert_eq!(
            collection_url("https://example.firebasedatabase.app", "/plan/"),
            "https://example.firebasedatabase.app/plan.json"
        );
    }

    #[tokio::test]
    async fn test_load_swaps_snapshot() {
        let repo = RecordRepository::new();
        let before = repo.snapshot();
        assert!(before.is_empty());

        let source = StaticSource::new(vec![ScheduleRecord {
            id: "a".into(),
            ..Default::default()
        }]);
        assert_eq!(repo.load(&source).await.unwrap(), 1);

        // old snapshot untouched, new one visible
        assert!(before.is_empty());
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_records() {
        let repo = RecordRepository::new();
        repo.replace(vec![ScheduleRecord::default()]);

        assert!(repo.load(&FailingSource).await.is_err());
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_first_load_leaves_empty_set() {
        let repo = RecordRepository::new();
        let err = repo.load(&FailingSource).await.unwrap_err();
        assert!(err.to_string().contains("unreachable"));
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_clone_shares_snapshot() {
        let repo = RecordRepository::new();
        let loader = repo.clone();
        let source: Arc<dyn RecordSource> = Arc::new(StaticSource::new(vec![ScheduleRecord::default()]));
        loader.load(source.as_ref()).await.unwrap();
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_report_malformed_weeks() {
        let records = vec![
            ScheduleRecord {
                week_range: "30.09-06.10".into(),
                ..Default::default()
            },
            ScheduleRecord::default(),
            ScheduleRecord {
                id: "bad".into(),
                week_range: "sometime".into(),
                ..Default::default()
            },
        ];
        assert_eq!(report_malformed_weeks(&records), 1);
    }

    #[tokio::test]
    async fn test_static_source_from_json() {
        let source = StaticSource::from_json(r#"{"x": {"weekday": "Friday"}}"#).unwrap();
        let records = source.fetch_all().await.unwrap();
        assert_eq!(records[0].weekday, "Friday");
    }
}
