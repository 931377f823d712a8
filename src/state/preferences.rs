/// Preference Store
///
/// Key-value persistence with per-key expiry. The core only needs the
/// `get`/`set` contract; [`SqlitePreferences`] keeps values in a small
/// SQLite file next to the user's other application data, and
/// [`MemoryPreferences`] keeps them in memory.
use chrono::{Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::data::{FilterKey, FilterState};
use crate::error::Result;

/// Reserved key for the favourites flag
pub const FAVOURITE_KEY: &str = "favourite";

/// Retention window used when none is configured
pub const DEFAULT_RETENTION_DAYS: i64 = 365;

/// Storage capability injected into the timetable
pub trait PreferenceStore {
    /// Stored value, or `None` when absent or expired
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key` for `ttl_days` days
    fn set(&mut self, key: &str, value: &str, ttl_days: i64) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

fn expiry_timestamp(ttl_days: i64) -> i64 {
    (Utc::now() + Duration::days(ttl_days)).timestamp()
}

/// SQLite-backed preferences
pub struct SqlitePreferences {
    conn: Connection,
    db_path: PathBuf,
}

impl SqlitePreferences {
    /// Open or create the preferences database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                tracing::warn!("could not create {}: {}", parent.display(), err);
            }
        }

        let conn = Connection::open(path)?;
        let mut store = SqlitePreferences {
            conn,
            db_path: path.to_path_buf(),
        };
        store.init_schema()?;

        tracing::info!("preferences opened at {}", path.display());
        Ok(store)
    }

    /// Preferences that live only as long as the process
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut store = SqlitePreferences {
            conn,
            db_path: PathBuf::from(":memory:"),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&mut self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS preferences (
                key             TEXT PRIMARY KEY,
                value           TEXT NOT NULL,
                expires_at      INTEGER NOT NULL
            )",
            [],
        )?;

        self.purge_expired()?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Delete rows whose expiry has passed, returning how many went
    pub fn purge_expired(&self) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM preferences WHERE expires_at <= ?1",
            params![Utc::now().timestamp()],
        )?;
        if removed > 0 {
            tracing::debug!(removed, "purged expired preferences");
        }
        Ok(removed)
    }

    fn lookup(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1 AND expires_at > ?2",
                params![key, Utc::now().timestamp()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}

impl PreferenceStore for SqlitePreferences {
    fn get(&self, key: &str) -> Option<String> {
        match self.lookup(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, "{}", err);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str, ttl_days: i64) -> Result<()> {
        self.conn.execute(
            "INSERT INTO preferences (key, value, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at",
            params![key, value, expiry_timestamp(ttl_days)],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM preferences WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl std::fmt::Debug for SqlitePreferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlitePreferences")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// In-memory preferences with the same expiry rules
#[derive(Debug, Default, Clone)]
pub struct MemoryPreferences {
    entries: HashMap<String, (String, i64)>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored, unexpired entries
    pub fn len(&self) -> usize {
        let now = Utc::now().timestamp();
        self.entries
            .values()
            .filter(|(_, expires_at)| *expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        let (value, expires_at) = self.entries.get(key)?;
        (*expires_at > Utc::now().timestamp()).then(|| value.clone())
    }

    fn set(&mut self, key: &str, value: &str, ttl_days: i64) -> Result<()> {
        self.entries
            .insert(key.to_string(), (value.to_string(), expiry_timestamp(ttl_days)));
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Seed the filter state from stored preferences.
///
/// Every key defaults to empty, except the week which defaults to
/// `default_week` (normally the current week label).
pub fn seed_filter_state(store: &dyn PreferenceStore, default_week: &str) -> FilterState {
    let mut filters = FilterState::new();
    for key in FilterKey::ALL {
        let value = store.get(&key.preference_key()).unwrap_or_default();
        filters.set(key, value);
    }
    if filters.get(FilterKey::WeekRange).is_empty() {
        filters.set(FilterKey::WeekRange, default_week);
    }
    filters
}

/// Whether the favourites flag is set
pub fn favourite(store: &dyn PreferenceStore) -> bool {
    store.get(FAVOURITE_KEY).as_deref() == Some("true")
}

/// Write the favourites flag itself
pub fn set_favourite(store: &mut dyn PreferenceStore, enabled: bool, ttl_days: i64) -> Result<()> {
    store.set(FAVOURITE_KEY, if enabled { "true" } else { "false" }, ttl_days)
}

/// Persist the non-empty filter values, but only while favourites is on.
///
/// With the flag off nothing is written, so a user who never turns it on
/// never has filters remembered. Returns whether anything was written.
pub fn persist_filter_state(
    store: &mut dyn PreferenceStore,
    filters: &FilterState,
    ttl_days: i64,
) -> Result<bool> {
    if !favourite(store) {
        return Ok(false);
    }

    for (key, value) in filters.active() {
        store.set(&key.preference_key(), value, ttl_days)?;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_expiry() {
        let mut store = MemoryPreferences::new();
        store.set("a", "1", 1).unwrap();
        store.set("b", "2", -1).unwrap();
        assert_eq!(store.get("a").as_deref(), Some("1"));
        assert_eq!(store.get("b"), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_sqlite_roundtrip_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs").join("preferences.db");

        {
            let mut store = SqlitePreferences::open(&path).unwrap();
            store.set("filter_group", "G1", 365).unwrap();
            store.set("filter_group", "G2", 365).unwrap();
            store.set("stale", "x", -1).unwrap();
            assert_eq!(store.get("stale"), None);
        }

        let mut store = SqlitePreferences::open(&path).unwrap();
        assert_eq!(store.get("filter_group").as_deref(), Some("G2"));
        assert_eq!(store.purge_expired().unwrap(), 0);

        store.remove("filter_group").unwrap();
        assert_eq!(store.get("filter_group"), None);
    }

    #[test]
    fn test_seed_defaults_week() {
        let store = MemoryPreferences::new();
        let filters = seed_filter_state(&store, "30.09-06.10");
        assert_eq!(filters.get(FilterKey::WeekRange), "30.09-06.10");
        for key in FilterKey::CATEGORICAL {
            assert_eq!(filters.get(key), "");
        }
    }

    #[test]
    fn test_seed_reads_stored_values() {
        let mut store = MemoryPreferences::new();
        store.set("filter_program", "B", 365).unwrap();
        store.set("filter_week_range", "07.10-13.10", 365).unwrap();

        let filters = seed_filter_state(&store, "30.09-06.10");
        assert_eq!(filters.get(FilterKey::Program), "B");
        assert_eq!(filters.get(FilterKey::WeekRange), "07.10-13.10");
    }

    #[test]
    fn test_persistence_gated_on_favourite() {
        let mut store = MemoryPreferences::new();
        let filters = FilterState::new()
            .with(FilterKey::Group, "G1")
            .with(FilterKey::Faculty, "");

        assert!(!persist_filter_state(&mut store, &filters, 365).unwrap());
        assert!(store.is_empty());

        set_favourite(&mut store, false, 365).unwrap();
        assert!(!persist_filter_state(&mut store, &filters, 365).unwrap());
        assert_eq!(store.get("filter_group"), None);

        set_favourite(&mut store, true, 365).unwrap();
        assert!(persist_filter_state(&mut store, &filters, 365).unwrap());
        assert_eq!(store.get("filter_group").as_deref(), Some("G1"));
        assert_eq!(store.get("filter_faculty"), None);
    }
}
