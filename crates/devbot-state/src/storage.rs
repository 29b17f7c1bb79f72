use std::collections::HashMap;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{debug, instrument};

use crate::error::{Result, StateError};

/// A staged write against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Upsert { key: String, value: serde_json::Value },
    Delete { key: String },
}

impl Change {
    pub fn key(&self) -> &str {
        match self {
            Change::Upsert { key, .. } | Change::Delete { key } => key,
        }
    }
}

/// Key-value backing store for user and conversation records.
///
/// `write` must apply the whole batch or none of it: a turn's state is
/// committed once at the end of the turn.
pub trait Storage: Send + Sync {
    /// Return the stored values for whichever of `keys` exist.
    fn read(&self, keys: &[String]) -> Result<HashMap<String, serde_json::Value>>;

    /// Apply every change atomically.
    fn write(&self, changes: &[Change]) -> Result<()>;
}

/// In-process store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn read(&self, keys: &[String]) -> Result<HashMap<String, serde_json::Value>> {
        let entries = self.entries.lock().map_err(|_| StateError::LockPoisoned)?;
        Ok(keys
            .iter()
            .filter_map(|k| entries.get(k).map(|v| (k.clone(), v.clone())))
            .collect())
    }

    fn write(&self, changes: &[Change]) -> Result<()> {
        // Holding the lock for the whole batch makes it atomic to readers.
        let mut entries = self.entries.lock().map_err(|_| StateError::LockPoisoned)?;
        for change in changes {
            match change {
                Change::Upsert { key, value } => {
                    entries.insert(key.clone(), value.clone());
                }
                Change::Delete { key } => {
                    entries.remove(key);
                }
            }
        }
        Ok(())
    }
}

/// SQLite-backed store over the `bot_state` table (see [`crate::db::init_db`]).
pub struct SqliteStorage {
    db: Mutex<Connection>,
}

impl SqliteStorage {
    /// Wrap an already-open (and `init_db`-initialised) connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }
}

impl Storage for SqliteStorage {
    #[instrument(skip(self, keys), fields(count = keys.len()))]
    fn read(&self, keys: &[String]) -> Result<HashMap<String, serde_json::Value>> {
        let db = self.db.lock().map_err(|_| StateError::LockPoisoned)?;
        let mut stmt = db.prepare_cached("SELECT value FROM bot_state WHERE key = ?1")?;
        let mut found = HashMap::new();

        for key in keys {
            let raw: Option<String> =
                match stmt.query_row(rusqlite::params![key], |row| row.get(0)) {
                    Ok(v) => Some(v),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(StateError::Database(e)),
                };
            if let Some(raw) = raw {
                let value = serde_json::from_str(&raw).map_err(|source| {
                    StateError::Serialization {
                        key: key.clone(),
                        source,
                    }
                })?;
                found.insert(key.clone(), value);
            }
        }

        debug!(hits = found.len(), "state read");
        Ok(found)
    }

    #[instrument(skip(self, changes), fields(count = changes.len()))]
    fn write(&self, changes: &[Change]) -> Result<()> {
        let mut db = self.db.lock().map_err(|_| StateError::LockPoisoned)?;
        let now = chrono::Utc::now().to_rfc3339();

        // Single transaction: a failed statement rolls back the whole batch on drop.
        let tx = db.transaction()?;
        for change in changes {
            match change {
                Change::Upsert { key, value } => {
                    let raw = serde_json::to_string(value).map_err(|source| {
                        StateError::Serialization {
                            key: key.clone(),
                            source,
                        }
                    })?;
                    tx.execute(
                        "INSERT INTO bot_state (key, value, updated_at) VALUES (?1, ?2, ?3)
                         ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                        updated_at = excluded.updated_at",
                        rusqlite::params![key, raw, now],
                    )?;
                }
                Change::Delete { key } => {
                    tx.execute(
                        "DELETE FROM bot_state WHERE key = ?1",
                        rusqlite::params![key],
                    )?;
                }
            }
        }
        tx.commit()?;

        debug!("state committed");
        Ok(())
    }
}
