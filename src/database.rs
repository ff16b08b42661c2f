use std::{fs, path::Path};

use crate::model::AppState;
use crate::status;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::{debug, warn};

/// Slot under which the whole application state is stored.
pub const STATE_KEY: &str = "content_planner_state";

const DB_FILE_NAME: &str = "planner.sqlite";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// A single key/value slot holding the serialized state.
pub trait Persistence {
    fn load_raw(&self) -> StorageResult<Option<String>>;
    fn save_raw(&mut self, blob: &str) -> StorageResult<()>;
    /// Moves an unreadable blob aside so the next save does not destroy it.
    fn quarantine(&mut self, blob: &str) -> StorageResult<()>;
}

/// What `load_state` found in the slot.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Fresh,
    Restored,
    /// The stored document could not be decoded; state starts empty.
    Recovered { reason: String },
}

pub fn encode(state: &AppState) -> StorageResult<String> {
    Ok(serde_json::to_string(state)?)
}

pub fn decode(blob: &str) -> StorageResult<AppState> {
    Ok(serde_json::from_str(blob)?)
}

/// Reads the state from `persistence`, falling back to an empty state when
/// the slot is absent or holds a malformed document.
pub fn load_state<P: Persistence>(persistence: &mut P) -> StorageResult<(AppState, LoadOutcome)> {
    let blob = match persistence.load_raw()? {
        Some(blob) => blob,
        None => {
            debug!("no saved state, starting empty");
            return Ok((AppState::default(), LoadOutcome::Fresh));
        }
    };

    match decode(&blob) {
        Ok(mut state) => {
            let adopted = status::adopt_stored_statuses(&mut state.content_items);
            if adopted > 0 {
                debug!(items = adopted, "stored statuses kept as manual");
            }
            Ok((state, LoadOutcome::Restored))
        }
        Err(e) => {
            warn!(error = %e, "saved state is unreadable, starting empty");
            persistence.quarantine(&blob)?;
            Ok((
                AppState::default(),
                LoadOutcome::Recovered {
                    reason: e.to_string(),
                },
            ))
        }
    }
}

pub struct SqliteStorage {
    conn: Connection,
    key: String,
}

impl SqliteStorage {
    /// Opens (creating if needed) the database inside `data_dir`.
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        if !data_dir.is_dir() {
            fs::create_dir_all(data_dir)?;
        }
        let conn = Connection::open(data_dir.join(DB_FILE_NAME))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        init_db(&conn)?;
        Ok(SqliteStorage {
            conn,
            key: STATE_KEY.to_string(),
        })
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn quarantined(&self) -> StorageResult<Option<String>> {
        self.get(&quarantine_key(&self.key))
    }
}

fn quarantine_key(key: &str) -> String {
    format!("{}.corrupt", key)
}

fn init_db(conn: &Connection) -> StorageResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        params![],
    )?;
    Ok(())
}

impl Persistence for SqliteStorage {
    fn load_raw(&self) -> StorageResult<Option<String>> {
        self.get(&self.key)
    }

    fn save_raw(&mut self, blob: &str) -> StorageResult<()> {
        self.put(&self.key, blob)
    }

    fn quarantine(&mut self, blob: &str) -> StorageResult<()> {
        self.put(&quarantine_key(&self.key), blob)?;
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![self.key])?;
        Ok(())
    }
}

/// Keeps the slot in memory and counts writes. Setting `fail_saves` makes
/// every write return an IO error.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    pub blob: Option<String>,
    pub quarantined: Option<String>,
    pub saves: usize,
    pub fail_saves: bool,
}

impl MemoryStorage {
    pub fn with_blob(blob: impl Into<String>) -> Self {
        MemoryStorage {
            blob: Some(blob.into()),
            ..Default::default()
        }
    }

    pub fn saved_state(&self) -> Option<AppState> {
        self.blob.as_deref().and_then(|b| decode(b).ok())
    }
}

impl Persistence for MemoryStorage {
    fn load_raw(&self) -> StorageResult<Option<String>> {
        Ok(self.blob.clone())
    }

    fn save_raw(&mut self, blob: &str) -> StorageResult<()> {
        if self.fail_saves {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "storage unavailable",
            )));
        }
        self.blob = Some(blob.to_string());
        self.saves += 1;
        Ok(())
    }

    fn quarantine(&mut self, blob: &str) -> StorageResult<()> {
        self.quarantined = Some(blob.to_string());
        self.blob = None;
        Ok(())
    }
}
