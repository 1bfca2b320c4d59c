//! Mirror storage trait and its backends.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::PersistenceError;

/// A serialized collection as handed to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorRecord {
  /// Serialized sequence
  pub payload: Vec<u8>,
  /// Hex SHA-256 of the payload
  pub digest: String,
  /// Number of entities in the payload
  pub item_count: usize,
}

/// A record read back from storage.
#[derive(Debug, Clone)]
pub struct StoredRecord {
  pub record: MirrorRecord,
  /// When the record was written
  pub saved_at: DateTime<Utc>,
}

/// Trait for mirror storage backends.
///
/// Backends only move bytes; serialization and integrity checks live in
/// the mirror layer.
pub trait MirrorStorage: Send + Sync {
  /// Read the record stored under a namespace.
  fn read(&self, namespace: &str) -> Result<Option<StoredRecord>, PersistenceError>;

  /// Replace the record stored under a namespace.
  fn write(&self, namespace: &str, record: &MirrorRecord) -> Result<(), PersistenceError>;
}

/// Storage that doesn't keep anything.
/// Used where no durable medium exists - reads miss, writes are discarded.
pub struct NoopStorage;

impl MirrorStorage for NoopStorage {
  fn read(&self, _namespace: &str) -> Result<Option<StoredRecord>, PersistenceError> {
    Ok(None) // Always miss
  }

  fn write(&self, _namespace: &str, _record: &MirrorRecord) -> Result<(), PersistenceError> {
    Ok(()) // Discard
  }
}

/// Process-local storage, lost on exit.
#[derive(Default)]
pub struct MemoryStorage {
  records: Mutex<HashMap<String, StoredRecord>>,
  writes: AtomicUsize,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of successful writes since creation.
  pub fn write_count(&self) -> usize {
    self.writes.load(Ordering::SeqCst)
  }

  /// Overwrite the stored payload without updating its digest.
  #[cfg(test)]
  pub fn tamper(&self, namespace: &str, payload: &[u8]) {
    if let Ok(mut records) = self.records.lock() {
      if let Some(stored) = records.get_mut(namespace) {
        stored.record.payload = payload.to_vec();
      }
    }
  }
}

impl MirrorStorage for MemoryStorage {
  fn read(&self, namespace: &str) -> Result<Option<StoredRecord>, PersistenceError> {
    let records = self
      .records
      .lock()
      .map_err(|e| PersistenceError::Unavailable(format!("Lock poisoned: {}", e)))?;
    Ok(records.get(namespace).cloned())
  }

  fn write(&self, namespace: &str, record: &MirrorRecord) -> Result<(), PersistenceError> {
    let mut records = self
      .records
      .lock()
      .map_err(|e| PersistenceError::Unavailable(format!("Lock poisoned: {}", e)))?;
    records.insert(
      namespace.to_string(),
      StoredRecord {
        record: record.clone(),
        saved_at: Utc::now(),
      },
    );
    self.writes.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }
}

/// SQLite-based mirror storage.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

/// Schema for the mirror table.
const MIRROR_SCHEMA: &str = r#"
-- One serialized collection per namespace
CREATE TABLE IF NOT EXISTS mirror (
    namespace TEXT PRIMARY KEY,
    payload BLOB NOT NULL,
    digest TEXT NOT NULL,
    item_count INTEGER NOT NULL,
    saved_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl SqliteStorage {
  /// Open or create the mirror database at `path`.
  pub fn open(path: &Path) -> Result<Self, PersistenceError> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).map_err(|e| {
        PersistenceError::Unavailable(format!(
          "Failed to create mirror directory {}: {}",
          parent.display(),
          e
        ))
      })?;
    }

    let conn = Connection::open(path)?;
    Self::with_connection(conn)
  }

  /// A throwaway database, mostly for tests.
  pub fn open_in_memory() -> Result<Self, PersistenceError> {
    Self::with_connection(Connection::open_in_memory()?)
  }

  fn with_connection(conn: Connection) -> Result<Self, PersistenceError> {
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;
    Ok(storage)
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, PersistenceError> {
    self
      .conn
      .lock()
      .map_err(|e| PersistenceError::Unavailable(format!("Lock poisoned: {}", e)))
  }

  fn run_migrations(&self) -> Result<(), PersistenceError> {
    self.lock()?.execute_batch(MIRROR_SCHEMA)?;
    Ok(())
  }
}

impl MirrorStorage for SqliteStorage {
  fn read(&self, namespace: &str) -> Result<Option<StoredRecord>, PersistenceError> {
    let conn = self.lock()?;

    let row: Option<(Vec<u8>, String, i64, String)> = conn
      .query_row(
        "SELECT payload, digest, item_count, saved_at FROM mirror WHERE namespace = ?",
        params![namespace],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
      )
      .optional()?;

    let Some((payload, digest, item_count, saved_at)) = row else {
      return Ok(None);
    };

    let item_count = usize::try_from(item_count).map_err(|_| PersistenceError::Corrupt {
      namespace: namespace.to_string(),
      reason: format!("negative item count {}", item_count),
    })?;

    Ok(Some(StoredRecord {
      record: MirrorRecord {
        payload,
        digest,
        item_count,
      },
      saved_at: parse_datetime(namespace, &saved_at)?,
    }))
  }

  fn write(&self, namespace: &str, record: &MirrorRecord) -> Result<(), PersistenceError> {
    let conn = self.lock()?;

    conn.execute(
      "INSERT OR REPLACE INTO mirror (namespace, payload, digest, item_count, saved_at)
       VALUES (?, ?, ?, ?, datetime('now'))",
      params![
        namespace,
        record.payload,
        record.digest,
        record.item_count as i64
      ],
    )?;

    Ok(())
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(namespace: &str, s: &str) -> Result<DateTime<Utc>, PersistenceError> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| PersistenceError::Corrupt {
      namespace: namespace.to_string(),
      reason: format!("bad saved_at '{}': {}", s, e),
    })
}
