//! Durable mirror of the canonical product collection.
//!
//! This module keeps a best-effort local copy of a collection so a session
//! can start from the last known state without a remote round-trip:
//! - One serialized sequence per namespace, replaced wholesale on save
//! - Order and duplicates are preserved exactly
//! - A content digest guards against torn or tampered rows
//! - Storage is injected: SQLite on disk, in-memory, or a no-op for headless use

mod layer;
mod storage;
mod traits;

pub use layer::DurableMirror;
pub use storage::{MemoryStorage, MirrorRecord, MirrorStorage, NoopStorage, SqliteStorage, StoredRecord};
pub use traits::{Cacheable, MirrorSnapshot};
