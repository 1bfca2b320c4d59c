//! Best-effort mirror layer over a storage backend.

use sha2::{Digest, Sha256};
use std::sync::Arc;

use super::storage::{MirrorRecord, MirrorStorage, NoopStorage};
use super::traits::{Cacheable, MirrorSnapshot};
use crate::error::PersistenceError;

/// Durable mirror of one collection per entity type.
///
/// Neither `load` nor `save` fails: a missing, unreadable or corrupt mirror
/// loads as empty, and a failed write is logged and dropped. Callers never
/// see a `PersistenceError`.
#[derive(Clone)]
pub struct DurableMirror {
  storage: Arc<dyn MirrorStorage>,
}

impl DurableMirror {
  /// Create a mirror over the given storage backend.
  pub fn new(storage: impl MirrorStorage + 'static) -> Self {
    Self::from_shared(Arc::new(storage))
  }

  /// Create a mirror over storage the caller keeps a handle to.
  pub fn from_shared(storage: Arc<dyn MirrorStorage>) -> Self {
    Self { storage }
  }

  /// A mirror for headless contexts: loads are empty, saves are dropped.
  pub fn disabled() -> Self {
    Self::new(NoopStorage)
  }

  /// Load the mirrored collection, or an empty one.
  pub fn load<T: Cacheable>(&self) -> Vec<T> {
    self
      .load_snapshot()
      .map(|snapshot| snapshot.items)
      .unwrap_or_default()
  }

  /// Load the mirrored collection along with when it was saved.
  pub fn load_snapshot<T: Cacheable>(&self) -> Option<MirrorSnapshot<T>> {
    match self.try_load() {
      Ok(snapshot) => snapshot,
      Err(e) => {
        tracing::warn!(namespace = T::namespace(), error = %e, "Ignoring unreadable mirror");
        None
      }
    }
  }

  /// Replace the mirrored collection.
  pub fn save<T: Cacheable>(&self, items: &[T]) {
    if let Err(e) = self.try_save(items) {
      tracing::warn!(namespace = T::namespace(), error = %e, "Failed to write mirror");
    }
  }

  fn try_load<T: Cacheable>(&self) -> Result<Option<MirrorSnapshot<T>>, PersistenceError> {
    let namespace = T::namespace();
    let Some(stored) = self.storage.read(namespace)? else {
      return Ok(None);
    };

    let record = stored.record;
    let actual = digest(&record.payload);
    if actual != record.digest {
      return Err(PersistenceError::Corrupt {
        namespace: namespace.to_string(),
        reason: format!("digest mismatch (stored {}, computed {})", record.digest, actual),
      });
    }

    let items: Vec<T> = serde_json::from_slice(&record.payload)?;
    if items.len() != record.item_count {
      return Err(PersistenceError::Corrupt {
        namespace: namespace.to_string(),
        reason: format!(
          "expected {} items, found {}",
          record.item_count,
          items.len()
        ),
      });
    }

    tracing::debug!(namespace, count = items.len(), "Loaded mirror");
    Ok(Some(MirrorSnapshot {
      items,
      saved_at: stored.saved_at,
    }))
  }

  /// Write the collection, keeping the previous entry when the new one
  /// would not read back (e.g. a non-finite float encodes as `null`).
  fn try_save<T: Cacheable>(&self, items: &[T]) -> Result<(), PersistenceError> {
    let payload = serde_json::to_vec(items)?;
    if let Err(e) = serde_json::from_slice::<Vec<T>>(&payload) {
      return Err(PersistenceError::Unrepresentable {
        namespace: T::namespace().to_string(),
        reason: e.to_string(),
      });
    }
    let record = MirrorRecord {
      digest: digest(&payload),
      payload,
      item_count: items.len(),
    };

    self.storage.write(T::namespace(), &record)?;
    tracing::debug!(namespace = T::namespace(), count = items.len(), "Saved mirror");
    Ok(())
  }
}

/// Hex SHA-256 of a payload
fn digest(payload: &[u8]) -> String {
  let mut hasher = Sha256::new();
  hasher.update(payload);
  hex::encode(hasher.finalize())
}
