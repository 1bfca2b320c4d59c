//! Core traits and types for the mirror.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// Trait for collections that can be mirrored.
///
/// Each entity type is stored under a single fixed namespace key.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Namespace the collection is stored under (e.g., "products")
  fn namespace() -> &'static str;
}

/// A collection read back from the mirror, with the time it was saved.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorSnapshot<T> {
  /// The mirrored entities in saved order
  pub items: Vec<T>,
  /// When the collection was written
  pub saved_at: DateTime<Utc>,
}

impl<T> MirrorSnapshot<T> {
  /// Age of the snapshot relative to now.
  pub fn age(&self) -> chrono::Duration {
    Utc::now() - self.saved_at
  }
}
