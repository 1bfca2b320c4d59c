//! Typed failures for the remote resource and the durable mirror.

use thiserror::Error;

/// A call against the remote product resource failed.
#[derive(Debug, Error)]
pub enum TransportError {
  /// The request could not be built or sent, or the body could not be read
  #[error("request failed: {0}")]
  Network(#[from] reqwest::Error),

  /// The resource answered with a non-2xx status
  #[error("server responded with status {status}: {body}")]
  Status {
    status: reqwest::StatusCode,
    body: String,
  },

  /// The response body was not the expected shape
  #[error("failed to decode response: {0}")]
  Decode(#[from] serde_json::Error),

  /// The resource returned an entity without an identifier
  #[error("response entity has no id")]
  MissingId,

  /// The address for the call could not be built
  #[error("invalid resource address: {0}")]
  Url(#[from] url::ParseError),
}

/// The durable mirror could not be read or written.
///
/// These never reach the store: the mirror layer logs them and degrades to
/// an empty load or a skipped save.
#[derive(Debug, Error)]
pub enum PersistenceError {
  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("failed to (de)serialize mirror contents: {0}")]
  Serde(#[from] serde_json::Error),

  #[error("mirror entry for '{namespace}' is corrupt: {reason}")]
  Corrupt { namespace: String, reason: String },

  /// The collection would not load back the way it was written
  #[error("refusing to mirror '{namespace}': {reason}")]
  Unrepresentable { namespace: String, reason: String },

  #[error("mirror storage unavailable: {0}")]
  Unavailable(String),
}
