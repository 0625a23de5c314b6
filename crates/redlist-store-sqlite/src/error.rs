//! Error type for `redlist-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A value SQLite cannot hold as-is.
  #[error("{column} value {value} does not fit the store")]
  Encode { column: &'static str, value: String },

  /// A stored value outside the canonical vocabulary.
  #[error("invalid {column} value in store: {value:?}")]
  Decode { column: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
