//! Error type for `reach-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain rule violation (missing row, illegal transition, orphan).
  #[error(transparent)]
  Core(#[from] reach_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("decode error: {0}")]
  Decode(String),

  /// A versioned update found the row changed since it was read. The whole
  /// batch it belonged to has been rolled back.
  #[error("row {0} was modified since it was read; batch rolled back")]
  VersionConflict(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
