//! Error types for `mandate-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown rule category: {0:?}")]
  UnknownCategory(String),

  #[error("unknown breach severity: {0:?}")]
  UnknownSeverity(String),

  #[error("unknown version status: {0:?}")]
  UnknownVersionStatus(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
