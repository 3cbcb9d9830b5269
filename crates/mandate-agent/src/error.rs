//! Error type for agent round trips.
//!
//! The workflow treats every variant identically (failed round trip), so the
//! split here exists for logging, not for control flow.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The agent answered, but reported a non-success status.
  #[error("agent returned status {0:?}")]
  Agent(String),

  #[error("upload rejected: {0}")]
  UploadRejected(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
