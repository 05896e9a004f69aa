//! Error types for `scribe-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid post id: {0:?}")]
  InvalidPostId(String),

  #[error("invalid email address: {0:?}")]
  InvalidEmail(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
