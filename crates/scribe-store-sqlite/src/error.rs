//! Error type for `scribe-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] scribe_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("integer out of range in column {0}")]
  OutOfRange(&'static str),
}

impl From<Error> for tokio_rusqlite::Error {
  /// Lets row decoding run inside a `Connection::call` closure.
  fn from(e: Error) -> Self {
    match e {
      Error::Database(inner) => inner,
      other => tokio_rusqlite::Error::Other(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
