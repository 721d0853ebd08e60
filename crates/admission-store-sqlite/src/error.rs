//! Error type for `admission-store-sqlite`.

use admission_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] admission_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown application status: {0:?}")]
  UnknownStatus(String),

  /// Attempted to update an application that does not exist.
  #[error("application not found: {0}")]
  NotFound(i64),

  #[error("no unique reference number after {0} attempts")]
  ReferenceExhausted(usize),
}

impl StoreError for Error {
  fn is_not_found(&self) -> bool { matches!(self, Error::NotFound(_)) }

  fn rejection(&self) -> Option<&admission_core::Error> {
    match self {
      Error::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
