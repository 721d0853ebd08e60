//! Error types for `admission-core`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  Validation(FieldErrors),

  #[error("unknown step index: {0}")]
  UnknownStep(usize),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Field errors ────────────────────────────────────────────────────────────

/// A single rejected field, addressed by dotted path (e.g. `parents.0.email`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
  pub path:    String,
  pub message: String,
}

/// All field-level failures from one validation pass, in rule order.
///
/// Each path appears at most once; a later insert for the same path replaces
/// the earlier message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
    let path = path.into();
    let message = message.into();
    match self.0.iter_mut().find(|e| e.path == path) {
      Some(existing) => existing.message = message,
      None => self.0.push(FieldError { path, message }),
    }
  }

  /// The message recorded for `path`, if any.
  pub fn get(&self, path: &str) -> Option<&str> {
    self
      .0
      .iter()
      .find(|e| e.path == path)
      .map(|e| e.message.as_str())
  }

  pub fn contains(&self, path: &str) -> bool { self.get(path).is_some() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn iter(&self) -> impl Iterator<Item = &FieldError> { self.0.iter() }
}

impl fmt::Display for FieldErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, e) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{}: {}", e.path, e.message)?;
    }
    Ok(())
  }
}

impl IntoIterator for FieldErrors {
  type Item = FieldError;
  type IntoIter = std::vec::IntoIter<FieldError>;

  fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

impl From<FieldErrors> for Error {
  fn from(errors: FieldErrors) -> Self { Error::Validation(errors) }
}
