//! Error types for `admission-wizard`.

use admission_core::{FieldErrors, Step};
use thiserror::Error;

/// Failure to write or remove the local draft.
#[derive(Debug, Error)]
pub enum DraftError {
  #[error("draft i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("draft encoding error: {0}")]
  Json(#[from] serde_json::Error),

  /// Only produced by stores configured to fail, for tests.
  #[error("draft storage unavailable")]
  Unavailable,
}

/// A rejected edit to a [`StepForm`](crate::StepForm).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
  #[error("{step:?} has no field {field:?}")]
  UnknownField { step: Step, field: String },

  #[error("{0:?} is not a list field")]
  NotAList(String),

  #[error("invalid field path {0:?}")]
  InvalidPath(String),

  #[error("no entry {index} at {path:?}")]
  IndexOutOfRange { path: String, index: usize },
}

/// Failures talking to the admission API.
#[derive(Debug, Error)]
pub enum ClientError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("invalid base url {0:?}")]
  InvalidUrl(String),

  #[error("server rejected the application: {0}")]
  Rejected(FieldErrors),

  #[error("server returned {status}: {message}")]
  Status { status: u16, message: String },
}

#[derive(Debug, Error)]
pub enum WizardError {
  /// The step's answers failed validation; nothing was saved.
  #[error("validation failed: {0}")]
  Validation(FieldErrors),

  #[error("could not save draft: {0}")]
  Draft(#[from] DraftError),

  /// The final submission failed; the draft is kept for a retry.
  #[error("submission failed: {0}")]
  Submission(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("already on the first step")]
  AtFirstStep,

  #[error("application already submitted")]
  AlreadySubmitted,

  #[error("a submission is in progress")]
  Busy,

  #[error(transparent)]
  Core(admission_core::Error),
}

impl From<admission_core::Error> for WizardError {
  fn from(e: admission_core::Error) -> Self {
    match e {
      admission_core::Error::Validation(fields) => WizardError::Validation(fields),
      other => WizardError::Core(other),
    }
  }
}
