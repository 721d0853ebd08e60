//! API error type and [`axum::response::IntoResponse`] implementation.

use admission_core::{FieldErrors, store::StoreError};
use axum::{
  Json,
  extract::multipart::MultipartError,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("validation failed: {0}")]
  Validation(FieldErrors),

  #[error("payload too large: {0}")]
  PayloadTooLarge(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub(crate) fn application_not_found() -> Self {
    ApiError::NotFound("application not found".into())
  }

  /// Classify a store failure: missing rows are 404s, refused changes are
  /// 400s, anything else is a 500.
  pub(crate) fn store(e: impl StoreError) -> Self {
    if e.is_not_found() {
      return ApiError::application_not_found();
    }
    match e.rejection() {
      Some(admission_core::Error::Validation(fields)) => {
        ApiError::Validation(fields.clone())
      }
      Some(other) => ApiError::BadRequest(other.to_string()),
      None => ApiError::Store(Box::new(e)),
    }
  }
}

impl From<admission_core::Error> for ApiError {
  fn from(e: admission_core::Error) -> Self {
    match e {
      admission_core::Error::Validation(fields) => ApiError::Validation(fields),
      other => ApiError::BadRequest(other.to_string()),
    }
  }
}

impl From<MultipartError> for ApiError {
  fn from(e: MultipartError) -> Self {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
      ApiError::PayloadTooLarge(e.body_text())
    } else {
      ApiError::BadRequest(e.body_text())
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Validation(fields) => (
        StatusCode::BAD_REQUEST,
        json!({ "error": "validation failed", "fields": fields }),
      ),
      ApiError::PayloadTooLarge(m) => {
        (StatusCode::PAYLOAD_TOO_LARGE, json!({ "error": m }))
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          json!({ "error": "internal server error" }),
        )
      }
    };
    (status, Json(body)).into_response()
  }
}
