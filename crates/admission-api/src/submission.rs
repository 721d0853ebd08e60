//! Handler for `POST /applications`, the final wizard submission.

use admission_core::{mirror::MirrorSink, schema, store::ApplicationStore};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::Value;

use crate::{ApiState, error::ApiError, mirror};

/// `POST /applications`. Body: the full application as one JSON object.
///
/// Returns 201 + the stored record. Every field is validated again here. The
/// mirror append runs after the response is decided and cannot change it.
pub async fn create<S, M>(
  State(state): State<ApiState<S, M>>,
  Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ApplicationStore + 'static,
  M: MirrorSink + 'static,
{
  let Value::Object(fields) = body else {
    return Err(ApiError::BadRequest("expected a JSON object".into()));
  };

  let application = match schema::validate_application(&fields) {
    Ok(application) => application,
    Err(e) => {
      tracing::warn!(error = %e, "rejected application submission");
      return Err(e.into());
    }
  };

  let record = state
    .store
    .create(application)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(
    id = record.id,
    reference = %record.reference_number,
    "application submitted"
  );

  mirror::spawn_append(state.mirror.clone(), &record);
  Ok((StatusCode::CREATED, Json(record)))
}
