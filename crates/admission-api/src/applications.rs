//! Handlers for reading and patching stored applications.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/applications` | Every record in id order |
//! | `GET`   | `/applications/:id` | 404 if not found |
//! | `PATCH` | `/applications/:id` | Shallow merge; 404 if not found, 400 if the result is invalid |
//! | `GET`   | `/applications/reference/:ref` | Case-insensitive; 404 if not found |

use admission_core::{
  application::ApplicationRecord, merge::ApplicationPatch, mirror::MirrorSink,
  reference, store::ApplicationStore,
};
use axum::{
  Json,
  extract::{Path, State},
};

use crate::{ApiState, error::ApiError};

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /applications`
pub async fn list<S, M>(
  State(state): State<ApiState<S, M>>,
) -> Result<Json<Vec<ApplicationRecord>>, ApiError>
where
  S: ApplicationStore,
  M: MirrorSink,
{
  let records = state.store.list().await.map_err(ApiError::store)?;
  Ok(Json(records))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /applications/:id`
pub async fn get_one<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<i64>,
) -> Result<Json<ApplicationRecord>, ApiError>
where
  S: ApplicationStore,
  M: MirrorSink,
{
  let record = state
    .store
    .get_by_id(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(ApiError::application_not_found)?;
  Ok(Json(record))
}

/// `GET /applications/reference/:ref`
pub async fn by_reference<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(reference): Path<String>,
) -> Result<Json<ApplicationRecord>, ApiError>
where
  S: ApplicationStore,
  M: MirrorSink,
{
  let reference = reference::normalize(&reference);
  let record = state
    .store
    .get_by_reference(&reference)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(ApiError::application_not_found)?;
  Ok(Json(record))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PATCH /applications/:id`. Body: any subset of the record's top-level
/// fields.
///
/// The merged record must still pass full validation; the store checks this
/// against the row it writes. Identity fields in the body are ignored.
pub async fn update<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<i64>,
  Json(patch): Json<ApplicationPatch>,
) -> Result<Json<ApplicationRecord>, ApiError>
where
  S: ApplicationStore,
  M: MirrorSink,
{
  let updated = state.store.update(id, patch).await.map_err(|e| {
    let e = ApiError::store(e);
    if matches!(e, ApiError::Validation(_) | ApiError::BadRequest(_)) {
      tracing::warn!(id, error = %e, "rejected application update");
    }
    e
  })?;
  tracing::info!(id, reference = %updated.reference_number, "application updated");
  Ok(Json(updated))
}
