//! Handler for `POST /applications/:id/photo`.
//!
//! The photo arrives as the multipart file field `photo` and is stored on the
//! record as standard base64.

use admission_core::{
  application::ApplicationRecord, merge::ApplicationPatch, mirror::MirrorSink,
  store::ApplicationStore,
};
use axum::{
  Json,
  extract::{Multipart, Path, State},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};

use crate::{ApiState, error::ApiError};

/// Largest accepted photo, in bytes (5 MiB).
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Request body limit for the photo route: the photo plus room for multipart
/// framing.
pub const BODY_LIMIT: usize = MAX_PHOTO_BYTES + 64 * 1024;

const FIELD_NAME: &str = "photo";

/// `POST /applications/:id/photo`: multipart body with a `photo` file part.
pub async fn upload<S, M>(
  State(state): State<ApiState<S, M>>,
  Path(id): Path<i64>,
  mut multipart: Multipart,
) -> Result<Json<ApplicationRecord>, ApiError>
where
  S: ApplicationStore,
  M: MirrorSink,
{
  if state
    .store
    .get_by_id(id)
    .await
    .map_err(ApiError::store)?
    .is_none()
  {
    return Err(ApiError::application_not_found());
  }

  let mut photo = None;
  while let Some(field) = multipart.next_field().await? {
    if field.name() == Some(FIELD_NAME) {
      photo = Some(field.bytes().await?);
      break;
    }
  }

  let Some(photo) = photo.filter(|bytes| !bytes.is_empty()) else {
    tracing::warn!(id, "photo upload without a file");
    return Err(ApiError::BadRequest("no photo uploaded".into()));
  };
  if photo.len() > MAX_PHOTO_BYTES {
    tracing::warn!(id, size = photo.len(), "photo upload too large");
    return Err(ApiError::PayloadTooLarge(format!(
      "photo exceeds {MAX_PHOTO_BYTES} bytes"
    )));
  }

  let record = state
    .store
    .update(id, ApplicationPatch::photo(B64.encode(&photo)))
    .await
    .map_err(ApiError::store)?;
  tracing::info!(id, size = photo.len(), "photo attached");
  Ok(Json(record))
}
