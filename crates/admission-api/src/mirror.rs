//! Best-effort dispatch of new records to the mirror sink.

use std::sync::Arc;

use admission_core::{
  application::ApplicationRecord,
  mirror::{MirrorRow, MirrorSink},
};
use chrono::Utc;

/// Append `record` to `mirror` on a detached task.
///
/// Never blocks the caller and never reports back: the outcome is only
/// logged. Returns the task handle so tests can wait for it.
pub fn spawn_append<M>(
  mirror: Arc<M>,
  record: &ApplicationRecord,
) -> Option<tokio::task::JoinHandle<()>>
where
  M: MirrorSink + 'static,
{
  let reference = record.reference_number.clone();
  let row = match MirrorRow::from_record(record, Utc::now()) {
    Ok(row) => row,
    Err(e) => {
      tracing::warn!(%reference, error = %e, "could not build mirror row");
      return None;
    }
  };

  Some(tokio::spawn(async move {
    match mirror.append(row).await {
      Ok(()) => tracing::debug!(%reference, "application mirrored"),
      Err(e) => tracing::warn!(%reference, error = %e, "mirror append failed"),
    }
  }))
}
