//! JSON REST API for school admission applications.
//!
//! Exposes an axum [`Router`] backed by any
//! [`ApplicationStore`](admission_core::store::ApplicationStore) and any
//! [`MirrorSink`](admission_core::mirror::MirrorSink). Auth, TLS, and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", admission_api::api_router(ApiState::new(store, mirror)))
//! ```

pub mod applications;
pub mod error;
pub mod mirror;
pub mod photo;
pub mod submission;

use std::sync::Arc;

use admission_core::{mirror::MirrorSink, store::ApplicationStore};
use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};

pub use error::ApiError;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S, M> {
  pub store:  Arc<S>,
  pub mirror: Arc<M>,
}

impl<S, M> ApiState<S, M> {
  pub fn new(store: Arc<S>, mirror: Arc<M>) -> Self { Self { store, mirror } }
}

// No `S: Clone` or `M: Clone` bound.
impl<S, M> Clone for ApiState<S, M> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), mirror: Arc::clone(&self.mirror) }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, M>(state: ApiState<S, M>) -> Router<()>
where
  S: ApplicationStore + 'static,
  M: MirrorSink + 'static,
{
  Router::new()
    .route(
      "/applications",
      get(applications::list::<S, M>).post(submission::create::<S, M>),
    )
    .route(
      "/applications/{id}",
      get(applications::get_one::<S, M>).patch(applications::update::<S, M>),
    )
    .route(
      "/applications/{id}/photo",
      post(photo::upload::<S, M>)
        .layer(DefaultBodyLimit::max(photo::BODY_LIMIT)),
    )
    .route(
      "/applications/reference/{reference}",
      get(applications::by_reference::<S, M>),
    )
    .with_state(state)
}
