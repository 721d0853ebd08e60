//! The `ApplicationStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `admission-store-sqlite`). The HTTP layer depends on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use crate::{
  application::{ApplicationRecord, NewApplication},
  merge::ApplicationPatch,
};

/// What callers need to know about a failed store operation.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The addressed record does not exist.
  fn is_not_found(&self) -> bool;

  /// The domain error behind a refused change, if that is why it failed.
  fn rejection(&self) -> Option<&crate::Error>;
}

/// Authoritative storage for submitted applications, addressable by numeric
/// id and by reference number.
///
/// Records are never deleted through this trait; retention is an external
/// policy.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ApplicationStore: Send + Sync {
  type Error: StoreError;

  /// Persist a validated application.
  ///
  /// The store allocates the next id from a sequence it owns, generates a
  /// unique uppercase reference number and sets the status to `draft`. Safe
  /// to call concurrently.
  fn create(
    &self,
    application: NewApplication,
  ) -> impl Future<Output = Result<ApplicationRecord, Self::Error>> + Send + '_;

  /// Retrieve a record by id. Returns `None` if not found.
  fn get_by_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<ApplicationRecord>, Self::Error>> + Send + '_;

  /// Retrieve a record by reference number. References are stored
  /// uppercase and compared as stored; callers normalise user input with
  /// [`reference::normalize`](crate::reference::normalize).
  fn get_by_reference<'a>(
    &'a self,
    reference: &'a str,
  ) -> impl Future<Output = Result<Option<ApplicationRecord>, Self::Error>> + Send + 'a;

  /// Shallow-merge `patch` into the record with `id` and return the result.
  ///
  /// Must fail with a not-found error, never create, when `id` is absent.
  /// The patch is applied with [`ApplicationPatch::apply`] against the row as
  /// it is at write time, so a merge that would leave the record invalid is
  /// refused with [`StoreError::rejection`] set and nothing is written.
  fn update(
    &self,
    id: i64,
    patch: ApplicationPatch,
  ) -> impl Future<Output = Result<ApplicationRecord, Self::Error>> + Send + '_;

  /// All records in id order. Administrative use only.
  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<ApplicationRecord>, Self::Error>> + Send + '_;
}
