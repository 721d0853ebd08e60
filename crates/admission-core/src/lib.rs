//! Core types and trait definitions for the admission application service.
//!
//! No HTTP or database dependencies. The wizard client and the server both
//! build on it, and the step schema registry defined here holds the
//! validation rules for either side.

pub mod application;
pub mod error;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod merge;
pub mod mirror;
pub mod reference;
pub mod schema;
pub mod step;
pub mod store;

pub use error::{Error, FieldError, FieldErrors, Result};
pub use step::{STEP_COUNT, Step};
