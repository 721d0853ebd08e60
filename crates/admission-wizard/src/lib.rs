//! Client side of the admission wizard.
//!
//! A [`Wizard`] walks an applicant through the seven steps in order. Each
//! step's answers are validated, shallow-merged into an accumulating record
//! and saved to a [`DraftStore`] so an interrupted session resumes where it
//! stopped. The last step hands the whole record to a [`Submitter`], usually
//! the HTTP [`ApiClient`].

pub mod client;
pub mod draft;
pub mod error;
pub mod form;
pub mod wizard;

pub use client::ApiClient;
pub use draft::{Draft, DraftStore, FileDraftStore, MemoryDraftStore};
pub use error::{ClientError, DraftError, FormError, WizardError};
pub use form::StepForm;
pub use wizard::{Advance, Receipt, Submitter, Wizard, WizardState};
