//! The step-sequencing state machine.

use std::future::Future;

use admission_core::{
  STEP_COUNT, Step,
  application::{ApplicationRecord, ApplicationStatus},
  merge::replace_step,
  schema,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
  draft::{Draft, DraftStore},
  error::WizardError,
  form::StepForm,
};

// ─── Submission ──────────────────────────────────────────────────────────────

/// What the server hands back for a created application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
  pub id:               i64,
  pub reference_number: String,
  pub status:           ApplicationStatus,
}

impl From<&ApplicationRecord> for Receipt {
  fn from(record: &ApplicationRecord) -> Self {
    Self {
      id:               record.id,
      reference_number: record.reference_number.clone(),
      status:           record.status,
    }
  }
}

/// Delivers a complete application to wherever it is stored.
pub trait Submitter {
  type Error: std::error::Error + Send + Sync + 'static;

  fn submit<'a>(
    &'a self,
    record: &'a Map<String, Value>,
  ) -> impl Future<Output = Result<Receipt, Self::Error>> + Send + 'a;
}

// ─── State ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
  /// Showing `Step`, waiting for its answers.
  AtStep(Step),
  /// The final record is in flight.
  Submitting,
  /// Done; the draft has been cleared.
  Submitted(Receipt),
}

/// Outcome of a successful [`Wizard::submit_step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
  /// The step was saved; show this one next.
  Next(Step),
  /// The whole application was accepted.
  Submitted(Receipt),
}

// ─── Wizard ──────────────────────────────────────────────────────────────────

/// Drives one applicant through the steps, resuming from `D` if it holds a
/// draft.
///
/// Only validated step output is ever merged. The draft is written before
/// the in-memory state moves, so a failed save leaves the wizard where it
/// was.
#[derive(Debug)]
pub struct Wizard<D> {
  drafts:    D,
  state:     WizardState,
  record:    Map<String, Value>,
  /// Steps `0..completed` have been accepted. Always the saved draft's step
  /// until submission succeeds.
  completed: usize,
}

impl<D: DraftStore> Wizard<D> {
  /// Start at the saved draft, or at the first step if there is none.
  pub fn restore(drafts: D) -> Self {
    let (step, record) = match drafts.load() {
      Some(draft) => match Step::from_index(draft.step) {
        Some(step) => (step, draft.data),
        None => {
          tracing::warn!(step = draft.step, "draft step out of range, starting over");
          (Step::first(), Map::new())
        }
      },
      None => (Step::first(), Map::new()),
    };

    tracing::debug!(step = step.index(), "wizard restored");
    Self {
      drafts,
      state: WizardState::AtStep(step),
      record,
      completed: step.index(),
    }
  }

  pub fn state(&self) -> &WizardState { &self.state }

  /// The step being shown, or `None` once submission has begun.
  pub fn current_step(&self) -> Option<Step> {
    match self.state {
      WizardState::AtStep(step) => Some(step),
      _ => None,
    }
  }

  /// Steps whose answers have been accepted, in order.
  pub fn completed_steps(&self) -> Vec<Step> {
    (0..self.completed.min(STEP_COUNT))
      .filter_map(Step::from_index)
      .collect()
  }

  /// Every accepted answer so far.
  pub fn record(&self) -> &Map<String, Value> { &self.record }

  /// The reference number, once submitted.
  pub fn reference(&self) -> Option<&str> {
    match &self.state {
      WizardState::Submitted(receipt) => Some(&receipt.reference_number),
      _ => None,
    }
  }

  pub fn drafts(&self) -> &D { &self.drafts }

  /// An editable form for the current step, prefilled from the record.
  pub fn form(&self) -> Result<StepForm, WizardError> {
    Ok(StepForm::prefilled(self.ready_step()?, &self.record))
  }

  /// Accept `data` as the answers to the current step.
  ///
  /// The answers replace everything previously recorded for the step, so an
  /// optional field left blank is cleared. Later steps stay recorded but are
  /// no longer counted as completed.
  ///
  /// On every step but the last this saves the draft and moves on. On the
  /// last step the merged record is validated as a whole and handed to
  /// `submitter`; on failure the wizard stays on the last step and the draft
  /// is kept.
  pub async fn submit_step<S: Submitter>(
    &mut self,
    data: Map<String, Value>,
    submitter: &S,
  ) -> Result<Advance, WizardError> {
    let step = self.ready_step()?;
    let accepted = schema::validate(step, &data).map_err(WizardError::Validation)?;
    let merged = replace_step(&self.record, step, accepted);

    let Some(next) = step.next() else {
      schema::validate_application(&merged)?;
      self.record = merged;
      return self.finish(step, submitter).await;
    };

    self.drafts.save(&Draft { step: next.index(), data: merged.clone() })?;
    self.record = merged;
    self.completed = next.index();
    self.state = WizardState::AtStep(next);
    tracing::debug!(step = next.index(), "step accepted");
    Ok(Advance::Next(next))
  }

  /// Return to the previous step without touching the record or the draft.
  pub fn back(&mut self) -> Result<Step, WizardError> {
    let step = self.ready_step()?;
    let previous = step.previous().ok_or(WizardError::AtFirstStep)?;
    self.state = WizardState::AtStep(previous);
    Ok(previous)
  }

  fn ready_step(&self) -> Result<Step, WizardError> {
    match self.state {
      WizardState::AtStep(step) => Ok(step),
      WizardState::Submitting => Err(WizardError::Busy),
      WizardState::Submitted(_) => Err(WizardError::AlreadySubmitted),
    }
  }

  async fn finish<S: Submitter>(
    &mut self,
    last: Step,
    submitter: &S,
  ) -> Result<Advance, WizardError> {
    self.state = WizardState::Submitting;

    match submitter.submit(&self.record).await {
      Ok(receipt) => {
        tracing::info!(reference = %receipt.reference_number, "application submitted");
        if let Err(e) = self.drafts.clear() {
          tracing::warn!(error = %e, "could not clear draft after submission");
        }
        self.completed = STEP_COUNT;
        self.state = WizardState::Submitted(receipt.clone());
        Ok(Advance::Submitted(receipt))
      }
      Err(e) => {
        tracing::warn!(error = %e, "submission failed, keeping draft");
        self.state = WizardState::AtStep(last);
        Err(WizardError::Submission(Box::new(e)))
      }
    }
  }
}
