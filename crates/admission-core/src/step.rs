//! The fixed, ordered sequence of wizard steps.

use strum::{AsRefStr, EnumIter, IntoEnumIterator};

use crate::{Error, schema::Field};

/// Number of steps in the wizard.
pub const STEP_COUNT: usize = 7;

/// One page of the admission wizard. Declaration order is step order.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Step {
  Student,
  Address,
  Guardians,
  Medical,
  Education,
  EmergencyBanking,
  Terms,
}

impl Step {
  pub fn first() -> Self { Self::Student }

  pub fn index(self) -> usize { self as usize }

  pub fn from_index(index: usize) -> Option<Self> { Self::iter().nth(index) }

  pub fn next(self) -> Option<Self> { Self::from_index(self.index() + 1) }

  pub fn previous(self) -> Option<Self> {
    self.index().checked_sub(1).and_then(Self::from_index)
  }

  pub fn is_last(self) -> bool { self.index() == STEP_COUNT - 1 }

  /// Short label shown in the progress indicator.
  pub fn title(self) -> &'static str {
    match self {
      Step::Student => "Student",
      Step::Address => "Address",
      Step::Guardians => "Parents",
      Step::Medical => "Medical",
      Step::Education => "Education",
      Step::EmergencyBanking => "Emergency",
      Step::Terms => "Terms",
    }
  }

  pub fn description(self) -> &'static str {
    match self {
      Step::Student => "Basic information",
      Step::Address => "Contact details",
      Step::Guardians => "Guardian information",
      Step::Medical => "Health details",
      Step::Education => "Previous schools",
      Step::EmergencyBanking => "Emergency contacts",
      Step::Terms => "Agreements",
    }
  }

  /// The validation rules for this step's fields.
  pub fn fields(self) -> &'static [Field] { crate::schema::fields(self) }
}

impl TryFrom<usize> for Step {
  type Error = Error;

  fn try_from(index: usize) -> Result<Self, Self::Error> {
    Self::from_index(index).ok_or(Error::UnknownStep(index))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn indices_follow_declaration_order() {
    let indices: Vec<usize> = Step::iter().map(Step::index).collect();
    assert_eq!(indices, (0..STEP_COUNT).collect::<Vec<_>>());
    assert_eq!(Step::iter().count(), STEP_COUNT);
  }

  #[test]
  fn navigation_stops_at_the_ends() {
    assert_eq!(Step::first().previous(), None);
    assert_eq!(Step::Student.next(), Some(Step::Address));
    assert_eq!(Step::Terms.next(), None);
    assert!(Step::Terms.is_last());
    assert_eq!(Step::Terms.previous(), Some(Step::EmergencyBanking));
  }

  #[test]
  fn out_of_range_index_is_rejected() {
    assert!(matches!(Step::try_from(7), Err(Error::UnknownStep(7))));
    assert_eq!(Step::try_from(2).unwrap(), Step::Guardians);
  }
}
