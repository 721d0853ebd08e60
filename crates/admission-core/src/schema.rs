//! Step schema registry.
//!
//! Each wizard step declares its fields as a static table of [`Field`] rules.
//! Validation is pure: it reads a JSON field map and either returns the
//! accepted subset of that map or every [`FieldErrors`] entry found.
//!
//! Derived fields are computed by [`derive`] before any rule runs. The only
//! derivation today is the address step's "same as current" flag, which makes
//! `permanentAddress` a copy of `currentAddress`.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use strum::{IntoEnumIterator, VariantNames};

use crate::{
  Error, FieldErrors, Result, Step,
  application::{BloodType, Gender, InvoiceTo, NewApplication},
};

pub const SAME_AS_CURRENT: &str = "sameAsCurrent";
pub const CURRENT_ADDRESS: &str = "currentAddress";
pub const PERMANENT_ADDRESS: &str = "permanentAddress";

// ─── Rule types ──────────────────────────────────────────────────────────────

/// The shape a field's value must have.
#[derive(Debug, Clone, Copy)]
pub enum Kind {
  /// A string that is not blank.
  Text,
  /// A string of the form `local@domain.tld`.
  Email,
  /// A calendar date, `YYYY-MM-DD`.
  Date,
  /// One of a fixed set of strings.
  OneOf(&'static [&'static str]),
  /// A non-empty list of non-blank strings.
  TextList,
  /// Any boolean.
  Flag,
  /// A boolean that must be `true`.
  Consent,
  /// A nested object with its own rules.
  Object(&'static [Field]),
  /// A non-empty list of nested objects. Entry order is preserved.
  ObjectList(&'static [Field]),
}

/// A single field rule.
#[derive(Debug, Clone, Copy)]
pub struct Field {
  pub name:     &'static str,
  pub kind:     Kind,
  pub required: bool,
  /// Shown when a required field is missing, blank, or (for [`Kind::Consent`])
  /// not granted.
  pub message:  &'static str,
}

const fn required(
  name: &'static str,
  kind: Kind,
  message: &'static str,
) -> Field {
  Field { name, kind, required: true, message }
}

const fn optional(name: &'static str, kind: Kind) -> Field {
  Field { name, kind, required: false, message: "" }
}

// ─── Step tables ─────────────────────────────────────────────────────────────

const ADDRESS: &[Field] = &[
  required("street", Kind::Text, "Street is required"),
  required("city", Kind::Text, "City is required"),
  required("state", Kind::Text, "State is required"),
  required("country", Kind::Text, "Country is required"),
  required("postalCode", Kind::Text, "Postal code is required"),
];

const STUDENT: &[Field] = &[
  required("studentFirstName", Kind::Text, "First name is required"),
  required("studentLastName", Kind::Text, "Last name is required"),
  required("dateOfBirth", Kind::Date, "Date of birth is required"),
  required("gender", Kind::OneOf(Gender::VARIANTS), "Gender is required"),
  required("nationality", Kind::Text, "Nationality is required"),
  required("languages", Kind::TextList, "At least one language is required"),
  optional("bloodType", Kind::OneOf(BloodType::VARIANTS)),
  optional("studentPhoto", Kind::Text),
];

const ADDRESSES: &[Field] = &[
  required(CURRENT_ADDRESS, Kind::Object(ADDRESS), "Current address is required"),
  optional(SAME_AS_CURRENT, Kind::Flag),
  optional(PERMANENT_ADDRESS, Kind::Object(ADDRESS)),
];

const GUARDIAN: &[Field] = &[
  required("firstName", Kind::Text, "First name is required"),
  required("lastName", Kind::Text, "Last name is required"),
  required("relationship", Kind::Text, "Relationship is required"),
  required("email", Kind::Email, "Invalid email address"),
  required("phone", Kind::Text, "Phone number is required"),
  optional("occupation", Kind::Text),
];

const GUARDIANS: &[Field] = &[required(
  "parents",
  Kind::ObjectList(GUARDIAN),
  "At least one parent or guardian is required",
)];

const PHYSICIAN: &[Field] = &[
  required("name", Kind::Text, "Doctor's name is required"),
  required("hospital", Kind::Text, "Hospital name is required"),
  required("phone", Kind::Text, "Phone number is required"),
  required("address", Kind::Text, "Address is required"),
];

const MEDICAL: &[Field] = &[
  required(
    "physicianDetails",
    Kind::Object(PHYSICIAN),
    "Physician details are required",
  ),
  optional("medicalConditions", Kind::Text),
  optional("allergies", Kind::Text),
];

const SCHOOL: &[Field] = &[
  required("name", Kind::Text, "School name is required"),
  required("address", Kind::Text, "Address is required"),
  required("startDate", Kind::Text, "Start date is required"),
  required("endDate", Kind::Text, "End date is required"),
  required("grades", Kind::Text, "Grades attended is required"),
  optional("remarks", Kind::Text),
];

const EDUCATION: &[Field] = &[required(
  "previousSchools",
  Kind::ObjectList(SCHOOL),
  "At least one previous school is required",
)];

const CONTACT: &[Field] = &[
  required("name", Kind::Text, "Contact name is required"),
  required("relationship", Kind::Text, "Relationship is required"),
  required("phone", Kind::Text, "Phone number is required"),
];

const BANKING: &[Field] = &[
  required("accountHolder", Kind::Text, "Account holder name is required"),
  required("bankName", Kind::Text, "Bank name is required"),
  required("accountNumber", Kind::Text, "Account number is required"),
  required("branchCode", Kind::Text, "Branch code is required"),
];

const EMERGENCY_BANKING: &[Field] = &[
  required(
    "emergencyContacts",
    Kind::ObjectList(CONTACT),
    "At least one emergency contact is required",
  ),
  required(
    "invoiceTo",
    Kind::OneOf(InvoiceTo::VARIANTS),
    "Invoice recipient is required",
  ),
  required(
    "bankingDetails",
    Kind::Object(BANKING),
    "Banking details are required",
  ),
];

const CONSENTS: &[Field] = &[
  required(
    "medical",
    Kind::Consent,
    "You must agree to medical treatment permission",
  ),
  required("photo", Kind::Consent, "You must agree to photo usage permission"),
  required(
    "fieldTrip",
    Kind::Consent,
    "You must agree to field trip permission",
  ),
  required("policies", Kind::Consent, "You must agree to school policies"),
];

const TERMS: &[Field] = &[required(
  "termsAccepted",
  Kind::Object(CONSENTS),
  "Terms must be accepted",
)];

/// The rule table for `step`.
pub fn fields(step: Step) -> &'static [Field] {
  match step {
    Step::Student => STUDENT,
    Step::Address => ADDRESSES,
    Step::Guardians => GUARDIANS,
    Step::Medical => MEDICAL,
    Step::Education => EDUCATION,
    Step::EmergencyBanking => EMERGENCY_BANKING,
    Step::Terms => TERMS,
  }
}

/// Look up the top-level rule named `name` on `step`.
pub fn field(step: Step, name: &str) -> Option<&'static Field> {
  fields(step).iter().find(|f| f.name == name)
}

// ─── Derivations ─────────────────────────────────────────────────────────────

/// Recompute derived fields of `step` in place.
///
/// Must run after every change to a source field, not only at submit time,
/// so a derived copy is never stale. Idempotent.
pub fn derive(step: Step, data: &mut Map<String, Value>) {
  if step == Step::Address
    && data.get(SAME_AS_CURRENT) == Some(&Value::Bool(true))
    && let Some(current) = data.get(CURRENT_ADDRESS).cloned()
  {
    data.insert(PERMANENT_ADDRESS.to_owned(), current);
  }
}

/// Apply the derivations of every step.
pub fn derive_all(data: &mut Map<String, Value>) {
  for step in Step::iter() {
    derive(step, data);
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Validate one step's submitted data.
///
/// Derivations run first on a copy of `data`. On success the returned map
/// holds only the fields declared for `step`; unknown keys are dropped.
pub fn validate(
  step: Step,
  data: &Map<String, Value>,
) -> Result<Map<String, Value>, FieldErrors> {
  let mut data = data.clone();
  derive(step, &mut data);

  let mut errors = FieldErrors::new();
  let accepted = check_fields(fields(step), &data, "", &mut errors);
  if errors.is_empty() {
    Ok(accepted)
  } else {
    Err(errors)
  }
}

/// Validate a complete application against the rules of every step at once
/// and decode it.
pub fn validate_application(
  data: &Map<String, Value>,
) -> Result<NewApplication> {
  let mut data = data.clone();
  derive_all(&mut data);

  let mut errors = FieldErrors::new();
  let mut accepted = Map::new();
  for step in Step::iter() {
    accepted.extend(check_fields(fields(step), &data, "", &mut errors));
  }
  if !errors.is_empty() {
    return Err(Error::Validation(errors));
  }
  Ok(serde_json::from_value(Value::Object(accepted))?)
}

fn join(prefix: &str, name: &str) -> String {
  if prefix.is_empty() {
    name.to_owned()
  } else {
    format!("{prefix}.{name}")
  }
}

fn check_fields(
  rules: &[Field],
  data: &Map<String, Value>,
  prefix: &str,
  errors: &mut FieldErrors,
) -> Map<String, Value> {
  let mut accepted = Map::new();
  for rule in rules {
    let path = join(prefix, rule.name);
    match data.get(rule.name) {
      None | Some(Value::Null) => {
        if rule.required {
          errors.insert(path, rule.message);
        }
      }
      // Untouched optional inputs arrive as empty strings.
      Some(Value::String(s)) if !rule.required && s.is_empty() => {}
      Some(value) => {
        if let Some(v) = check_value(rule, value, &path, errors) {
          accepted.insert(rule.name.to_owned(), v);
        }
      }
    }
  }
  accepted
}

fn check_value(
  rule: &Field,
  value: &Value,
  path: &str,
  errors: &mut FieldErrors,
) -> Option<Value> {
  let blank = if rule.required { rule.message } else { "Must not be blank" };
  match rule.kind {
    Kind::Text => match value.as_str() {
      Some(s) if !s.trim().is_empty() => Some(value.clone()),
      Some(_) => fail(errors, path, blank),
      None => fail(errors, path, "Expected text"),
    },
    Kind::Email => match value.as_str() {
      Some(s) if is_email(s) => Some(value.clone()),
      _ => fail(errors, path, "Invalid email address"),
    },
    Kind::Date => match value.as_str() {
      Some(s) if s.trim().is_empty() => fail(errors, path, blank),
      Some(s) if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() => {
        Some(value.clone())
      }
      _ => fail(errors, path, "Expected a date in YYYY-MM-DD form"),
    },
    Kind::OneOf(options) => match value.as_str() {
      Some(s) if options.contains(&s) => Some(value.clone()),
      _ => fail(
        errors,
        path,
        format!("Must be one of: {}", options.join(", ")),
      ),
    },
    Kind::TextList => match value.as_array() {
      Some(items) if items.is_empty() => fail(errors, path, blank),
      Some(items) => {
        let before = errors.len();
        for (i, item) in items.iter().enumerate() {
          if !item.as_str().is_some_and(|s| !s.trim().is_empty()) {
            errors.insert(format!("{path}.{i}"), "Must not be blank");
          }
        }
        (errors.len() == before).then(|| value.clone())
      }
      None => fail(errors, path, "Expected a list"),
    },
    Kind::Flag => match value {
      Value::Bool(_) => Some(value.clone()),
      _ => fail(errors, path, "Expected true or false"),
    },
    Kind::Consent => match value {
      Value::Bool(true) => Some(value.clone()),
      _ => fail(errors, path, rule.message),
    },
    Kind::Object(rules) => match value.as_object() {
      Some(map) => {
        let before = errors.len();
        let accepted = check_fields(rules, map, path, errors);
        (errors.len() == before).then_some(Value::Object(accepted))
      }
      None => fail(errors, path, "Expected an object"),
    },
    Kind::ObjectList(rules) => match value.as_array() {
      Some(items) if items.is_empty() => fail(errors, path, blank),
      Some(items) => {
        let before = errors.len();
        let mut accepted = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
          let entry_path = format!("{path}.{i}");
          match item.as_object() {
            Some(map) => accepted.push(Value::Object(check_fields(
              rules,
              map,
              &entry_path,
              errors,
            ))),
            None => errors.insert(entry_path, "Expected an object"),
          }
        }
        (errors.len() == before).then_some(Value::Array(accepted))
      }
      None => fail(errors, path, "Expected a list"),
    },
  }
}

fn fail(
  errors: &mut FieldErrors,
  path: &str,
  message: impl Into<String>,
) -> Option<Value> {
  errors.insert(path, message);
  None
}

/// Loose structural check: one `@`, a non-empty local part, and a dotted
/// domain with no empty labels. No whitespace anywhere.
fn is_email(s: &str) -> bool {
  if s.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = s.split_once('@') else {
    return false;
  };
  !local.is_empty()
    && !domain.contains('@')
    && domain.contains('.')
    && domain.split('.').all(|label| !label.is_empty())
}
