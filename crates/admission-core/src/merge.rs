//! Shallow merge policy shared by the wizard and the store.
//!
//! Merging is last-write-wins per top-level key. Nested objects and lists are
//! replaced wholesale, never deep-merged: resubmitting the address step with a
//! new `currentAddress` replaces the whole address, including any sub-field
//! the new value omits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Result, Step, application::ApplicationRecord, schema};

/// Merge `patch` into `base` in place.
pub fn shallow_merge(base: &mut Map<String, Value>, patch: Map<String, Value>) {
  for (key, value) in patch {
    base.insert(key, value);
  }
}

/// Return a copy of `base` whose answers to `step` are exactly `accepted`.
///
/// Every top-level key the step declares is dropped before merging, so an
/// optional field left out of `accepted` is cleared rather than kept.
pub fn replace_step(
  base: &Map<String, Value>,
  step: Step,
  accepted: Map<String, Value>,
) -> Map<String, Value> {
  let mut merged = base.clone();
  for field in schema::fields(step) {
    merged.remove(field.name);
  }
  shallow_merge(&mut merged, accepted);
  merged
}

// ─── Partial updates ─────────────────────────────────────────────────────────

/// Top-level fields that a partial update can never change.
pub const IMMUTABLE_FIELDS: &[&str] =
  &["id", "referenceNumber", "createdAt", "updatedAt"];

/// A partial update to a stored application: a JSON object of top-level
/// fields, applied with [`shallow_merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationPatch(Map<String, Value>);

impl ApplicationPatch {
  pub fn new(fields: Map<String, Value>) -> Self { Self(fields) }

  /// Attach a base64-encoded student photo.
  pub fn photo(encoded: String) -> Self {
    Self(Map::from_iter([(
      "studentPhoto".to_owned(),
      Value::String(encoded),
    )]))
  }

  pub fn fields(&self) -> &Map<String, Value> { &self.0 }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Apply this patch to `record`, stamping `updated_at` with `now`.
  ///
  /// Immutable fields in the patch are ignored. The merged record must still
  /// pass [`validate_application`](crate::schema::validate_application);
  /// field failures come back as [`Error::Validation`](crate::Error).
  pub fn apply(
    &self,
    record: &ApplicationRecord,
    now: DateTime<Utc>,
  ) -> Result<ApplicationRecord> {
    let mut fields = record.to_fields()?;
    let patch = self
      .0
      .iter()
      .filter(|(key, _)| !IMMUTABLE_FIELDS.contains(&key.as_str()))
      .map(|(key, value)| (key.clone(), value.clone()))
      .collect();
    shallow_merge(&mut fields, patch);

    let application = schema::validate_application(&fields)?;
    let mut merged = ApplicationRecord::from_fields(fields)?;
    merged.application = application;
    merged.updated_at = now;
    Ok(merged)
  }
}

impl From<Map<String, Value>> for ApplicationPatch {
  fn from(fields: Map<String, Value>) -> Self { Self(fields) }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn obj(value: Value) -> Map<String, Value> {
    match value {
      Value::Object(map) => map,
      other => panic!("expected object, got {other}"),
    }
  }

  #[test]
  fn later_keys_win_and_earlier_keys_survive() {
    let mut base = obj(json!({ "a": 1, "b": 2 }));
    shallow_merge(&mut base, obj(json!({ "b": 3, "c": 4 })));
    assert_eq!(Value::Object(base), json!({ "a": 1, "b": 3, "c": 4 }));
  }

  #[test]
  fn nested_objects_are_replaced_not_merged() {
    let base = obj(json!({
      "currentAddress": { "street": "1 Old Rd", "city": "Nairobi" },
    }));
    let merged = replace_step(
      &base,
      Step::Address,
      obj(json!({ "currentAddress": { "city": "Mombasa" } })),
    );
    assert_eq!(merged["currentAddress"], json!({ "city": "Mombasa" }));
    assert_eq!(base["currentAddress"]["street"], "1 Old Rd");
  }

  #[test]
  fn replacing_a_step_clears_its_omitted_keys_only() {
    let base = obj(json!({
      "studentFirstName": "Amara",
      "permanentAddress": { "street": "2 Hill Rd" },
      "sameAsCurrent": false,
    }));
    let merged = replace_step(
      &base,
      Step::Address,
      obj(json!({ "currentAddress": { "street": "1 Old Rd" } })),
    );
    assert!(!merged.contains_key("permanentAddress"));
    assert!(!merged.contains_key("sameAsCurrent"));
    assert_eq!(merged["studentFirstName"], "Amara");
    assert_eq!(merged["currentAddress"]["street"], "1 Old Rd");
  }

  fn record() -> ApplicationRecord {
    let at = DateTime::parse_from_rfc3339("2026-01-05T09:00:00Z")
      .unwrap()
      .with_timezone(&Utc);
    ApplicationRecord {
      id:               7,
      reference_number: "K3Q9ZP2M1A".into(),
      status:           Default::default(),
      created_at:       at,
      updated_at:       at,
      application:      crate::fixtures::new_application(),
    }
  }

  #[test]
  fn patch_updates_fields_and_ignores_identity() {
    let record = record();
    let now = Utc::now();
    let patch = ApplicationPatch::new(obj(json!({
      "id": 99,
      "referenceNumber": "HIJACKED00",
      "status": "submitted",
      "allergies": "Peanuts",
    })));

    let merged = patch.apply(&record, now).unwrap();
    assert_eq!(merged.id, 7);
    assert_eq!(merged.reference_number, "K3Q9ZP2M1A");
    assert_eq!(merged.created_at, record.created_at);
    assert_eq!(merged.updated_at, now);
    assert_eq!(merged.status, crate::application::ApplicationStatus::Submitted);
    assert_eq!(merged.application.allergies.as_deref(), Some("Peanuts"));
    assert_eq!(merged.application.parents, record.application.parents);
  }

  #[test]
  fn photo_patch_sets_only_the_photo() {
    let record = record();
    let merged = ApplicationPatch::photo("aGVsbG8=".into())
      .apply(&record, Utc::now())
      .unwrap();
    assert_eq!(merged.application.student_photo.as_deref(), Some("aGVsbG8="));
    assert_eq!(merged.application.student_first_name, "Amara");
  }

  #[test]
  fn patch_with_wrong_shape_is_rejected() {
    let patch = ApplicationPatch::new(obj(json!({ "languages": "English" })));
    assert!(patch.apply(&record(), Utc::now()).is_err());
  }

  #[test]
  fn patch_that_leaves_the_record_invalid_is_rejected() {
    let patch = ApplicationPatch::new(obj(json!({
      "studentFirstName": " ",
      "parents": [],
    })));
    let Err(crate::Error::Validation(fields)) = patch.apply(&record(), Utc::now())
    else {
      panic!("expected validation failure");
    };
    assert!(fields.contains("studentFirstName"));
    assert!(fields.contains("parents"));
  }

  #[test]
  fn patch_with_unknown_status_is_rejected() {
    let patch = ApplicationPatch::new(obj(json!({ "status": "archived" })));
    assert!(matches!(
      patch.apply(&record(), Utc::now()),
      Err(crate::Error::Serialization(_))
    ));
  }
}
