//! Application domain types.
//!
//! [`NewApplication`] is the validated payload a family submits;
//! [`ApplicationRecord`] is what the store hands back once it has assigned an
//! id and a reference number. Field names are camelCase on the wire.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::VariantNames;

// ─── Enumerations ────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
  Other,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, VariantNames,
)]
pub enum BloodType {
  #[serde(rename = "A+")]
  #[strum(serialize = "A+")]
  APositive,
  #[serde(rename = "A-")]
  #[strum(serialize = "A-")]
  ANegative,
  #[serde(rename = "B+")]
  #[strum(serialize = "B+")]
  BPositive,
  #[serde(rename = "B-")]
  #[strum(serialize = "B-")]
  BNegative,
  #[serde(rename = "AB+")]
  #[strum(serialize = "AB+")]
  AbPositive,
  #[serde(rename = "AB-")]
  #[strum(serialize = "AB-")]
  AbNegative,
  #[serde(rename = "O+")]
  #[strum(serialize = "O+")]
  OPositive,
  #[serde(rename = "O-")]
  #[strum(serialize = "O-")]
  ONegative,
}

/// Where school invoices are sent.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InvoiceTo {
  Home,
  Office,
}

/// Lifecycle of a stored application. New records start at `Draft`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
  #[default]
  Draft,
  Submitted,
}

// ─── Nested value objects ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
  pub street:      String,
  pub city:        String,
  pub state:       String,
  pub country:     String,
  pub postal_code: String,
}

/// A parent or guardian. The first entry is the primary contact by
/// convention only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guardian {
  pub first_name:   String,
  pub last_name:    String,
  pub relationship: String,
  pub email:        String,
  pub phone:        String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub occupation:   Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicianDetails {
  pub name:     String,
  pub hospital: String,
  pub phone:    String,
  pub address:  String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousSchool {
  pub name:       String,
  pub address:    String,
  pub start_date: String,
  pub end_date:   String,
  /// Grades attended at this school, free text (e.g. "1-3").
  pub grades:     String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub remarks:    Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
  pub name:         String,
  pub relationship: String,
  pub phone:        String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankingDetails {
  pub account_holder: String,
  pub bank_name:      String,
  pub account_number: String,
  pub branch_code:    String,
}

/// Consents collected on the final step. All four must be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermsAccepted {
  pub medical:    bool,
  pub photo:      bool,
  pub field_trip: bool,
  pub policies:   bool,
}

// ─── Application ─────────────────────────────────────────────────────────────

/// Every domain field of an admission application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
  // Student
  pub student_first_name: String,
  pub student_last_name:  String,
  /// Base64 image data; usually attached after creation.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub student_photo:      Option<String>,
  pub date_of_birth:      NaiveDate,
  pub gender:             Gender,
  pub nationality:        String,
  pub languages:          Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub blood_type:         Option<BloodType>,

  // Address
  pub current_address:    Address,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub permanent_address:  Option<Address>,

  // Guardians
  pub parents:            Vec<Guardian>,

  // Medical
  pub physician_details:  PhysicianDetails,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub medical_conditions: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub allergies:          Option<String>,

  // Education
  pub previous_schools:   Vec<PreviousSchool>,

  // Emergency and banking
  pub emergency_contacts: Vec<EmergencyContact>,
  pub invoice_to:         InvoiceTo,
  pub banking_details:    BankingDetails,

  // Terms
  pub terms_accepted:     TermsAccepted,
}

/// The authoritative stored application.
///
/// `id` is internal; `reference_number` is the public handle given to the
/// family. Both are assigned by the store and never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
  pub id:               i64,
  pub reference_number: String,
  #[serde(default)]
  pub status:           ApplicationStatus,
  pub created_at:       DateTime<Utc>,
  pub updated_at:       DateTime<Utc>,
  #[serde(flatten)]
  pub application:      NewApplication,
}

impl ApplicationRecord {
  /// Serialise into a top-level field map, the shape partial updates and
  /// mirror rows operate on.
  pub fn to_fields(&self) -> crate::Result<serde_json::Map<String, serde_json::Value>> {
    match serde_json::to_value(self)? {
      serde_json::Value::Object(map) => Ok(map),
      _ => Err(crate::Error::Serialization(serde::ser::Error::custom(
        "application record did not serialise to an object",
      ))),
    }
  }

  /// Inverse of [`to_fields`](Self::to_fields).
  pub fn from_fields(
    fields: serde_json::Map<String, serde_json::Value>,
  ) -> crate::Result<Self> {
    Ok(serde_json::from_value(serde_json::Value::Object(fields))?)
  }
}
