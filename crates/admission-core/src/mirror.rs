//! Flattened rows for the external spreadsheet mirror.
//!
//! The mirror is advisory: a best-effort, append-only copy of each submitted
//! application. One row per application; scalar fields are written verbatim,
//! nested objects and lists as JSON text, followed by the submission time.

use std::future::Future;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::{Result, application::ApplicationRecord};

/// One spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MirrorRow(Vec<String>);

impl MirrorRow {
  /// Column names, in row order. The last column is the submission time.
  pub const HEADER: [&'static str; 20] = [
    "referenceNumber",
    "studentFirstName",
    "studentLastName",
    "dateOfBirth",
    "gender",
    "nationality",
    "languages",
    "bloodType",
    "currentAddress",
    "permanentAddress",
    "parents",
    "physicianDetails",
    "medicalConditions",
    "allergies",
    "previousSchools",
    "emergencyContacts",
    "invoiceTo",
    "bankingDetails",
    "termsAccepted",
    "submittedAt",
  ];

  /// Flatten `record`. Absent optional fields become empty cells.
  pub fn from_record(
    record: &ApplicationRecord,
    submitted_at: DateTime<Utc>,
  ) -> Result<Self> {
    let fields = record.to_fields()?;
    let data_columns = &Self::HEADER[..Self::HEADER.len() - 1];

    let mut cells: Vec<String> = data_columns
      .iter()
      .map(|column| match fields.get(*column) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
      })
      .collect();
    cells.push(submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true));
    Ok(Self(cells))
  }

  pub fn cells(&self) -> &[String] { &self.0 }

  pub fn into_cells(self) -> Vec<String> { self.0 }
}

/// An append-only external sink for [`MirrorRow`]s.
///
/// Failures are reported to the caller, which logs them; they never affect
/// the primary record.
pub trait MirrorSink: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn append(
    &self,
    row: MirrorRow,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
