//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. The student photo lives in its
//! own column; every other domain field is stored as one compact JSON object.

use admission_core::application::{
  ApplicationRecord, ApplicationStatus, NewApplication,
};
use chrono::{DateTime, Utc};

use crate::{Error, Result};

pub const SELECT_COLUMNS: &str = "id, reference_number, status, student_photo, \
                                  data_json, created_at, updated_at";

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ApplicationStatus ───────────────────────────────────────────────────────

pub fn encode_status(status: ApplicationStatus) -> &'static str {
  match status {
    ApplicationStatus::Draft => "draft",
    ApplicationStatus::Submitted => "submitted",
  }
}

pub fn decode_status(s: &str) -> Result<ApplicationStatus> {
  match s {
    "draft" => Ok(ApplicationStatus::Draft),
    "submitted" => Ok(ApplicationStatus::Submitted),
    other => Err(Error::UnknownStatus(other.to_owned())),
  }
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw column values of one `applications` row.
#[derive(Debug, Clone)]
pub struct RawApplication {
  pub id:               i64,
  pub reference_number: String,
  pub status:           String,
  pub student_photo:    Option<String>,
  pub data_json:        String,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawApplication {
  /// Read a row selected with [`SELECT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      reference_number: row.get(1)?,
      status:           row.get(2)?,
      student_photo:    row.get(3)?,
      data_json:        row.get(4)?,
      created_at:       row.get(5)?,
      updated_at:       row.get(6)?,
    })
  }

  pub fn from_record(record: &ApplicationRecord) -> Result<Self> {
    let mut application = record.application.clone();
    let student_photo = application.student_photo.take();
    Ok(Self {
      id: record.id,
      reference_number: record.reference_number.clone(),
      status: encode_status(record.status).to_owned(),
      student_photo,
      data_json: serde_json::to_string(&application)?,
      created_at: encode_dt(record.created_at),
      updated_at: encode_dt(record.updated_at),
    })
  }

  pub fn into_record(self) -> Result<ApplicationRecord> {
    let mut application: NewApplication = serde_json::from_str(&self.data_json)?;
    application.student_photo = self.student_photo;
    Ok(ApplicationRecord {
      id: self.id,
      reference_number: self.reference_number,
      status: decode_status(&self.status)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      application,
    })
  }
}
