//! [`SqliteStore`]: the SQLite implementation of [`ApplicationStore`].

use std::{path::Path, sync::Arc};

use admission_core::{
  application::{ApplicationRecord, ApplicationStatus, NewApplication},
  merge::ApplicationPatch,
  reference,
  store::ApplicationStore,
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{RawApplication, SELECT_COLUMNS},
  schema::SCHEMA,
};

/// How many fresh reference numbers `create` tries before giving up.
pub const REFERENCE_ATTEMPTS: usize = 8;

type ReferenceGenerator = Arc<dyn Fn() -> String + Send + Sync>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// An application store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:       tokio_rusqlite::Connection,
  references: ReferenceGenerator,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn, references: Arc::new(reference::generate) })
  }

  /// Replace the reference number generator. Generated values must already
  /// be in stored (uppercase) form.
  pub fn with_reference_generator(
    mut self,
    generator: impl Fn() -> String + Send + Sync + 'static,
  ) -> Self {
    self.references = Arc::new(generator);
    self
  }

  /// Insert `row` under its reference number. Returns `None` if that
  /// reference is already taken.
  async fn try_insert(&self, row: RawApplication) -> Result<Option<i64>> {
    let id = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO applications (
             reference_number, status, student_photo, data_json,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            row.reference_number,
            row.status,
            row.student_photo,
            row.data_json,
            row.created_at,
            row.updated_at,
          ],
        );
        match inserted {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(e) if is_unique_violation(&e) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await?;
    Ok(id)
  }
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── ApplicationStore impl ───────────────────────────────────────────────────

impl ApplicationStore for SqliteStore {
  type Error = Error;

  async fn create(&self, application: NewApplication) -> Result<ApplicationRecord> {
    let now = Utc::now();
    let record = ApplicationRecord {
      id: 0,
      reference_number: String::new(),
      status: ApplicationStatus::Draft,
      created_at: now,
      updated_at: now,
      application,
    };
    let row = RawApplication::from_record(&record)?;

    for attempt in 1..=REFERENCE_ATTEMPTS {
      let reference_number = (self.references)();
      let candidate = RawApplication {
        reference_number: reference_number.clone(),
        ..row.clone()
      };

      if let Some(id) = self.try_insert(candidate).await? {
        return Ok(ApplicationRecord { id, reference_number, ..record });
      }
      tracing::warn!(
        attempt,
        reference = %reference_number,
        "reference number collision, regenerating"
      );
    }

    Err(Error::ReferenceExhausted(REFERENCE_ATTEMPTS))
  }

  async fn get_by_id(&self, id: i64) -> Result<Option<ApplicationRecord>> {
    let raw: Option<RawApplication> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SELECT_COLUMNS} FROM applications WHERE id = ?1"),
              rusqlite::params![id],
              RawApplication::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawApplication::into_record).transpose()
  }

  async fn get_by_reference(&self, reference: &str) -> Result<Option<ApplicationRecord>> {
    let reference = reference.to_owned();

    let raw: Option<RawApplication> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SELECT_COLUMNS} FROM applications WHERE reference_number = ?1"
              ),
              rusqlite::params![reference],
              RawApplication::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawApplication::into_record).transpose()
  }

  async fn update(&self, id: i64, patch: ApplicationPatch) -> Result<ApplicationRecord> {
    let now = Utc::now();

    // Read, merge and write in one transaction.
    let merged: Result<RawApplication> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let existing = tx
          .query_row(
            &format!("SELECT {SELECT_COLUMNS} FROM applications WHERE id = ?1"),
            rusqlite::params![id],
            RawApplication::from_row,
          )
          .optional()?;

        let Some(existing) = existing else {
          return Ok(Err(Error::NotFound(id)));
        };
        let merged = match existing
          .into_record()
          .and_then(|record| Ok(patch.apply(&record, now)?))
          .and_then(|record| RawApplication::from_record(&record))
        {
          Ok(raw) => raw,
          Err(e) => return Ok(Err(e)),
        };

        tx.execute(
          "UPDATE applications
           SET status = ?2, student_photo = ?3, data_json = ?4, updated_at = ?5
           WHERE id = ?1",
          rusqlite::params![
            id,
            merged.status,
            merged.student_photo,
            merged.data_json,
            merged.updated_at,
          ],
        )?;
        tx.commit()?;
        Ok(Ok(merged))
      })
      .await?;

    merged?.into_record()
  }

  async fn list(&self) -> Result<Vec<ApplicationRecord>> {
    let raws: Vec<RawApplication> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {SELECT_COLUMNS} FROM applications ORDER BY id"))?;
        let rows = stmt
          .query_map([], RawApplication::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawApplication::into_record).collect()
  }
}
