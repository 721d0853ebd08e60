//! Mirror sinks: the Google Sheets append API, or nothing.

use std::{convert::Infallible, time::Duration};

use admission_core::mirror::{MirrorRow, MirrorSink};
use reqwest::{Client, Url};
use serde_json::json;
use thiserror::Error;

use crate::config::SheetsConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum SheetsError {
  #[error("invalid sheets endpoint: {0}")]
  InvalidEndpoint(String),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("sheets API returned {status}: {body}")]
  Rejected { status: u16, body: String },
}

// ─── Sheets ──────────────────────────────────────────────────────────────────

/// Appends rows to a spreadsheet through the Sheets v4 `values.append` call.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct SheetsMirror {
  client:       Client,
  url:          Url,
  access_token: String,
}

impl SheetsMirror {
  pub fn new(config: &SheetsConfig) -> Result<Self, SheetsError> {
    let mut url = Url::parse(&config.endpoint)
      .map_err(|e| SheetsError::InvalidEndpoint(format!("{}: {e}", config.endpoint)))?;
    let range = format!("{}:append", config.range);
    url
      .path_segments_mut()
      .map_err(|()| SheetsError::InvalidEndpoint(config.endpoint.clone()))?
      .pop_if_empty()
      .extend([
        "spreadsheets",
        config.spreadsheet_id.as_str(),
        "values",
        range.as_str(),
      ]);
    url.query_pairs_mut().append_pair("valueInputOption", "RAW");

    let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    Ok(Self { client, url, access_token: config.access_token.clone() })
  }

  /// The fully-resolved append URL.
  pub fn url(&self) -> &Url { &self.url }
}

impl MirrorSink for SheetsMirror {
  type Error = SheetsError;

  async fn append(&self, row: MirrorRow) -> Result<(), SheetsError> {
    let resp = self
      .client
      .post(self.url.clone())
      .bearer_auth(&self.access_token)
      .json(&json!({ "values": [row] }))
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(SheetsError::Rejected { status: status.as_u16(), body });
    }
    Ok(())
  }
}

// ─── Disabled ────────────────────────────────────────────────────────────────

/// Accepts and discards every row.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledMirror;

impl MirrorSink for DisabledMirror {
  type Error = Infallible;

  async fn append(&self, row: MirrorRow) -> Result<(), Infallible> {
    tracing::debug!(
      reference = row.cells().first().map(String::as_str).unwrap_or_default(),
      "mirror disabled, dropping row"
    );
    Ok(())
  }
}

// ─── Selection ───────────────────────────────────────────────────────────────

/// The mirror chosen by configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredMirror {
  Sheets(SheetsMirror),
  Disabled(DisabledMirror),
}

impl ConfiguredMirror {
  pub fn from_config(sheets: Option<&SheetsConfig>) -> Result<Self, SheetsError> {
    Ok(match sheets {
      Some(config) => Self::Sheets(SheetsMirror::new(config)?),
      None => Self::Disabled(DisabledMirror),
    })
  }
}

impl MirrorSink for ConfiguredMirror {
  type Error = SheetsError;

  async fn append(&self, row: MirrorRow) -> Result<(), SheetsError> {
    match self {
      Self::Sheets(sheets) => sheets.append(row).await,
      Self::Disabled(disabled) => match disabled.append(row).await {
        Ok(()) => Ok(()),
        Err(never) => match never {},
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use admission_core::{application::ApplicationRecord, fixtures};
  use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
  };
  use chrono::Utc;
  use serde_json::Value;
  use tokio::{net::TcpListener, sync::Mutex};

  use super::*;
  use crate::config::{DEFAULT_SHEETS_ENDPOINT, DEFAULT_SHEETS_RANGE};

  #[derive(Debug, Clone)]
  struct Captured {
    spreadsheet: String,
    range:       String,
    auth:        Option<String>,
    body:        Value,
  }

  type Log = Arc<Mutex<Vec<Captured>>>;

  async fn capture(
    State(log): State<Log>,
    Path((spreadsheet, range)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
  ) -> StatusCode {
    let auth = headers
      .get("authorization")
      .and_then(|v| v.to_str().ok())
      .map(str::to_owned);
    log.lock().await.push(Captured { spreadsheet, range, auth, body });
    StatusCode::OK
  }

  /// Serve a fake Sheets API and return its base URL.
  async fn fake_sheets(log: Log, status: StatusCode) -> String {
    let router = Router::new()
      .route(
        "/v4/spreadsheets/{id}/values/{range}",
        post(move |state: State<Log>,
                   path: Path<(String, String)>,
                   headers: HeaderMap,
                   body: Json<Value>| async move {
          let ok = capture(state, path, headers, body).await;
          if status.is_success() { ok } else { status }
        }),
      )
      .with_state(log);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}/v4")
  }

  fn config(endpoint: String) -> SheetsConfig {
    SheetsConfig {
      spreadsheet_id: "sheet-123".into(),
      access_token:   "secret-token".into(),
      range:          DEFAULT_SHEETS_RANGE.into(),
      endpoint,
    }
  }

  fn row() -> MirrorRow {
    let record = ApplicationRecord {
      id:               1,
      reference_number: "K3Q9ZP2M1A".into(),
      status:           Default::default(),
      created_at:       Utc::now(),
      updated_at:       Utc::now(),
      application:      fixtures::new_application(),
    };
    MirrorRow::from_record(&record, Utc::now()).unwrap()
  }

  #[test]
  fn url_targets_the_append_call() {
    let mirror = SheetsMirror::new(&config(DEFAULT_SHEETS_ENDPOINT.into())).unwrap();
    assert_eq!(
      mirror.url().as_str(),
      "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/\
       Sheet1!A:T:append?valueInputOption=RAW"
    );
  }

  #[tokio::test]
  async fn append_posts_one_row_with_bearer_token() {
    let log = Log::default();
    let endpoint = fake_sheets(log.clone(), StatusCode::OK).await;
    let mirror = SheetsMirror::new(&config(endpoint)).unwrap();

    let row = row();
    mirror.append(row.clone()).await.unwrap();

    let log = log.lock().await;
    assert_eq!(log.len(), 1);
    let captured = &log[0];
    assert_eq!(captured.spreadsheet, "sheet-123");
    assert_eq!(captured.range, "Sheet1!A:T:append");
    assert_eq!(captured.auth.as_deref(), Some("Bearer secret-token"));
    assert_eq!(captured.body, json!({ "values": [row.cells()] }));
  }

  #[tokio::test]
  async fn non_success_status_is_an_error() {
    let log = Log::default();
    let endpoint = fake_sheets(log, StatusCode::FORBIDDEN).await;
    let mirror = ConfiguredMirror::from_config(Some(&config(endpoint))).unwrap();

    let err = mirror.append(row()).await.unwrap_err();
    assert!(matches!(err, SheetsError::Rejected { status: 403, .. }), "{err}");
  }

  #[tokio::test]
  async fn unreachable_endpoint_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mirror = SheetsMirror::new(&config(format!("http://{addr}/v4"))).unwrap();
    assert!(matches!(mirror.append(row()).await, Err(SheetsError::Http(_))));
  }

  #[tokio::test]
  async fn disabled_mirror_accepts_everything() {
    let mirror = ConfiguredMirror::from_config(None).unwrap();
    assert!(matches!(mirror, ConfiguredMirror::Disabled(_)));
    mirror.append(row()).await.unwrap();
  }
}
