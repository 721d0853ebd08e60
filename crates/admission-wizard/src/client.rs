//! Async HTTP client wrapping the admission JSON API.

use std::time::Duration;

use admission_core::{FieldErrors, application::ApplicationRecord, reference};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
  error::ClientError,
  wizard::{Receipt, Submitter},
};

/// Async HTTP client for the admission API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: Url,
}

/// Body of a non-2xx response.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
  #[serde(default)]
  error:  String,
  #[serde(default)]
  fields: Option<FieldErrors>,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
    let base_url = base_url.into();
    let parsed = match Url::parse(&base_url) {
      Ok(url) if !url.cannot_be_a_base() => url,
      _ => return Err(ClientError::InvalidUrl(base_url)),
    };
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, base_url: parsed })
  }

  pub fn base_url(&self) -> &str { self.base_url.as_str() }

  /// `<base>/api/<segments>`, each segment percent-encoded.
  fn url(&self, segments: &[&str]) -> Url {
    let mut url = self.base_url.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().push("api").extend(segments);
    }
    url
  }

  /// `POST /api/applications`
  pub async fn submit_application(
    &self,
    record: &Map<String, Value>,
  ) -> Result<ApplicationRecord, ClientError> {
    let resp = self
      .client
      .post(self.url(&["applications"]))
      .json(record)
      .send()
      .await?;
    Ok(check(resp).await?.json().await?)
  }

  /// `GET /api/applications/reference/<ref>`; `None` if no application
  /// has that reference. Input that cannot be a reference is never sent.
  pub async fn get_by_reference(
    &self,
    reference: &str,
  ) -> Result<Option<ApplicationRecord>, ClientError> {
    let reference = reference::normalize(reference);
    if !reference::is_valid(&reference) {
      tracing::debug!(%reference, "not a reference number, skipping lookup");
      return Ok(None);
    }
    let resp = self
      .client
      .get(self.url(&["applications", "reference", &reference]))
      .send()
      .await?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    Ok(Some(check(resp).await?.json().await?))
  }
}

/// Turn a non-2xx response into a [`ClientError`].
async fn check(resp: Response) -> Result<Response, ClientError> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }

  let body: ErrorBody = resp.json().await.unwrap_or_default();
  match body.fields {
    Some(fields) if status == StatusCode::BAD_REQUEST => Err(ClientError::Rejected(fields)),
    _ => Err(ClientError::Status { status: status.as_u16(), message: body.error }),
  }
}

impl Submitter for ApiClient {
  type Error = ClientError;

  async fn submit(&self, record: &Map<String, Value>) -> Result<Receipt, ClientError> {
    let created = self.submit_application(record).await?;
    Ok(Receipt::from(&created))
  }
}
