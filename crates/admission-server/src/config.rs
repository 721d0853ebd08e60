//! Server configuration.
//!
//! Loaded from an optional TOML file, then overridden by `ADMISSION_*`
//! environment variables. Nested keys use `__`, e.g.
//! `ADMISSION_SHEETS__ACCESS_TOKEN`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const ENV_PREFIX: &str = "ADMISSION";

pub const DEFAULT_SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_SHEETS_RANGE: &str = "Sheet1!A:T";

/// Runtime server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Spreadsheet mirror; disabled when absent.
  #[serde(default)]
  pub sheets:     Option<SheetsConfig>,
}

/// Where and how to append mirror rows.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
  pub spreadsheet_id: String,
  pub access_token:   String,
  #[serde(default = "default_range")]
  pub range:          String,
  #[serde(default = "default_endpoint")]
  pub endpoint:       String,
}

fn default_range() -> String { DEFAULT_SHEETS_RANGE.to_owned() }

fn default_endpoint() -> String { DEFAULT_SHEETS_ENDPOINT.to_owned() }

impl ServerConfig {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    let mut config: ServerConfig = config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080)?
      .set_default("store_path", "applications.sqlite")?
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix(ENV_PREFIX)
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()?;

    config.store_path = expand_tilde(&config.store_path);
    Ok(config)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
