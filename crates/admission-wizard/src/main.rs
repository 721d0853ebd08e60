//! `admission`: fill in a school admission application from the terminal.
//!
//! # Usage
//!
//! ```text
//! admission fill
//! admission --url http://localhost:8080 status
//! admission lookup K3Q9ZP2M1A
//! admission --config ~/.config/admission/config.toml reset
//! ```

mod shell;

use std::path::{Path, PathBuf};

use admission_core::{STEP_COUNT, reference};
use admission_wizard::{ApiClient, DraftStore, FileDraftStore, Wizard};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:8080";
const DEFAULT_DRAFT: &str = "~/.admission-draft.json";

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "admission", about = "Fill in a school admission application")]
struct Args {
  /// Path to a TOML config file (url, draft_path).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the admission server (default: http://localhost:8080).
  #[arg(long, env = "ADMISSION_URL")]
  url: Option<String>,

  /// Where the in-progress application is kept
  /// (default: ~/.admission-draft.json).
  #[arg(long, value_name = "FILE")]
  draft: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Fill in the application step by step, resuming any saved draft.
  Fill,
  /// Show how far the saved draft has got.
  Status,
  /// Discard the saved draft.
  Reset,
  /// Look up a submitted application by its reference number.
  Lookup { reference: String },
}

// ─── Config file ─────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:        String,
  #[serde(default)]
  draft_path: Option<PathBuf>,
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| DEFAULT_URL.to_string());
  let draft_path = expand_tilde(
    &args
      .draft
      .or(file_cfg.draft_path)
      .unwrap_or_else(|| PathBuf::from(DEFAULT_DRAFT)),
  );

  let drafts = FileDraftStore::new(draft_path);
  let client = ApiClient::new(url).context("failed to build HTTP client")?;

  match args.command {
    Command::Fill => shell::run(Wizard::restore(drafts), &client).await,
    Command::Status => {
      status(drafts);
      Ok(())
    }
    Command::Reset => {
      drafts
        .clear()
        .with_context(|| format!("removing {}", drafts.path().display()))?;
      println!("Draft discarded.");
      Ok(())
    }
    Command::Lookup { reference } => lookup(&client, &reference).await,
  }
}

fn status(drafts: FileDraftStore) {
  let path = drafts.path().display().to_string();
  if drafts.load().is_none() {
    println!("No application in progress ({path}).");
    return;
  }

  let wizard = Wizard::restore(drafts);
  let done: Vec<&str> = wizard.completed_steps().iter().map(|s| s.title()).collect();
  println!("Draft: {path}");
  println!("Completed: {}", if done.is_empty() { "-".into() } else { done.join(", ") });
  if let Some(step) = wizard.current_step() {
    println!("Next step: {} of {STEP_COUNT}, {}", step.index() + 1, step.title());
  }
}

async fn lookup(client: &ApiClient, raw: &str) -> Result<()> {
  match client
    .get_by_reference(raw)
    .await
    .with_context(|| format!("looking up {raw}"))?
  {
    Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
    None => println!("No application with reference {}.", reference::normalize(raw)),
  }
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
