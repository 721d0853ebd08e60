//! Local persistence of the in-progress application.
//!
//! There is one draft slot per store. Saving overwrites it unconditionally;
//! loading never fails, a missing or unreadable slot reads as "no draft".

use std::{
  fs, io,
  path::{Path, PathBuf},
  sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
  },
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DraftError;

/// A resumable, partially-completed application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Draft {
  /// Index of the next step to show; equal to the number of steps completed.
  pub step: usize,
  /// Union of every step's accepted answers so far.
  pub data: Map<String, Value>,
}

/// A single durable draft slot.
pub trait DraftStore {
  /// Overwrite the slot with `draft`.
  fn save(&self, draft: &Draft) -> Result<(), DraftError>;

  /// Read the slot. Missing and corrupt slots both yield `None`.
  fn load(&self) -> Option<Draft>;

  /// Empty the slot. Clearing an empty slot succeeds.
  fn clear(&self) -> Result<(), DraftError>;
}

fn decode(text: &str, origin: &dyn std::fmt::Display) -> Option<Draft> {
  match serde_json::from_str(text) {
    Ok(draft) => Some(draft),
    Err(e) => {
      tracing::warn!(%origin, error = %e, "ignoring corrupt draft");
      None
    }
  }
}

// ─── File ────────────────────────────────────────────────────────────────────

/// A draft kept in one JSON file.
///
/// Writes go to a sibling temp file that is then renamed over the slot, so a
/// crash mid-save leaves the previous draft intact.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
  path: PathBuf,
}

impl FileDraftStore {
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

  pub fn path(&self) -> &Path { &self.path }

  fn temp_path(&self) -> PathBuf {
    let name = self
      .path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| "draft".to_owned());
    self
      .path
      .with_file_name(format!(".{name}.{}.tmp", uuid::Uuid::new_v4()))
  }
}

impl DraftStore for FileDraftStore {
  fn save(&self, draft: &Draft) -> Result<(), DraftError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent)?;
    }

    let text = serde_json::to_string_pretty(draft)?;
    let temp = self.temp_path();
    fs::write(&temp, text)?;
    if let Err(e) = fs::rename(&temp, &self.path) {
      let _ = fs::remove_file(&temp);
      return Err(e.into());
    }
    Ok(())
  }

  fn load(&self) -> Option<Draft> {
    match fs::read_to_string(&self.path) {
      Ok(text) => decode(&text, &self.path.display()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => None,
      Err(e) => {
        tracing::warn!(path = %self.path.display(), error = %e, "cannot read draft");
        None
      }
    }
  }

  fn clear(&self) -> Result<(), DraftError> {
    match fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}

// ─── Memory ──────────────────────────────────────────────────────────────────

/// An in-memory slot holding the serialised draft text.
///
/// Clones share the slot. The raw text can be replaced with anything, and
/// writes can be made to fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryDraftStore {
  slot:        Arc<Mutex<Option<String>>>,
  fail_writes: Arc<AtomicBool>,
}

impl MemoryDraftStore {
  pub fn new() -> Self { Self::default() }

  /// The raw slot contents.
  pub fn raw(&self) -> Option<String> {
    self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }

  /// Replace the raw slot contents, valid JSON or not.
  pub fn set_raw(&self, text: impl Into<String>) {
    *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.into());
  }

  /// Make every subsequent `save` and `clear` fail (or succeed again).
  pub fn fail_writes(&self, fail: bool) { self.fail_writes.store(fail, Ordering::SeqCst); }

  fn check_writable(&self) -> Result<(), DraftError> {
    if self.fail_writes.load(Ordering::SeqCst) {
      Err(DraftError::Unavailable)
    } else {
      Ok(())
    }
  }
}

impl DraftStore for MemoryDraftStore {
  fn save(&self, draft: &Draft) -> Result<(), DraftError> {
    self.check_writable()?;
    let text = serde_json::to_string(draft)?;
    *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(text);
    Ok(())
  }

  fn load(&self) -> Option<Draft> {
    let text = self.raw()?;
    decode(&text, &"memory")
  }

  fn clear(&self) -> Result<(), DraftError> {
    self.check_writable()?;
    *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn sample() -> Draft {
    let Value::Object(data) = json!({
      "studentFirstName": "Amara",
      "languages": ["English", "Swahili"],
    }) else {
      unreachable!()
    };
    Draft { step: 1, data }
  }

  fn temp_file() -> PathBuf {
    std::env::temp_dir()
      .join(format!("admission-wizard-{}", uuid::Uuid::new_v4()))
      .join("draft.json")
  }

  #[test]
  fn memory_load_after_save_is_identical() {
    let store = MemoryDraftStore::new();
    assert!(store.load().is_none());

    store.save(&sample()).unwrap();
    assert_eq!(store.load(), Some(sample()));
    assert_eq!(store.load(), Some(sample()));
  }

  #[test]
  fn memory_corrupt_slot_reads_as_absent() {
    let store = MemoryDraftStore::new();
    store.set_raw("{ not json");
    assert!(store.load().is_none());

    store.set_raw(r#"{"step":"two","data":{}}"#);
    assert!(store.load().is_none());
  }

  #[test]
  fn memory_failing_writes_leave_slot_alone() {
    let store = MemoryDraftStore::new();
    store.save(&sample()).unwrap();

    store.fail_writes(true);
    assert!(store.save(&Draft::default()).is_err());
    assert!(store.clear().is_err());
    assert_eq!(store.load(), Some(sample()));
  }

  #[test]
  fn file_roundtrip_and_clear() {
    let path = temp_file();
    let store = FileDraftStore::new(&path);
    assert!(store.load().is_none());

    store.save(&sample()).unwrap();
    assert_eq!(store.load(), Some(sample()));

    let mut later = sample();
    later.step = 2;
    store.save(&later).unwrap();
    assert_eq!(store.load(), Some(later));

    store.clear().unwrap();
    assert!(store.load().is_none());
    store.clear().unwrap();

    let dir = path.parent().unwrap();
    assert_eq!(fs::read_dir(dir).unwrap().count(), 0, "temp files left behind");
    fs::remove_dir(dir).unwrap();
  }

  #[test]
  fn file_on_disk_format_is_step_and_data() {
    let path = temp_file();
    let store = FileDraftStore::new(&path);
    store.save(&sample()).unwrap();

    let on_disk: Value =
      serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk["step"], 1);
    assert_eq!(on_disk["data"]["studentFirstName"], "Amara");

    fs::remove_dir_all(path.parent().unwrap()).unwrap();
  }

  #[test]
  fn file_corrupt_draft_reads_as_absent() {
    let path = temp_file();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "\u{0}\u{1}garbage").unwrap();

    assert!(FileDraftStore::new(&path).load().is_none());
    fs::remove_dir_all(path.parent().unwrap()).unwrap();
  }
}
