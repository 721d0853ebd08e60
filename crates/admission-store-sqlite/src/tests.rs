//! Integration tests for `SqliteStore` against an in-memory database.

use std::{
  collections::{HashSet, VecDeque},
  sync::{Arc, Mutex},
};

use admission_core::{
  application::ApplicationStatus, fixtures, merge::ApplicationPatch,
  store::{ApplicationStore, StoreError},
};
use serde_json::json;

use crate::{Error, SqliteStore, store::REFERENCE_ATTEMPTS};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// A generator that hands out `refs` in order, then repeats the last one.
fn scripted(refs: &[&str]) -> impl Fn() -> String + Send + Sync + 'static {
  let queue: VecDeque<String> = refs.iter().map(|r| r.to_string()).collect();
  let queue = Arc::new(Mutex::new(queue));
  move || {
    let mut queue = queue.lock().unwrap();
    if queue.len() > 1 {
      queue.pop_front().unwrap()
    } else {
      queue.front().cloned().unwrap()
    }
  }
}

fn patch(value: serde_json::Value) -> ApplicationPatch {
  match value {
    serde_json::Value::Object(map) => ApplicationPatch::new(map),
    other => panic!("expected object, got {other}"),
  }
}

// ─── Create / read ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_by_id() {
  let s = store().await;

  let created = s.create(fixtures::new_application()).await.unwrap();
  assert_eq!(created.status, ApplicationStatus::Draft);
  assert_eq!(created.reference_number.len(), 10);
  assert_eq!(created.created_at, created.updated_at);

  let fetched = s.get_by_id(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.id, created.id);
  assert_eq!(fetched.reference_number, created.reference_number);
  assert_eq!(fetched.application, created.application);
}

#[tokio::test]
async fn get_by_id_missing_returns_none() {
  let s = store().await;
  assert!(s.get_by_id(42).await.unwrap().is_none());
}

#[tokio::test]
async fn get_by_reference_finds_the_record() {
  let s = store().await;
  let created = s.create(fixtures::new_application()).await.unwrap();

  let fetched = s
    .get_by_reference(&created.reference_number)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.id, created.id);

  assert!(s.get_by_reference("ABCDEFGHIJ").await.unwrap().is_none());
}

#[tokio::test]
async fn ids_increase_and_references_are_unique() {
  let s = store().await;

  let mut ids = Vec::new();
  let mut refs = HashSet::new();
  for _ in 0..25 {
    let created = s.create(fixtures::new_application()).await.unwrap();
    ids.push(created.id);
    refs.insert(created.reference_number);
  }

  assert!(ids.windows(2).all(|w| w[0] < w[1]));
  assert_eq!(refs.len(), 25);
}

#[tokio::test]
async fn concurrent_creates_get_distinct_ids() {
  let s = store().await;

  let tasks: Vec<_> = (0..10)
    .map(|_| {
      let s = s.clone();
      tokio::spawn(async move { s.create(fixtures::new_application()).await })
    })
    .collect();

  let mut ids = HashSet::new();
  for task in tasks {
    ids.insert(task.await.unwrap().unwrap().id);
  }
  assert_eq!(ids.len(), 10);
}

#[tokio::test]
async fn list_returns_records_in_id_order() {
  let s = store().await;
  let a = s.create(fixtures::new_application()).await.unwrap();
  let b = s.create(fixtures::new_application()).await.unwrap();

  let all = s.list().await.unwrap();
  assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![a.id, b.id]);
}

// ─── Reference collisions ────────────────────────────────────────────────────

#[tokio::test]
async fn reference_collision_is_retried() {
  let s = store()
    .await
    .with_reference_generator(scripted(&["AAAAAAAAAA", "AAAAAAAAAA", "BBBBBBBBBB"]));

  let first = s.create(fixtures::new_application()).await.unwrap();
  let second = s.create(fixtures::new_application()).await.unwrap();

  assert_eq!(first.reference_number, "AAAAAAAAAA");
  assert_eq!(second.reference_number, "BBBBBBBBBB");
  assert_eq!(s.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn reference_exhaustion_is_an_error() {
  let s = store()
    .await
    .with_reference_generator(scripted(&["AAAAAAAAAA"]));

  s.create(fixtures::new_application()).await.unwrap();
  let err = s.create(fixtures::new_application()).await.unwrap_err();
  assert!(matches!(err, Error::ReferenceExhausted(n) if n == REFERENCE_ATTEMPTS));
  assert_eq!(s.list().await.unwrap().len(), 1);
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_merges_top_level_fields() {
  let s = store().await;
  let created = s.create(fixtures::new_application()).await.unwrap();

  let updated = s
    .update(
      created.id,
      patch(json!({
        "allergies": "Peanuts",
        "currentAddress": {
          "street": "9 New Rd",
          "city": "Mombasa",
          "state": "Mombasa",
          "postalCode": "80100",
          "country": "Kenya",
        },
      })),
    )
    .await
    .unwrap();

  assert_eq!(updated.id, created.id);
  assert_eq!(updated.reference_number, created.reference_number);
  assert_eq!(updated.created_at, created.created_at);
  assert!(updated.updated_at >= created.updated_at);
  assert_eq!(updated.application.allergies.as_deref(), Some("Peanuts"));
  assert_eq!(updated.application.current_address.city, "Mombasa");
  assert_eq!(
    updated.application.student_first_name,
    created.application.student_first_name
  );

  let fetched = s.get_by_id(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.application, updated.application);
}

#[tokio::test]
async fn update_cannot_change_identity() {
  let s = store().await;
  let created = s.create(fixtures::new_application()).await.unwrap();

  let updated = s
    .update(
      created.id,
      patch(json!({ "id": 999, "referenceNumber": "ZZZZZZZZZZ" })),
    )
    .await
    .unwrap();

  assert_eq!(updated.id, created.id);
  assert_eq!(updated.reference_number, created.reference_number);
  assert!(s.get_by_id(999).await.unwrap().is_none());
}

#[tokio::test]
async fn update_missing_is_not_found_and_creates_nothing() {
  let s = store().await;

  let err = s
    .update(5, patch(json!({ "allergies": "None" })))
    .await
    .unwrap_err();
  assert!(err.is_not_found());
  assert!(s.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_with_wrong_shape_leaves_record_untouched() {
  let s = store().await;
  let created = s.create(fixtures::new_application()).await.unwrap();

  let err = s
    .update(created.id, patch(json!({ "languages": "English" })))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(_)));

  let fetched = s.get_by_id(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.application, created.application);
  assert_eq!(fetched.updated_at, created.updated_at);
}

#[tokio::test]
async fn update_that_breaks_validation_is_refused_and_not_written() {
  let s = store().await;
  let created = s.create(fixtures::new_application()).await.unwrap();

  let err = s
    .update(
      created.id,
      patch(json!({ "allergies": "Dust", "emergencyContacts": [] })),
    )
    .await
    .unwrap_err();
  assert!(!err.is_not_found());
  let Some(admission_core::Error::Validation(fields)) = err.rejection() else {
    panic!("expected a validation rejection, got {err}");
  };
  assert!(fields.contains("emergencyContacts"));

  let fetched = s.get_by_id(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.application, created.application);
}

#[tokio::test]
async fn photo_is_stored_and_returned() {
  let s = store().await;
  let created = s.create(fixtures::new_application()).await.unwrap();
  assert!(created.application.student_photo.is_none());

  s.update(created.id, ApplicationPatch::photo("aGVsbG8=".into()))
    .await
    .unwrap();

  let fetched = s.get_by_id(created.id).await.unwrap().unwrap();
  assert_eq!(fetched.application.student_photo.as_deref(), Some("aGVsbG8="));
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn records_survive_reopening_the_file() {
  let path = std::env::temp_dir()
    .join(format!("admission-store-{}.sqlite", std::process::id()));
  let _ = std::fs::remove_file(&path);

  let created = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.create(fixtures::new_application()).await.unwrap()
  };

  let s = SqliteStore::open(&path).await.unwrap();
  let fetched = s
    .get_by_reference(&created.reference_number)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.id, created.id);

  drop(s);
  let _ = std::fs::remove_file(&path);
}
