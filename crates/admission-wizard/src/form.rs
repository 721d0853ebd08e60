//! Working copy of one step's answers while the applicant edits them.

use admission_core::{
  FieldErrors, Step,
  schema::{self, Kind},
};
use serde_json::{Map, Value};

use crate::error::FormError;

/// The fields of one step, editable by dotted path.
///
/// Derived fields are recomputed after every edit, so with "same as current"
/// ticked the permanent address follows each change to the current address.
#[derive(Debug, Clone, PartialEq)]
pub struct StepForm {
  step: Step,
  data: Map<String, Value>,
}

impl StepForm {
  pub fn new(step: Step) -> Self { Self { step, data: Map::new() } }

  /// A form for `step` holding whatever `record` already says for its
  /// fields.
  pub fn prefilled(step: Step, record: &Map<String, Value>) -> Self {
    let data = schema::fields(step)
      .iter()
      .filter_map(|f| record.get(f.name).map(|v| (f.name.to_owned(), v.clone())))
      .collect();
    let mut form = Self { step, data };
    form.derive();
    form
  }

  pub fn step(&self) -> Step { self.step }

  pub fn data(&self) -> &Map<String, Value> { &self.data }

  pub fn into_data(self) -> Map<String, Value> { self.data }

  /// Value at a dotted path such as `parents.0.email`.
  pub fn get(&self, path: &str) -> Option<&Value> {
    let mut segments = path.split('.');
    let mut current = self.data.get(segments.next()?)?;
    for segment in segments {
      current = match current {
        Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
        Value::Object(map) => map.get(segment)?,
        _ => return None,
      };
    }
    Some(current)
  }

  /// Set the value at a dotted path. Intermediate objects are created as
  /// needed; list entries must already exist.
  pub fn set(&mut self, path: &str, value: Value) -> Result<(), FormError> {
    let segments: Vec<&str> = path.split('.').collect();
    let Some((head, rest)) = segments.split_first() else {
      return Err(FormError::InvalidPath(path.to_owned()));
    };
    if head.is_empty() || rest.iter().any(|s| s.is_empty()) {
      return Err(FormError::InvalidPath(path.to_owned()));
    }
    self.declared(head)?;

    let slot = self.data.entry(head.to_string()).or_insert(Value::Null);
    assign(slot, rest, value, path)?;
    self.derive();
    Ok(())
  }

  /// Append `entry` to the list field `field` and return its index.
  pub fn push(&mut self, field: &str, entry: Value) -> Result<usize, FormError> {
    self.list_field(field)?;
    let slot = self.data.entry(field.to_owned()).or_insert(Value::Null);
    if !slot.is_array() {
      *slot = Value::Array(Vec::new());
    }
    let index = match slot {
      Value::Array(items) => {
        items.push(entry);
        items.len() - 1
      }
      _ => return Err(FormError::NotAList(field.to_owned())),
    };
    self.derive();
    Ok(index)
  }

  /// Remove entry `index` of the list field `field`, keeping the order of
  /// the rest.
  pub fn remove(&mut self, field: &str, index: usize) -> Result<Value, FormError> {
    self.list_field(field)?;
    let out_of_range = || FormError::IndexOutOfRange { path: field.to_owned(), index };
    let removed = match self.data.get_mut(field) {
      Some(Value::Array(items)) if index < items.len() => items.remove(index),
      _ => return Err(out_of_range()),
    };
    self.derive();
    Ok(removed)
  }

  /// Overwrite top-level fields with those in `fields`. Keys the step does
  /// not declare are ignored.
  pub fn merge(&mut self, fields: Map<String, Value>) {
    for (key, value) in fields {
      if schema::field(self.step, &key).is_some() {
        self.data.insert(key, value);
      }
    }
    self.derive();
  }

  /// Check the current answers without submitting them.
  pub fn validate(&self) -> Result<Map<String, Value>, FieldErrors> {
    schema::validate(self.step, &self.data)
  }

  fn derive(&mut self) { schema::derive(self.step, &mut self.data); }

  fn declared(&self, field: &str) -> Result<&'static schema::Field, FormError> {
    schema::field(self.step, field).ok_or_else(|| FormError::UnknownField {
      step:  self.step,
      field: field.to_owned(),
    })
  }

  fn list_field(&self, field: &str) -> Result<(), FormError> {
    match self.declared(field)?.kind {
      Kind::TextList | Kind::ObjectList(_) => Ok(()),
      _ => Err(FormError::NotAList(field.to_owned())),
    }
  }
}

fn assign(
  target: &mut Value,
  segments: &[&str],
  value: Value,
  path: &str,
) -> Result<(), FormError> {
  let Some((segment, rest)) = segments.split_first() else {
    *target = value;
    return Ok(());
  };

  match target {
    Value::Array(items) => {
      let index = segment
        .parse::<usize>()
        .map_err(|_| FormError::InvalidPath(path.to_owned()))?;
      let slot = items
        .get_mut(index)
        .ok_or_else(|| FormError::IndexOutOfRange { path: path.to_owned(), index })?;
      assign(slot, rest, value, path)
    }
    Value::Object(map) => {
      let slot = map.entry(segment.to_string()).or_insert(Value::Null);
      assign(slot, rest, value, path)
    }
    other => {
      if let Ok(index) = segment.parse::<usize>() {
        return Err(FormError::IndexOutOfRange { path: path.to_owned(), index });
      }
      *other = Value::Object(Map::new());
      assign(other, segments, value, path)
    }
  }
}
