// ============================================================
// Layer 3 — Record Domain Type
// ============================================================
// One row of tabular input: a single student's behaviour data.
//
// A record is a mapping from field name to a value that is
// either numeric or categorical text. The same type is used
// for rows parsed from the CSV corpus and for a new student
// submitted for prediction (which simply lacks the target).
//
// On the wire a record is a flat JSON object:
//   { "age": 21, "gender": "Female", "sleep_hours": 7.5, ... }
//
// Reference: Rust Book §6 (Enums), §8 (Hash Maps)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::error::PipelineError;

/// A single cell value.
///
/// `untagged` lets serde accept plain JSON numbers and strings
/// without any wrapper object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Coerce a raw CSV cell: non-empty cells that parse as a
    /// finite float become numbers, everything else stays text.
    pub fn from_cell(cell: &str) -> Self {
        let cell = cell.trim();
        match cell.parse::<f64>() {
            Ok(n) if !cell.is_empty() && n.is_finite() => FieldValue::Number(n),
            _ => FieldValue::Text(cell.to_string()),
        }
    }

    /// Key used for categorical lookup. Numbers are rendered with
    /// their shortest display form so `1` and `1.0` agree.
    pub fn category_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// One subject's named feature values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for tests and the random generator.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Look up a field that must be numeric.
    pub fn number(&self, name: &str) -> Result<f64, PipelineError> {
        match self.fields.get(name) {
            Some(FieldValue::Number(n)) => Ok(*n),
            Some(FieldValue::Text(s)) => Err(PipelineError::NotNumeric {
                field: name.to_string(),
                value: s.clone(),
            }),
            None => Err(PipelineError::MissingField(name.to_string())),
        }
    }

    /// Look up a categorical field and return its lookup key.
    pub fn category(&self, name: &str) -> Result<String, PipelineError> {
        self.fields
            .get(name)
            .map(FieldValue::category_key)
            .ok_or_else(|| PipelineError::MissingField(name.to_string()))
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().collect() }
    }
}
