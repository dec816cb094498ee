// ============================================================
// Layer 3 — Pipeline Errors
// ============================================================
// Every way the data pipeline can refuse an input. These are
// local failures: they abort the current train or predict
// operation and are reported to the front end, but never
// take down the worker thread.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("input has no header row")]
    MissingHeader,

    #[error("line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("column '{0}' is missing from the header")]
    MissingColumn(String),

    #[error("record is missing field '{0}'")]
    MissingField(String),

    #[error("field '{field}' must be numeric, got '{value}'")]
    NotNumeric { field: String, value: String },

    #[error("unknown category '{value}' for field '{field}'")]
    UnknownCategory { field: String, value: String },

    #[error("no records to build an encoding context from")]
    EmptyDataset,

    #[error("cannot split {records} records into non-empty training and validation partitions (train fraction {fraction})")]
    InsufficientData { records: usize, fraction: f64 },

    #[error("model not ready: no training run has completed")]
    ModelNotReady,

    #[error("invalid training setting '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },
}

/// Machine-readable reason attached to failure events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ParseError,
    MissingField,
    UnknownCategory,
    InsufficientData,
    ModelNotReady,
    TrainingFailed,
}

impl PipelineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PipelineError::MissingHeader
            | PipelineError::MalformedRow { .. }
            | PipelineError::MissingColumn(_)
            | PipelineError::NotNumeric { .. } => ErrorCode::ParseError,
            PipelineError::MissingField(_) => ErrorCode::MissingField,
            PipelineError::UnknownCategory { .. } => ErrorCode::UnknownCategory,
            PipelineError::EmptyDataset | PipelineError::InsufficientData { .. } => {
                ErrorCode::InsufficientData
            }
            PipelineError::ModelNotReady => ErrorCode::ModelNotReady,
            PipelineError::InvalidConfig { .. } => ErrorCode::TrainingFailed,
        }
    }
}
