// ============================================================
// Layer 3 — Worker Protocol Messages
// ============================================================
// The closed set of messages exchanged between the front end
// and the training worker. Both enums are serde-tagged so the
// same values can be typed as JSON in an interactive session:
//
//   → {"action":"train-model"}
//   → {"action":"predict","student":{...}}
//   ← {"type":"progress-update","progress":42}
//   ← {"type":"training-log","epoch":3,"loss":0.02,...}
//   ← {"type":"training-complete","generation":1,"categories":[...]}
//   ← {"type":"predict","student":{...},"predictedProductivity":63.1}
//
// Matching on these enums is exhaustive, so adding a message
// kind forces every consumer to handle it.

use serde::{Deserialize, Serialize};

use crate::domain::error::ErrorCode;
use crate::domain::prediction::Prediction;
use crate::domain::record::Record;

/// Requests sent from the front end to the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Request {
    TrainModel,
    Predict { student: Record },
}

/// Metrics reported after every training epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Zero-based epoch index
    pub epoch: usize,
    /// Mean squared error on the training partition
    pub loss: f64,
    /// Mean absolute error on the training partition
    pub mae: f64,
    pub val_loss: f64,
    pub val_mae: f64,
}

/// Events sent from the worker back to the front end, in send order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WorkerEvent {
    ProgressUpdate {
        progress: u8,
    },
    TrainingLog(EpochMetrics),
    TrainingComplete {
        generation: u64,
        /// Category values the new model accepts, sorted.
        categories: Vec<String>,
    },
    TrainingFailed {
        generation: u64,
        code: ErrorCode,
        message: String,
    },
    TrainingCancelled {
        generation: u64,
        epochs_completed: usize,
    },
    #[serde(rename = "predict")]
    Prediction(Prediction),
    PredictionRejected {
        code: ErrorCode,
        message: String,
    },
    Log {
        message: String,
    },
}

impl WorkerEvent {
    /// True for the events that end a training run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkerEvent::TrainingComplete { .. }
                | WorkerEvent::TrainingFailed { .. }
                | WorkerEvent::TrainingCancelled { .. }
        )
    }
}
