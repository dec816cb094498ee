// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams between layers:
//
//   RecordSource      — where training records come from
//                       (a CSV file today, anything tomorrow)
//   TrainingObserver  — who hears about training progress
//                       (the CLI logger, or the worker that
//                       relays events to the front end)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::messages::EpochMetrics;
use crate::domain::record::Record;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can produce the full training corpus.
///
/// Implementations:
///   - CsvSource → reads a comma-separated file from disk
pub trait RecordSource {
    fn load_all(&self) -> Result<Vec<Record>>;
}

// ─── TrainingObserver ─────────────────────────────────────────────────────────
/// Receives progress from a training run.
///
/// Called on the thread that runs training, between batches
/// of work, so implementations must return quickly.
pub trait TrainingObserver {
    /// Overall progress in percent, 1..=100.
    fn on_progress(&self, _percent: u8) {}

    /// Called once after every epoch's validation pass.
    fn on_epoch_end(&self, metrics: &EpochMetrics);

    /// Polled between epochs; returning true stops the run early.
    fn should_stop(&self) -> bool {
        false
    }
}
