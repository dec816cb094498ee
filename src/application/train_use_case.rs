// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load records               (Layer 4 - data)
//   Step 2: Optional seeded shuffle    (Layer 4 - data)
//   Step 3: Build encoding context     (Layer 4 - data)
//   Step 4: Encode + positional split  (Layer 4 - data)
//   Step 5: Run training loop          (Layer 5 - ml)
//   Step 6: Pair model with context    (Layer 5 - ml)
//
// The same use case serves the foreground `train` command and
// the background worker; only the observer differs.
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::data::{
    context::build_context,
    dataset::EncodedDataset,
    splitter::shuffle_records,
};
use crate::domain::error::PipelineError;
use crate::domain::messages::EpochMetrics;
use crate::domain::schema::Schema;
use crate::domain::traits::{RecordSource, TrainingObserver};
use crate::infra::metrics::MetricsLogger;
use crate::ml::predictor::Predictor;
use crate::ml::trainer::{run_training, TrainingOutcome};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved next to the checkpoint and
// reloaded for inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path: String,
    pub checkpoint_dir: String,
    pub epochs: usize,
    pub batch_size: usize,
    pub lr: f64,
    pub hidden1: usize,
    pub hidden2: usize,
    pub hidden3: usize,
    pub dropout: f64,
    /// Fraction of rows (from the top of the file) used for training
    pub train_fraction: f64,
    /// Seeds weight init and mini-batch shuffling
    pub seed: u64,
    /// When set, records are shuffled with this seed before the split
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path: "data/students.csv".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            epochs: 50,
            batch_size: 64,
            lr: 1e-3,
            hidden1: 128,
            hidden2: 64,
            hidden3: 32,
            dropout: 0.2,
            train_fraction: 0.8,
            seed: 42,
            shuffle_seed: None,
        }
    }
}

impl TrainConfig {
    /// Reject settings the model or the split cannot work with.
    /// The validation partition must be non-empty, so
    /// `train_fraction` is strictly below 1.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let invalid = |field: &str, reason: &str| {
            Err(PipelineError::InvalidConfig { field: field.into(), reason: reason.into() })
        };

        if self.batch_size == 0 {
            return invalid("batch_size", "must be at least 1");
        }
        if self.hidden1 == 0 || self.hidden2 == 0 || self.hidden3 == 0 {
            return invalid("hidden", "layer sizes must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.dropout) {
            return invalid("dropout", "must be within [0, 1]");
        }
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return invalid("train_fraction", "must be within (0, 1)");
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return invalid("lr", "must be a positive number");
        }
        Ok(())
    }
}

/// Result of a training run that did not fail.
pub enum TrainResult {
    Ready(Predictor),
    Cancelled { epochs_completed: usize },
}

pub struct TrainUseCase {
    config: TrainConfig,
    schema: Schema,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config, schema: Schema::student_productivity() }
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Execute the full training pipeline end to end.
    pub fn execute(
        &self,
        source: &dyn RecordSource,
        observer: &dyn TrainingObserver,
    ) -> Result<TrainResult> {
        let cfg = &self.config;
        cfg.validate()?;
        observer.on_progress(1);

        // ── Step 1: Load all records ──────────────────────────────────────────
        let mut records = source.load_all()?;

        // ── Step 2: Opt-in shuffle (split is positional otherwise) ────────────
        if let Some(seed) = cfg.shuffle_seed {
            shuffle_records(&mut records, seed);
            tracing::info!("Shuffled {} records with seed {}", records.len(), seed);
        }

        // ── Step 3: Build the encoding context from the full corpus ───────────
        let context = build_context(&records, &self.schema)?;

        // ── Step 4: Encode everything and split ───────────────────────────────
        let dataset = EncodedDataset::build(&records, &context, cfg.train_fraction)?;
        if dataset.split_index() == 0 || dataset.split_index() == dataset.rows() {
            return Err(PipelineError::InsufficientData {
                records: dataset.rows(),
                fraction: cfg.train_fraction,
            }
            .into());
        }
        tracing::info!(
            "Split: {} train, {} validation, {} input dimensions",
            dataset.split_index(),
            dataset.rows() - dataset.split_index(),
            dataset.dimensions(),
        );

        // ── Step 5: Run training loop (Layer 5) ───────────────────────────────
        let outcome = run_training(
            cfg,
            context.dimensions,
            dataset.train_partition(),
            dataset.validation_partition(),
            observer,
        )?;

        // ── Step 6: Keep the model and its context together ───────────────────
        match outcome {
            TrainingOutcome::Completed(model) => {
                observer.on_progress(100);
                Ok(TrainResult::Ready(Predictor::new(model, Arc::new(context))))
            }
            TrainingOutcome::Cancelled { epochs_completed } => {
                Ok(TrainResult::Cancelled { epochs_completed })
            }
        }
    }
}

// ─── LoggingObserver ──────────────────────────────────────────────────────────
// Observer used by the foreground `train` command: one log line
// per epoch, plus a row in metrics.csv when a logger is present.
pub struct LoggingObserver {
    epochs: usize,
    metrics: Option<MetricsLogger>,
}

impl LoggingObserver {
    pub fn new(epochs: usize, metrics: Option<MetricsLogger>) -> Self {
        Self { epochs, metrics }
    }
}

impl TrainingObserver for LoggingObserver {
    fn on_epoch_end(&self, m: &EpochMetrics) {
        tracing::info!(
            "Epoch {:>3}/{} | loss={:.5} | mae={:.5} | val_loss={:.5} | val_mae={:.5}",
            m.epoch + 1,
            self.epochs,
            m.loss,
            m.mae,
            m.val_loss,
            m.val_mae,
        );

        if let Some(logger) = &self.metrics {
            if let Err(e) = logger.log(m) {
                tracing::warn!("Cannot append to metrics CSV: {e:#}");
            }
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::record::Record;

    /// In-memory corpus for tests.
    pub(crate) struct VecSource(pub Vec<Record>);

    impl RecordSource for VecSource {
        fn load_all(&self) -> Result<Vec<Record>> {
            Ok(self.0.clone())
        }
    }

    pub(crate) struct Silent;

    impl TrainingObserver for Silent {
        fn on_epoch_end(&self, _metrics: &EpochMetrics) {}
    }

    pub(crate) fn tiny_config() -> TrainConfig {
        TrainConfig {
            epochs: 2,
            batch_size: 8,
            hidden1: 8,
            hidden2: 8,
            hidden3: 4,
            ..TrainConfig::default()
        }
    }

    pub(crate) fn toy_schema() -> Schema {
        Schema::new(["hours", "sleep"], "gender", "score")
    }

    pub(crate) fn toy_records(n: usize, genders: &[&str]) -> Vec<Record> {
        (0..n)
            .map(|i| {
                let hours = (i % 10) as f64;
                let sleep = 4.0 + (i % 5) as f64;
                Record::new()
                    .with("hours", hours)
                    .with("sleep", sleep)
                    .with("gender", genders[i % genders.len()])
                    .with("score", 20.0 + hours * 5.0 + sleep)
            })
            .collect()
    }

    #[test]
    fn test_execute_produces_ready_predictor() {
        let use_case = TrainUseCase::new(tiny_config()).with_schema(toy_schema());
        let source = VecSource(toy_records(40, &["F", "M"]));

        let result = use_case.execute(&source, &Silent).unwrap();
        let predictor = match result {
            TrainResult::Ready(p) => p,
            TrainResult::Cancelled { .. } => panic!("unexpected cancel"),
        };

        assert_eq!(predictor.context().dimensions, 2 + 2);
        let student = Record::new().with("hours", 5.0).with("sleep", 6.0).with("gender", "M");
        let score = predictor.predict(&student).unwrap().predicted_productivity;
        let range = predictor.context().target_range;
        assert!(score >= range.min && score <= range.max);
    }

    #[test]
    fn test_too_few_records_is_reported() {
        let use_case = TrainUseCase::new(tiny_config()).with_schema(toy_schema());
        let err = use_case
            .execute(&VecSource(toy_records(1, &["F"])), &Silent)
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::InsufficientData { records: 1, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_unusable_settings() {
        assert!(TrainConfig::default().validate().is_ok());

        let bad = [
            TrainConfig { dropout: 1.5, ..TrainConfig::default() },
            TrainConfig { dropout: -0.1, ..TrainConfig::default() },
            TrainConfig { batch_size: 0, ..TrainConfig::default() },
            TrainConfig { train_fraction: 1.0, ..TrainConfig::default() },
            TrainConfig { train_fraction: 0.0, ..TrainConfig::default() },
            TrainConfig { hidden2: 0, ..TrainConfig::default() },
            TrainConfig { lr: f64::NAN, ..TrainConfig::default() },
        ];
        for cfg in &bad {
            assert!(matches!(cfg.validate(), Err(PipelineError::InvalidConfig { .. })), "{cfg:?}");
        }
    }

    #[test]
    fn test_invalid_dropout_fails_before_loading() {
        let cfg = TrainConfig { dropout: 1.5, ..tiny_config() };
        let use_case = TrainUseCase::new(cfg).with_schema(toy_schema());
        let err = use_case
            .execute(&VecSource(toy_records(20, &["F"])), &Silent)
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::InvalidConfig { field, .. }) if field == "dropout"
        ));
    }

    #[test]
    fn test_bad_data_is_a_pipeline_error() {
        let mut records = toy_records(10, &["F"]);
        records[3].insert("sleep", "plenty");
        let use_case = TrainUseCase::new(tiny_config()).with_schema(toy_schema());
        let err = use_case.execute(&VecSource(records), &Silent).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::NotNumeric { .. })
        ));
    }
}
