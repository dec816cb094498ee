// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores a trained model using Burn's CompactRecorder.
//
// What gets saved per training run:
//   1. Model weights (.mpk.gz)  — all learned parameters
//   2. encoding_context.json    — feature ranges + categories
//   3. train_config.json        — model architecture config
//
// Why save the context separately?
//   The weights are meaningless without the exact ranges and
//   category order they were trained against. Inference must
//   rebuild byte-for-byte the same input vectors.
//
// File layout:
//   checkpoints/
//     model.mpk.gz
//     encoding_context.json
//     train_config.json
//     metrics.csv            ← written by MetricsLogger
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::domain::encoding::EncodingContext;
use crate::ml::model::ProductivityRegressor;

const MODEL_FILE: &str = "model";
const CONTEXT_FILE: &str = "encoding_context.json";
const CONFIG_FILE: &str = "train_config.json";

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager rooted at `dir`.
    /// The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create checkpoint dir '{}'", self.dir.display()))
    }

    /// Save model weights. The recorder appends the `.mpk.gz` extension.
    pub fn save_model<B: Backend>(&self, model: &ProductivityRegressor<B>) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join(MODEL_FILE);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        tracing::debug!("Saved model weights to '{}'", path.display());
        Ok(())
    }

    /// Load weights into a model with the matching architecture.
    pub fn load_model<B: Backend>(
        &self,
        model: ProductivityRegressor<B>,
        device: &B::Device,
    ) -> Result<ProductivityRegressor<B>> {
        let path = self.dir.join(MODEL_FILE);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    pub fn save_context(&self, context: &EncodingContext) -> Result<()> {
        self.write_json(CONTEXT_FILE, context)
    }

    pub fn load_context(&self) -> Result<EncodingContext> {
        self.read_json(CONTEXT_FILE)
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write_json(CONFIG_FILE, cfg)
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        self.read_json(CONFIG_FILE)
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json).with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Saved '{}'", path.display());
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read '{}'. Make sure you have run 'train' before 'predict'.",
                path.display()
            )
        })?;
        serde_json::from_str(&json).with_context(|| format!("Malformed '{}'", path.display()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::context::build_context;
    use crate::domain::record::Record;
    use crate::domain::schema::Schema;
    use crate::ml::model::RegressorConfig;
    use burn::backend::NdArray;

    #[test]
    fn test_context_and_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().join("ckpt"));

        let records = vec![
            Record::new().with("feat", 1.0).with("kind", "x").with("score", 3.0),
            Record::new().with("feat", 2.0).with("kind", "y").with("score", 4.0),
        ];
        let ctx = build_context(&records, &Schema::new(["feat"], "kind", "score")).unwrap();
        ckpt.save_context(&ctx).unwrap();
        assert_eq!(ckpt.load_context().unwrap(), ctx);

        let cfg = TrainConfig { epochs: 7, ..TrainConfig::default() };
        ckpt.save_config(&cfg).unwrap();
        assert_eq!(ckpt.load_config().unwrap().epochs, 7);
    }

    #[test]
    fn test_weights_survive_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path());
        let device = Default::default();
        let cfg = RegressorConfig::new(3).with_hidden1(4).with_hidden2(4).with_hidden3(2);

        let trained: ProductivityRegressor<NdArray> = cfg.init(&device);
        ckpt.save_model(&trained).unwrap();

        let fresh: ProductivityRegressor<NdArray> = cfg.init(&device);
        let loaded = ckpt.load_model(fresh, &device).unwrap();

        let input = Tensor::<NdArray, 2>::ones([1, 3], &device);
        let a = trained.forward(input.clone()).into_data().to_vec::<f32>().unwrap();
        let b = loaded.forward(input).into_data().to_vec::<f32>().unwrap();
        // CompactRecorder stores half precision
        assert!((a[0] - b[0]).abs() < 1e-2);
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path());
        let err = ckpt.load_context().unwrap_err();
        assert!(err.to_string().contains("run 'train'"));
    }
}
