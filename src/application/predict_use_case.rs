// ============================================================
// Layer 2 — Predict Use Case
// ============================================================
// Offline prediction against a saved checkpoint:
//   1. Rebuild the predictor (weights + encoding context)
//   2. Take a student from a JSON file, or sample a random one
//      using the categories the model was trained on
//   3. Predict and return the score with its input

use anyhow::{Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use std::{fs, path::Path};

use crate::data::sampler::random_student;
use crate::domain::prediction::Prediction;
use crate::domain::record::Record;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::predictor::Predictor;

pub struct PredictUseCase {
    predictor: Predictor,
}

impl PredictUseCase {
    pub fn new(checkpoint_dir: &str) -> Result<Self> {
        let ckpt = CheckpointManager::new(checkpoint_dir);
        let predictor = Predictor::from_checkpoint(&ckpt)?;
        Ok(Self { predictor })
    }

    pub fn from_predictor(predictor: Predictor) -> Self {
        Self { predictor }
    }

    /// Read one student record from a JSON object file.
    pub fn load_student(path: impl AsRef<Path>) -> Result<Record> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Cannot read student file '{}'", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("'{}' is not a JSON object of fields", path.display()))
    }

    /// A plausible student whose gender the model has seen.
    pub fn random_student(&self, seed: u64) -> Record {
        let mut rng = StdRng::seed_from_u64(seed);
        random_student(&mut rng, self.predictor.context().category_index.categories())
    }

    pub fn predict(&self, student: &Record) -> Result<Prediction> {
        Ok(self.predictor.predict(student)?)
    }
}
