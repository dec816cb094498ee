// ============================================================
// Layer 5 — Predictor
// ============================================================
// Runs the trained regressor on one new student:
//
//   1. encode the record with the context from the same
//      training run (unknown category → error)
//   2. reshape to a single-row matrix [1, dimensions]
//   3. forward pass → one normalised score in [0, 1]
//   4. de-normalise with the target range, round to 2 dp
//
// The model and its context are kept together so a prediction
// can never mix weights from one run with the ranges or
// categories of another.

use anyhow::Result;
use burn::prelude::*;
use std::sync::Arc;

use crate::data::encoder::encode;
use crate::domain::encoding::EncodingContext;
use crate::domain::error::PipelineError;
use crate::domain::prediction::{round2, Prediction};
use crate::domain::record::Record;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{ProductivityRegressor, RegressorConfig};
use crate::ml::trainer::InferBackend;

pub struct Predictor {
    model: ProductivityRegressor<InferBackend>,
    context: Arc<EncodingContext>,
    device: burn::backend::ndarray::NdArrayDevice,
}

impl Predictor {
    pub fn new(model: ProductivityRegressor<InferBackend>, context: Arc<EncodingContext>) -> Self {
        Self { model, context, device: Default::default() }
    }

    /// Rebuild the model from a saved checkpoint.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager) -> Result<Self> {
        let device = burn::backend::ndarray::NdArrayDevice::default();
        let cfg = ckpt_manager.load_config()?;
        let context = ckpt_manager.load_context()?;

        let model_cfg = RegressorConfig::new(context.dimensions)
            .with_hidden1(cfg.hidden1)
            .with_hidden2(cfg.hidden2)
            .with_hidden3(cfg.hidden3)
            .with_dropout(0.0);
        let model: ProductivityRegressor<InferBackend> = model_cfg.init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint ({} inputs)", context.dimensions);

        Ok(Self { model, context: Arc::new(context), device })
    }

    /// Persist weights and context so `from_checkpoint` can rebuild
    /// this exact predictor. The config is saved by the caller.
    pub fn save_checkpoint(&self, ckpt_manager: &CheckpointManager) -> Result<()> {
        ckpt_manager.save_model(&self.model)?;
        ckpt_manager.save_context(&self.context)?;
        Ok(())
    }

    pub fn context(&self) -> &EncodingContext {
        &self.context
    }

    /// Normalised model output in [0, 1] for one student.
    pub fn predict_normalized(&self, student: &Record) -> Result<f64, PipelineError> {
        let vector = encode(student, &self.context)?;
        let input = Tensor::<InferBackend, 1>::from_floats(vector.as_slice(), &self.device)
            .reshape([1, self.context.dimensions]);

        let output = self.model.forward(input);
        Ok(output.flatten::<1>(0, 1).into_scalar().elem::<f64>())
    }

    pub fn predict(&self, student: &Record) -> Result<Prediction, PipelineError> {
        let normalized = self.predict_normalized(student)?;
        let score = self.context.target_range.denormalize(normalized);

        tracing::debug!("Prediction: normalised={:.4} score={:.2}", normalized, score);

        Ok(Prediction {
            student: student.clone(),
            predicted_productivity: round2(score),
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::context::build_context;
    use crate::domain::schema::Schema;

    fn predictor() -> Predictor {
        let schema = Schema::new(["feat"], "kind", "score");
        let records = vec![
            Record::new().with("feat", 0.0).with("kind", "a").with("score", 20.0),
            Record::new().with("feat", 10.0).with("kind", "b").with("score", 80.0),
        ];
        let context = build_context(&records, &schema).unwrap();
        let model = RegressorConfig::new(context.dimensions)
            .with_hidden1(4)
            .with_hidden2(4)
            .with_hidden3(4)
            .init(&Default::default());
        Predictor::new(model, Arc::new(context))
    }

    #[test]
    fn test_score_is_within_target_range() {
        let p = predictor();
        let student = Record::new().with("feat", 5.0).with("kind", "b");
        let prediction = p.predict(&student).unwrap();

        assert!((20.0..=80.0).contains(&prediction.predicted_productivity));
        assert_eq!(prediction.student, student);
        // rounded to two decimals
        let scaled = prediction.predicted_productivity * 100.0;
        assert!((scaled - scaled.round()).abs() < 1e-6);
    }

    #[test]
    fn test_denormalises_model_output() {
        let p = predictor();
        let student = Record::new().with("feat", 3.0).with("kind", "a");
        let normalized = p.predict_normalized(&student).unwrap();
        let expected = round2(normalized * 60.0 + 20.0);
        assert_eq!(p.predict(&student).unwrap().predicted_productivity, expected);
    }

    #[test]
    fn test_checkpoint_round_trip_gives_same_score() {
        use crate::application::train_use_case::TrainConfig;

        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path());
        let cfg = TrainConfig { hidden1: 4, hidden2: 4, hidden3: 4, ..TrainConfig::default() };
        ckpt.save_config(&cfg).unwrap();

        let p = predictor();
        p.save_checkpoint(&ckpt).unwrap();
        let restored = Predictor::from_checkpoint(&ckpt).unwrap();

        let student = Record::new().with("feat", 7.0).with("kind", "a");
        let before = p.predict(&student).unwrap().predicted_productivity;
        let after = restored.predict(&student).unwrap().predicted_productivity;
        // CompactRecorder stores half precision
        assert!((before - after).abs() < 0.5);
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let p = predictor();
        let student = Record::new().with("feat", 3.0).with("kind", "zzz");
        assert!(matches!(
            p.predict(&student),
            Err(PipelineError::UnknownCategory { .. })
        ));
    }
}
