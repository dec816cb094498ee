// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam.
//
//   - Training uses TrainBackend (Autodiff<NdArray>) for gradients
//   - model.valid() returns the model on InferBackend (NdArray),
//     with dropout disabled, for validation and inference
//   - Loss is mean squared error, tracked metric is mean
//     absolute error, both averaged per sample over the epoch
//
// After every epoch the observer receives EpochMetrics, and is
// asked whether to stop; a stop request ends the run at that
// epoch boundary.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    nn::loss::{MseLoss, Reduction},
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::RegressionBatcher, dataset::RegressionDataset};
use crate::domain::messages::EpochMetrics;
use crate::domain::traits::TrainingObserver;
use crate::ml::model::{ProductivityRegressor, RegressorConfig};

pub type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;
pub type InferBackend = burn::backend::NdArray;

/// How a run ended.
pub enum TrainingOutcome {
    Completed(ProductivityRegressor<InferBackend>),
    Cancelled { epochs_completed: usize },
}

/// Per-sample running mean over variable-size batches.
#[derive(Default)]
struct RunningMean {
    sum: f64,
    count: usize,
}

impl RunningMean {
    fn push(&mut self, batch_mean: f64, batch_size: usize) {
        self.sum += batch_mean * batch_size as f64;
        self.count += batch_size;
    }

    fn value(&self) -> f64 {
        if self.count > 0 {
            self.sum / self.count as f64
        } else {
            f64::NAN
        }
    }
}

/// Map a finished epoch onto 2..=99 so 1 and 100 stay reserved
/// for "started" and "done".
pub fn epoch_progress(epoch: usize, epochs: usize) -> u8 {
    let done = (epoch + 1).min(epochs.max(1));
    (1 + done * 98 / epochs.max(1)) as u8
}

pub fn run_training(
    cfg: &TrainConfig,
    input_dim: usize,
    train_dataset: RegressionDataset,
    val_dataset: RegressionDataset,
    observer: &dyn TrainingObserver,
) -> Result<TrainingOutcome> {
    let device = burn::backend::ndarray::NdArrayDevice::default();
    TrainBackend::seed(cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = RegressorConfig::new(input_dim)
        .with_hidden1(cfg.hidden1)
        .with_hidden2(cfg.hidden2)
        .with_hidden3(cfg.hidden3)
        .with_dropout(cfg.dropout);
    let mut model: ProductivityRegressor<TrainBackend> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: {} → {} → {} → {} → 1",
        input_dim,
        cfg.hidden1,
        cfg.hidden2,
        cfg.hidden3
    );

    let mut optim = AdamConfig::new().init();
    let mse = MseLoss::new();

    // ── Training data loader (AutodiffBackend, shuffled mini-batches) ─────────
    let train_loader = DataLoaderBuilder::new(RegressionBatcher::<TrainBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend — no autodiff overhead) ──────────
    let val_loader = DataLoaderBuilder::new(RegressionBatcher::<InferBackend>::new(device.clone()))
        .batch_size(cfg.batch_size)
        .build(val_dataset);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 0..cfg.epochs {
        if observer.should_stop() {
            tracing::info!("Training stopped after {} epochs", epoch);
            return Ok(TrainingOutcome::Cancelled { epochs_completed: epoch });
        }

        let mut train_loss = RunningMean::default();
        let mut train_mae = RunningMean::default();

        for batch in train_loader.iter() {
            let batch_size = batch.targets.dims()[0];
            let output = model.forward(batch.features);

            let loss = mse.forward(output.clone(), batch.targets.clone(), Reduction::Mean);
            let mae = (output - batch.targets).abs().mean();

            train_loss.push(loss.clone().into_scalar().elem::<f64>(), batch_size);
            train_mae.push(mae.into_scalar().elem::<f64>(), batch_size);

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();
        let mut val_loss = RunningMean::default();
        let mut val_mae = RunningMean::default();

        for batch in val_loader.iter() {
            let batch_size = batch.targets.dims()[0];
            let output = model_valid.forward(batch.features);

            let loss = mse.forward(output.clone(), batch.targets.clone(), Reduction::Mean);
            let mae = (output - batch.targets).abs().mean();

            val_loss.push(loss.into_scalar().elem::<f64>(), batch_size);
            val_mae.push(mae.into_scalar().elem::<f64>(), batch_size);
        }

        let metrics = EpochMetrics {
            epoch,
            loss: train_loss.value(),
            mae: train_mae.value(),
            val_loss: val_loss.value(),
            val_mae: val_mae.value(),
        };

        tracing::debug!(
            "Epoch {:>3}/{} | loss={:.5} | mae={:.5} | val_loss={:.5} | val_mae={:.5}",
            epoch + 1,
            cfg.epochs,
            metrics.loss,
            metrics.mae,
            metrics.val_loss,
            metrics.val_mae,
        );

        observer.on_epoch_end(&metrics);
        observer.on_progress(epoch_progress(epoch, cfg.epochs));
    }

    tracing::info!("Training complete after {} epochs", cfg.epochs);
    Ok(TrainingOutcome::Completed(model.valid()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::RegressionSample;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Recorder {
        epochs: RefCell<Vec<EpochMetrics>>,
        progress: RefCell<Vec<u8>>,
        stop_after: Option<usize>,
        seen: Cell<usize>,
    }

    impl TrainingObserver for Recorder {
        fn on_progress(&self, percent: u8) {
            self.progress.borrow_mut().push(percent);
        }

        fn on_epoch_end(&self, metrics: &EpochMetrics) {
            self.epochs.borrow_mut().push(*metrics);
            self.seen.set(self.seen.get() + 1);
        }

        fn should_stop(&self) -> bool {
            self.stop_after.is_some_and(|n| self.seen.get() >= n)
        }
    }

    fn tiny_config(epochs: usize) -> TrainConfig {
        TrainConfig {
            epochs,
            batch_size: 4,
            hidden1: 8,
            hidden2: 8,
            hidden3: 4,
            ..TrainConfig::default()
        }
    }

    fn samples(n: usize) -> Vec<RegressionSample> {
        (0..n)
            .map(|i| {
                let x = i as f32 / n as f32;
                RegressionSample { features: vec![x, 1.0 - x, 1.0, 0.0], target: x }
            })
            .collect()
    }

    #[test]
    fn test_epoch_progress_bounds() {
        assert_eq!(epoch_progress(0, 50), 2);
        assert_eq!(epoch_progress(49, 50), 99);
        assert_eq!(epoch_progress(0, 1), 99);
        assert_eq!(epoch_progress(0, 0), 99);
    }

    #[test]
    fn test_reports_every_epoch() {
        let observer = Recorder::default();
        let outcome = run_training(
            &tiny_config(3),
            4,
            RegressionDataset::new(samples(16)),
            RegressionDataset::new(samples(4)),
            &observer,
        )
        .unwrap();

        assert!(matches!(outcome, TrainingOutcome::Completed(_)));
        let epochs = observer.epochs.borrow();
        assert_eq!(epochs.iter().map(|m| m.epoch).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(epochs.iter().all(|m| m.loss.is_finite() && m.val_mae.is_finite()));
        assert!(epochs.iter().all(|m| m.loss >= 0.0 && m.mae >= 0.0));
        assert_eq!(observer.progress.borrow().len(), 3);
    }

    #[test]
    fn test_stop_request_ends_run_between_epochs() {
        let observer = Recorder { stop_after: Some(2), ..Recorder::default() };
        let outcome = run_training(
            &tiny_config(10),
            4,
            RegressionDataset::new(samples(8)),
            RegressionDataset::new(samples(2)),
            &observer,
        )
        .unwrap();

        match outcome {
            TrainingOutcome::Cancelled { epochs_completed } => assert_eq!(epochs_completed, 2),
            TrainingOutcome::Completed(_) => panic!("run should have been cancelled"),
        }
        assert_eq!(observer.epochs.borrow().len(), 2);
    }

    #[test]
    fn test_empty_validation_reports_nan() {
        let observer = Recorder::default();
        run_training(
            &tiny_config(1),
            4,
            RegressionDataset::new(samples(8)),
            RegressionDataset::new(Vec::new()),
            &observer,
        )
        .unwrap();
        assert!(observer.epochs.borrow()[0].val_loss.is_nan());
    }
}
