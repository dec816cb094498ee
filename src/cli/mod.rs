// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `train`   — trains the model on a CSV file
//   2. `predict` — loads a checkpoint and scores one student
//   3. `session` — interactive front end over the background
//                  training worker
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;
pub mod session;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, PredictArgs, TrainArgs};

use crate::domain::messages::WorkerEvent;
use crate::domain::prediction::Prediction;

#[derive(Parser, Debug)]
#[command(
    name = "productivity-predictor",
    version = "0.1.0",
    about = "Train a regression model on student habits, then predict productivity scores."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Predict(args) => run_predict(args),
            Commands::Session(args) => session::run(args),
        }
    }
}

/// Handles the `train` subcommand: train in the foreground,
/// then persist config, context and weights together.
fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::{LoggingObserver, TrainResult, TrainUseCase};
    use crate::data::loader::CsvSource;
    use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};

    let use_case = TrainUseCase::new(args.into());
    let cfg = use_case.config();
    tracing::info!("Training on '{}'", cfg.data_path);

    let ckpt = CheckpointManager::new(&cfg.checkpoint_dir);
    let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;
    let metrics_path = metrics.csv_path().clone();
    let observer = LoggingObserver::new(cfg.epochs, Some(metrics));
    let source = CsvSource::new(&cfg.data_path, use_case.schema().clone());

    match use_case.execute(&source, &observer)? {
        TrainResult::Ready(predictor) => {
            ckpt.save_config(cfg)?;
            predictor.save_checkpoint(&ckpt)?;
            println!("Training complete. Checkpoint saved to '{}'.", ckpt.dir().display());
            println!("Epoch metrics written to '{}'.", metrics_path.display());
        }
        TrainResult::Cancelled { epochs_completed } => {
            println!("Training stopped after {epochs_completed} epochs. Nothing saved.");
        }
    }
    Ok(())
}

/// Handles the `predict` subcommand.
fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let use_case = PredictUseCase::new(&args.checkpoint_dir)?;
    let student = match &args.student {
        Some(path) => PredictUseCase::load_student(path)?,
        None => use_case.random_student(args.seed),
    };

    let prediction = use_case.predict(&student)?;
    if args.json {
        println!("{}", serde_json::to_string(&WorkerEvent::Prediction(prediction))?);
    } else {
        println!("{}", render_prediction(&prediction));
    }
    Ok(())
}

/// Human-readable result: score, band and a habit summary.
pub fn render_prediction(p: &Prediction) -> String {
    let summary = p.summary();
    if summary.is_empty() {
        format!("Predicted productivity: {:.2} ({})", p.predicted_productivity, p.band())
    } else {
        format!(
            "Predicted productivity: {:.2} ({})\n  {}",
            p.predicted_productivity,
            p.band(),
            summary
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::Record;

    #[test]
    fn test_render_prediction() {
        let p = Prediction {
            student: Record::new().with("sleep_hours", 7.5),
            predicted_productivity: 63.456,
        };
        assert_eq!(render_prediction(&p), "Predicted productivity: 63.46 (high)\n  sleep 7.5h");

        let bare = Prediction { student: Record::new(), predicted_productivity: 12.0 };
        assert_eq!(render_prediction(&bare), "Predicted productivity: 12.00 (low)");
    }
}
