// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:    zero-based epoch index
//   - loss:     mean squared error on the training partition
//   - mae:      mean absolute error on the training partition
//   - val_loss: mean squared error on the validation partition
//   - val_mae:  mean absolute error on the validation partition
//
// Output file: checkpoints/metrics.csv
//
// Example CSV output:
//   epoch,loss,mae,val_loss,val_mae
//   0,0.041210,0.163300,0.035120,0.151000
//   1,0.028840,0.135900,0.026010,0.129800
//
// How to read the metrics:
//   - loss should decrease each epoch (model is learning)
//   - if val_loss increases while loss decreases → overfitting
//   - mae is in normalised units: multiply by the target span
//     (max - min) to read it as score points

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::messages::EpochMetrics;

const HEADER: &str = "epoch,loss,mae,val_loss,val_mae";

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Starts a fresh file: each training run gets its own log.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("metrics.csv");
        let mut f = fs::File::create(&csv_path)?;
        writeln!(f, "{HEADER}")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6}",
            m.epoch, m.loss, m.mae, m.val_loss, m.val_mae,
        )?;

        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
