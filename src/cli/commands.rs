// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `train`, `predict` and
// `session`, and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the productivity model on a CSV file and save a checkpoint
    Train(TrainArgs),

    /// Predict one student's productivity with a saved checkpoint
    Predict(PredictArgs),

    /// Interactive session driving a background training worker
    Session(SessionArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// CSV file with one student per row
    #[arg(long, default_value = "data/students.csv")]
    pub data_path: String,

    /// Directory to save model weights, context and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Number of full passes through the training partition
    #[arg(long, default_value_t = 50)]
    pub epochs: usize,

    /// Number of rows processed together in one step
    #[arg(long, default_value_t = 64, value_parser = positive)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3, value_parser = learning_rate)]
    pub lr: f64,

    #[arg(long, default_value_t = 128, value_parser = positive)]
    pub hidden1: usize,

    #[arg(long, default_value_t = 64, value_parser = positive)]
    pub hidden2: usize,

    #[arg(long, default_value_t = 32, value_parser = positive)]
    pub hidden3: usize,

    /// Dropout probability after the first two hidden layers
    #[arg(long, default_value_t = 0.2, value_parser = probability)]
    pub dropout: f64,

    /// Leading fraction of rows used for training; the rest validate
    #[arg(long, default_value_t = 0.8, value_parser = open_fraction)]
    pub train_fraction: f64,

    /// Seed for weight init and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Shuffle rows with this seed before the split
    /// (without it the split follows file order)
    #[arg(long)]
    pub shuffle_seed: Option<u64>,
}

fn positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        Ok(_) => Err("must be at least 1".into()),
        Err(e) => Err(e.to_string()),
    }
}

fn probability(s: &str) -> Result<f64, String> {
    let p: f64 = s.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err("must be within [0, 1]".into())
    }
}

/// Both partitions must keep at least one row, so 0 and 1 are excluded.
fn open_fraction(s: &str) -> Result<f64, String> {
    let f: f64 = s.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if f > 0.0 && f < 1.0 {
        Ok(f)
    } else {
        Err("must be strictly between 0 and 1".into())
    }
}

fn learning_rate(s: &str) -> Result<f64, String> {
    let lr: f64 = s.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    if lr.is_finite() && lr > 0.0 {
        Ok(lr)
    } else {
        Err("must be a positive number".into())
    }
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:      a.data_path,
            checkpoint_dir: a.checkpoint_dir,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            lr:             a.lr,
            hidden1:        a.hidden1,
            hidden2:        a.hidden2,
            hidden3:        a.hidden3,
            dropout:        a.dropout,
            train_fraction: a.train_fraction,
            seed:           a.seed,
            shuffle_seed:   a.shuffle_seed,
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Directory where `train` saved its checkpoint
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// JSON file holding one student object
    #[arg(long, conflicts_with = "random", required_unless_present = "random")]
    pub student: Option<String>,

    /// Predict for a randomly generated student instead
    #[arg(long)]
    pub random: bool,

    /// Seed for `--random`
    #[arg(long, default_value_t = 7)]
    pub seed: u64,

    /// Print the prediction as a JSON event
    #[arg(long)]
    pub json: bool,
}

/// All arguments for the `session` command
#[derive(Args, Debug)]
pub struct SessionArgs {
    #[command(flatten)]
    pub train: TrainArgs,

    /// Print every worker event as one JSON line
    #[arg(long)]
    pub json: bool,

    /// Do not start a training run when the session opens
    #[arg(long)]
    pub no_auto_train: bool,
}
