// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the raw CSV file and tensor batches.
//
// The pipeline flows in this order:
//
//   students.csv
//       │
//       ▼
//   loader            → parses text into typed Records
//       │
//       ▼
//   context           → min/max per feature, sorted categories
//       │
//       ▼
//   encoder           → Record → fixed-length Vec<f32>
//       │
//       ▼
//   dataset           → inputs/labels matrices + positional split
//       │
//       ▼
//   batcher           → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Parses CSV text into Records
pub mod loader;

/// Builds the EncodingContext from the full corpus
pub mod context;

/// Encodes one Record into a numeric vector
pub mod encoder;

/// Input/label matrices and Burn Dataset partitions
pub mod dataset;

/// Implements Burn's Batcher trait for regression samples
pub mod batcher;

/// Positional train/validation split and opt-in shuffle
pub mod splitter;

/// Random students for quick predictions
pub mod sampler;
