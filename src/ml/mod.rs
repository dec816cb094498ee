// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn model and training code.
// The data layer only touches Burn through its Dataset and
// Batcher traits; the domain layer never does.
//
// What's in this layer:
//
//   model.rs     — The feed-forward regressor
//                  dense(128) → dropout → dense(64) → dropout
//                  → dense(32) → dense(1, sigmoid)
//
//   trainer.rs   — The training loop
//                  Forward pass, MSE loss, backward pass, Adam
//                  step, per-epoch validation and metrics
//
//   predictor.rs — Inference for one student
//                  Encodes, runs the model, de-normalises
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Feed-forward regression model architecture
pub mod model;

/// Training loop with validation and progress reporting
pub mod trainer;

/// Inference engine — model + encoding context
pub mod predictor;
