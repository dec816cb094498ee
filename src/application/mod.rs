// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// goal each: train a model, predict with a saved model, or run
// the background worker that does both on request.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - No direct file parsing (that's Layer 4 and 6)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System), §16 (Concurrency)

// The training workflow
pub mod train_use_case;

// Offline prediction from a checkpoint
pub mod predict_use_case;

// Background worker and the typed bridge that talks to it
pub mod worker;
