// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns that touch the filesystem:
//
//   checkpoint.rs — Saving and loading model weights
//                   (Burn's CompactRecorder), plus the
//                   EncodingContext and TrainConfig as JSON
//                   so inference rebuilds the exact model and
//                   input vectors.
//
//   metrics.rs    — Training metrics logging
//                   Writes per-epoch loss / MAE to a CSV file
//                   for later analysis and plotting.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
