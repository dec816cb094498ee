// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Splits rows into two partitions by POSITION:
//   - rows [0, split)  → training set
//   - rows [split, N)  → validation set
// where split = floor(N * train_fraction).
//
// No shuffle happens here. Mini-batch shuffling later, inside
// the DataLoader, only reorders batches within the training
// partition; it never moves rows across the split.
//
// That means the validation set is the tail of the input
// file. If the file is sorted (e.g. by the target) the split
// is biased, so callers who want a mixed split pre-shuffle
// the records with `shuffle_records` before anything else
// sees them.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation (SliceRandom)

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Index of the first validation row.
pub fn split_index(total: usize, train_fraction: f64) -> usize {
    let split_at = ((total as f64) * train_fraction).floor() as usize;
    // Clamp to valid range to avoid panics on odd fractions
    split_at.min(total)
}

/// Deterministic Fisher-Yates shuffle, for callers that want a
/// mixed split instead of a positional one.
pub fn shuffle_records<T>(rows: &mut [T], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    rows.shuffle(&mut rng);
}
