// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs, enums and traits that define the core
// concepts of the system.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or threads
//   - Only plain data, errors and traits
//
// Reference: Rust Book §5 (Structs), §6 (Enums), §10 (Traits)

/// A row of tabular data and its cell values
pub mod record;

/// Which columns are features, category and target
pub mod schema;

/// Feature ranges, category index, encoding context
pub mod encoding;

/// Typed pipeline errors and their reason codes
pub mod error;

/// Prediction results and score bands
pub mod prediction;

/// Worker request / event protocol
pub mod messages;

/// Core abstractions (traits) that other layers implement
pub mod traits;
