// ============================================================
// Layer 4 — Record Encoder
// ============================================================
// Turns one Record into the fixed-length vector the network
// consumes, using a frozen EncodingContext.
//
// Layout of the output (length = context.dimensions):
//
//   [ f1, f2, ..., fN,   c0, c1, ..., cK-1 ]
//     └ min-max scaled    └ one-hot of the categorical
//       numeric features    field, in sorted category order
//       in schema order
//
// Example for the student schema (Male, 23 years old, ...):
//   [0.55, 0.43, 0.36, ..., 0, 1, 0]
//                           F  M  O
//
// A category that was not present when the context was built
// has no slot in the vector, so it is an error, never a
// silently wrong index.

use crate::domain::encoding::EncodingContext;
use crate::domain::error::PipelineError;
use crate::domain::record::Record;

pub fn encode(record: &Record, context: &EncodingContext) -> Result<Vec<f32>, PipelineError> {
    let schema = &context.schema;
    let mut vector = Vec::with_capacity(context.dimensions);

    for (feature, range) in schema.numeric_features.iter().zip(&context.feature_ranges) {
        let value = record.number(feature)?;
        vector.push(range.normalize(value) as f32);
    }

    let category = record.category(&schema.categorical)?;
    let hot = context
        .category_index
        .index_of(&category)
        .ok_or_else(|| PipelineError::UnknownCategory {
            field: schema.categorical.clone(),
            value: category.clone(),
        })?;

    vector.extend((0..context.category_index.cardinality()).map(|i| if i == hot { 1.0 } else { 0.0 }));

    debug_assert_eq!(vector.len(), context.numeric_len() + context.category_index.cardinality());
    Ok(vector)
}

/// Scale a record's target into [0, 1] for use as a label.
pub fn encode_target(record: &Record, context: &EncodingContext) -> Result<f32, PipelineError> {
    let value = record.number(&context.schema.target)?;
    Ok(context.target_range.normalize(value) as f32)
}
