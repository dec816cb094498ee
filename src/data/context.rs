// ============================================================
// Layer 4 — Feature Context Builder
// ============================================================
// Scans every record once to collect what the encoder needs:
//
//   - min/max of each numeric feature (for min-max scaling)
//   - min/max of the target (labels and de-normalisation)
//   - sorted distinct values of the categorical field
//     (for one-hot encoding)
//
// Cost: O(N·F) time, O(F + K) extra space where K is the
// number of distinct categories.
//
// Sorting the categories makes the result independent of
// row order: the same set of records always yields the same
// context.

use std::collections::BTreeSet;

use crate::domain::encoding::{CategoryIndex, EncodingContext, FeatureRange};
use crate::domain::error::PipelineError;
use crate::domain::record::Record;
use crate::domain::schema::Schema;

pub fn build_context(records: &[Record], schema: &Schema) -> Result<EncodingContext, PipelineError> {
    let (first, rest) = records.split_first().ok_or(PipelineError::EmptyDataset)?;

    // Seed every range from the first record, then widen
    let mut feature_ranges = schema
        .numeric_features
        .iter()
        .map(|f| first.number(f).map(FeatureRange::point))
        .collect::<Result<Vec<_>, _>>()?;
    let mut target_range = FeatureRange::point(first.number(&schema.target)?);
    let mut categories = BTreeSet::new();
    categories.insert(first.category(&schema.categorical)?);

    for record in rest {
        for (range, feature) in feature_ranges.iter_mut().zip(&schema.numeric_features) {
            range.observe(record.number(feature)?);
        }
        target_range.observe(record.number(&schema.target)?);
        categories.insert(record.category(&schema.categorical)?);
    }

    let category_index = CategoryIndex::from_values(categories);
    let dimensions = feature_ranges.len() + category_index.cardinality();

    tracing::debug!(
        "Encoding context: {} numeric features, {} categories {:?}, {} dimensions",
        feature_ranges.len(),
        category_index.cardinality(),
        category_index.categories(),
        dimensions,
    );

    Ok(EncodingContext {
        schema: schema.clone(),
        feature_ranges,
        target_range,
        category_index,
        dimensions,
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new(["feat", "flat"], "kind", "score")
    }

    fn rec(feat: f64, kind: &str, score: f64) -> Record {
        Record::new()
            .with("feat", feat)
            .with("flat", 5.0)
            .with("kind", kind)
            .with("score", score)
    }

    #[test]
    fn test_ranges_and_categories() {
        let records = vec![rec(20.0, "b", 50.0), rec(10.0, "c", 90.0), rec(30.0, "a", 70.0)];
        let ctx = build_context(&records, &schema()).unwrap();

        // schema order: feat, flat
        assert_eq!(ctx.feature_ranges[0], FeatureRange { min: 10.0, max: 30.0 });
        assert_eq!(ctx.feature_ranges[1], FeatureRange { min: 5.0, max: 5.0 });
        assert_eq!(ctx.target_range, FeatureRange { min: 50.0, max: 90.0 });
        assert_eq!(ctx.category_index.categories(), ["a", "b", "c"]);
        assert_eq!(ctx.dimensions, 2 + 3);
    }

    #[test]
    fn test_row_order_does_not_matter() {
        let mut records = vec![rec(1.0, "x", 1.0), rec(2.0, "y", 2.0), rec(3.0, "z", 3.0)];
        let forward = build_context(&records, &schema()).unwrap();
        records.reverse();
        let backward = build_context(&records, &schema()).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_empty_records() {
        assert_eq!(build_context(&[], &schema()), Err(PipelineError::EmptyDataset));
    }

    #[test]
    fn test_missing_and_non_numeric_fields() {
        let missing = vec![Record::new().with("feat", 1.0).with("kind", "a").with("score", 1.0)];
        assert_eq!(
            build_context(&missing, &schema()),
            Err(PipelineError::MissingField("flat".into()))
        );

        let mut bad = rec(1.0, "a", 1.0);
        bad.insert("feat", "lots");
        let err = build_context(&[rec(2.0, "a", 2.0), bad], &schema()).unwrap_err();
        assert!(matches!(err, PipelineError::NotNumeric { ref field, .. } if field == "feat"));
    }
}
