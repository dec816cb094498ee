// ============================================================
// Layer 3 — Encoding Context Types
// ============================================================
// The frozen statistics that turn a Record into numbers:
//
//   FeatureRange   — observed (min, max) of one numeric field
//   CategoryIndex  — sorted distinct categories → dense index
//   EncodingContext — all of the above plus the vector width
//
// The context is built once per training run (data::context)
// and reused unchanged for every later encoding, both while
// building the dataset and when predicting. It is saved as
// JSON next to the model weights so inference can rebuild
// exactly the same vectors.
//
// Min-max scaling:
//   normalised = (value - min) / (max - min)
//   value      = normalised * (max - min) + min
//
// A zero-variance feature (min == max) maps to 0.

use serde::{Deserialize, Serialize};

use crate::domain::schema::Schema;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    pub min: f64,
    pub max: f64,
}

impl FeatureRange {
    /// Range seeded from a single observation.
    pub fn point(value: f64) -> Self {
        Self { min: value, max: value }
    }

    /// Widen the range to include `value`.
    pub fn observe(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.span();
        if span == 0.0 {
            0.0
        } else {
            (value - self.min) / span
        }
    }

    pub fn denormalize(&self, normalized: f64) -> f64 {
        normalized * self.span() + self.min
    }
}

/// Lexicographically sorted categories; position == index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryIndex {
    categories: Vec<String>,
}

impl CategoryIndex {
    /// Sort and de-duplicate so the mapping does not depend on row order.
    pub fn from_values(values: impl IntoIterator<Item = String>) -> Self {
        let mut categories: Vec<String> = values.into_iter().collect();
        categories.sort();
        categories.dedup();
        Self { categories }
    }

    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }

    pub fn cardinality(&self) -> usize {
        self.categories.len()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingContext {
    pub schema: Schema,
    /// One range per numeric feature, in schema order.
    pub feature_ranges: Vec<FeatureRange>,
    pub target_range: FeatureRange,
    pub category_index: CategoryIndex,
    /// numeric feature count + category cardinality
    pub dimensions: usize,
}

impl EncodingContext {
    pub fn numeric_len(&self) -> usize {
        self.feature_ranges.len()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_map_to_unit_interval() {
        let r = FeatureRange { min: 50.0, max: 500.0 };
        assert_eq!(r.normalize(50.0), 0.0);
        assert_eq!(r.normalize(500.0), 1.0);
        // coffee=250 → (250-50)/(500-50) ≈ 0.444
        assert!((r.normalize(250.0) - 0.4444).abs() < 1e-3);
    }

    #[test]
    fn test_zero_variance_maps_to_zero() {
        let r = FeatureRange::point(7.0);
        assert_eq!(r.normalize(7.0), 0.0);
        assert_eq!(r.normalize(9.0), 0.0);
    }

    #[test]
    fn test_denormalize_inverts_normalize() {
        let r = FeatureRange { min: 12.5, max: 97.25 };
        for v in [12.5, 30.0, 55.55, 80.1, 97.25] {
            let back = r.denormalize(r.normalize(v));
            assert!((back - v).abs() < 1e-9, "{v} came back as {back}");
        }
    }

    #[test]
    fn test_observe_widens() {
        let mut r = FeatureRange::point(20.0);
        r.observe(10.0);
        r.observe(30.0);
        r.observe(15.0);
        assert_eq!(r, FeatureRange { min: 10.0, max: 30.0 });
    }

    #[test]
    fn test_category_index_is_sorted_and_dense() {
        let idx = CategoryIndex::from_values(
            ["Other", "Male", "Female", "Male"].map(String::from),
        );
        assert_eq!(idx.categories(), ["Female", "Male", "Other"]);
        assert_eq!(idx.index_of("Female"), Some(0));
        assert_eq!(idx.index_of("Other"), Some(2));
        assert_eq!(idx.index_of("Robot"), None);
        assert_eq!(idx.cardinality(), 3);
    }
}
