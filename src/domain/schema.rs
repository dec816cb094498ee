// ============================================================
// Layer 3 — Feature Schema
// ============================================================
// Names the columns the pipeline cares about:
//   - numeric features, in the order they appear in the
//     encoded vector
//   - one categorical field (one-hot encoded)
//   - one numeric target (what the model predicts)
//
// The default schema is the student productivity dataset.

use serde::{Deserialize, Serialize};

use crate::domain::error::PipelineError;

/// Numeric student features in encoding order.
pub const STUDENT_NUMERIC_FEATURES: [&str; 15] = [
    "age",
    "study_hours_per_day",
    "sleep_hours",
    "phone_usage_hours",
    "social_media_hours",
    "youtube_hours",
    "gaming_hours",
    "breaks_per_day",
    "coffee_intake_mg",
    "exercise_minutes",
    "assignments_completed",
    "attendance_percentage",
    "stress_level",
    "focus_score",
    "final_grade",
];

pub const STUDENT_CATEGORICAL_FIELD: &str = "gender";
pub const STUDENT_TARGET_FIELD: &str = "productivity_score";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub numeric_features: Vec<String>,
    pub categorical: String,
    pub target: String,
}

impl Schema {
    pub fn new(
        numeric_features: impl IntoIterator<Item = impl Into<String>>,
        categorical: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            numeric_features: numeric_features.into_iter().map(Into::into).collect(),
            categorical: categorical.into(),
            target: target.into(),
        }
    }

    /// The 15-feature student schema with `gender` and `productivity_score`.
    pub fn student_productivity() -> Self {
        Self::new(
            STUDENT_NUMERIC_FEATURES,
            STUDENT_CATEGORICAL_FIELD,
            STUDENT_TARGET_FIELD,
        )
    }

    /// Every column the training corpus must provide.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.numeric_features
            .iter()
            .map(String::as_str)
            .chain([self.categorical.as_str(), self.target.as_str()])
    }

    /// Fail with the first schema column absent from `headers`.
    pub fn check_header(&self, headers: &[String]) -> Result<(), PipelineError> {
        match self.columns().find(|c| !headers.iter().any(|h| h == c)) {
            Some(missing) => Err(PipelineError::MissingColumn(missing.to_string())),
            None => Ok(()),
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::student_productivity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_schema_shape() {
        let s = Schema::student_productivity();
        assert_eq!(s.numeric_features.len(), 15);
        assert_eq!(s.columns().count(), 17);
    }

    #[test]
    fn test_check_header_reports_missing_column() {
        let s = Schema::new(["feat"], "kind", "score");
        let headers = vec!["feat".to_string(), "score".to_string()];
        assert_eq!(
            s.check_header(&headers),
            Err(PipelineError::MissingColumn("kind".into()))
        );

        let headers = vec!["kind".into(), "feat".into(), "score".into(), "extra".into()];
        assert_eq!(s.check_header(&headers), Ok(()));
    }
}
