// ============================================================
// Layer 3 — Prediction Result
// ============================================================
// What the worker hands back for one student: the record that
// was submitted and the predicted score on the original scale.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::record::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub student: Record,
    /// De-normalised score, rounded to two decimals.
    pub predicted_productivity: f64,
}

impl Prediction {
    pub fn band(&self) -> ProductivityBand {
        ProductivityBand::from_score(self.predicted_productivity)
    }

    /// One line describing the habits that drive the score most.
    /// Fields the record does not carry are left out.
    pub fn summary(&self) -> String {
        SUMMARY_FIELDS
            .iter()
            .filter_map(|(field, label, unit)| {
                self.student.get(field).map(|v| format!("{label} {v}{unit}"))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

const SUMMARY_FIELDS: [(&str, &str, &str); 5] = [
    ("study_hours_per_day", "study", "h/day"),
    ("sleep_hours", "sleep", "h"),
    ("phone_usage_hours", "phone", "h"),
    ("stress_level", "stress", "/10"),
    ("focus_score", "focus", ""),
];

/// Colour band used when rendering a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductivityBand {
    Low,
    Medium,
    High,
}

impl ProductivityBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 60.0 {
            ProductivityBand::High
        } else if score >= 40.0 {
            ProductivityBand::Medium
        } else {
            ProductivityBand::Low
        }
    }
}

impl fmt::Display for ProductivityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProductivityBand::Low => "low",
            ProductivityBand::Medium => "medium",
            ProductivityBand::High => "high",
        })
    }
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
