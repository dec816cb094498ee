// ============================================================
// Layer 4 — Random Student Sampler
// ============================================================
// Produces a plausible new student for quick predictions, the
// same way the form's "fill random" button does: each field is
// drawn uniformly from a hand-picked range, decimals rounded to
// one place.
//
// The gender is chosen from the categories the model was
// trained on, so a sampled student always encodes cleanly.

use rand::Rng;

use crate::domain::record::Record;

/// (field, low, high, integer?) — ranges are half-open [low, high).
const FIELD_RANGES: [(&str, f64, f64, bool); 15] = [
    ("age", 17.0, 30.0, true),
    ("study_hours_per_day", 0.0, 10.0, false),
    ("sleep_hours", 3.0, 10.0, false),
    ("phone_usage_hours", 0.0, 12.0, false),
    ("social_media_hours", 0.0, 8.0, false),
    ("youtube_hours", 0.0, 6.0, false),
    ("gaming_hours", 0.0, 6.0, false),
    ("breaks_per_day", 1.0, 16.0, true),
    ("coffee_intake_mg", 50.0, 500.0, true),
    ("exercise_minutes", 10.0, 120.0, true),
    ("assignments_completed", 0.0, 20.0, true),
    ("attendance_percentage", 40.0, 100.0, false),
    ("stress_level", 1.0, 11.0, true),
    ("focus_score", 30.0, 100.0, true),
    ("final_grade", 50.0, 100.0, false),
];

const DEFAULT_GENDERS: [&str; 3] = ["Female", "Male", "Other"];

/// Draw one random student. `genders` falls back to the form's
/// fixed list when empty.
pub fn random_student<R: Rng + ?Sized>(rng: &mut R, genders: &[String]) -> Record {
    let mut student = Record::new();

    for (field, low, high, integer) in FIELD_RANGES {
        let raw = rng.gen_range(low..high);
        let value = if integer { raw.floor() } else { (raw * 10.0).round() / 10.0 };
        student.insert(field, value);
    }

    let gender = if genders.is_empty() {
        DEFAULT_GENDERS[rng.gen_range(0..DEFAULT_GENDERS.len())].to_string()
    } else {
        genders[rng.gen_range(0..genders.len())].clone()
    };
    student.insert("gender", gender);

    student
}
