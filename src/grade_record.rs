// Import necessary crates and modules
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format tag carried with grade feedback text.
///
/// `Plain` marks feedback written through this service; `Native` is the gradebook's
/// own default format and is what cleared feedback falls back to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackFormat {
    Plain,
    Native,
}

impl Default for FeedbackFormat {
    fn default() -> Self {
        FeedbackFormat::Native
    }
}

/// Structure holding one student's grade against one grade item.
///
/// A record with no `time_modified` has not been graded yet and must not be exposed
/// as a populated Result on the wire.
///
/// Fields:
/// - `item_id`: Grade item the record belongs to.
/// - `user_id`: Student the record belongs to.
/// - `raw_grade`: Raw score as written, already rescaled to the item's bounds.
/// - `raw_grade_min`: Raw minimum; always 0 for writes made by this service.
/// - `raw_grade_max`: Raw maximum at the time of the write.
/// - `final_grade`: Final grade as computed by the gradebook store.
/// - `feedback`: Feedback text, optional.
/// - `feedback_format`: Format of `feedback`.
/// - `time_modified`: Timestamp of the last grading write, absent when ungraded.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GradeRecord {
    pub item_id: i64,
    pub user_id: String,
    pub raw_grade: Option<f64>,
    pub raw_grade_min: f64,
    pub raw_grade_max: f64,
    pub final_grade: Option<f64>,
    pub feedback: Option<String>,
    pub feedback_format: FeedbackFormat,
    pub time_modified: Option<DateTime<Utc>>,
}

/// One grade write submitted to the grade-update collaborator.
///
/// A write with `raw_grade` and `time_modified` both absent clears the record: the
/// score and feedback are removed and the record is marked not-yet-graded.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeWrite {
    pub user_id: String,
    pub raw_grade: Option<f64>,
    pub raw_grade_min: f64,
    pub feedback: Option<String>,
    pub feedback_format: FeedbackFormat,
    pub time_modified: Option<DateTime<Utc>>,
}

impl GradeWrite {
    /// Builds the write that withdraws a submission for a user.
    pub fn cleared(user_id: impl Into<String>) -> GradeWrite {
        GradeWrite {
            user_id: user_id.into(),
            raw_grade: None,
            raw_grade_min: 0.0,
            feedback: None,
            feedback_format: FeedbackFormat::Native,
            time_modified: None,
        }
    }
}

/// Normalizes a grade value to the precision the gradebook stores.
///
/// Grades are kept to five decimal places; every comparison and every written value
/// goes through this first.
pub fn grade_floatval(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}

/// Compares two optional grade values under the gradebook tolerance.
///
/// Two absent values are equal; an absent and a present value differ; two present
/// values differ when they disagree after normalization.
pub fn grade_floats_different(first: Option<f64>, second: Option<f64>) -> bool {
    match (first, second) {
        (None, None) => false,
        (Some(a), Some(b)) => (grade_floatval(a) - grade_floatval(b)).abs() > 1e-9,
        _ => true,
    }
}
