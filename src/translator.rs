// Import necessary crates and modules
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::grade_item::GradeItem;
use crate::grade_record::{
    grade_floats_different, grade_floatval, FeedbackFormat, GradeRecord, GradeWrite,
};

// JSON-LD context headers, wire-exact.
pub const CONTEXT_LINE_ITEM: &str = "http://purl.imsglobal.org/ctx/lis/v2/LineItem";
pub const CONTEXT_LINE_ITEM_CONTAINER: &str =
    "http://purl.imsglobal.org/ctx/lis/v2/outcomes/LineItemContainer";
pub const CONTEXT_RESULT: &str = "http://purl.imsglobal.org/ctx/lis/v2p1/Result";
pub const CONTEXT_SCORE: &str = "http://purl.imsglobal.org/ctx/lis/v1/Score";
pub const CONTEXT_SCORE_CONTAINER: &str =
    "http://purl.imsglobal.org/ctx/lis/v1/outcomes/ScoreContainer";

/// Structure holding a LineItem JSON-LD payload as submitted by a tool.
///
/// Every field is optional: which fields are present (as opposed to absent or null)
/// decides which validation and update branches run, so the handlers inspect the
/// options directly instead of filling defaults at decode time.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LineItemPayload {
    #[serde(rename = "@type")]
    pub type_name: Option<String>,
    pub label: Option<String>,
    #[serde(rename = "lineItemScoreMaximum")]
    pub line_item_score_maximum: Option<f64>,
    #[serde(rename = "resourceId")]
    pub resource_id: Option<String>,
    // The wire allows both a JSON number and a numeric string here.
    #[serde(rename = "resourceLinkId")]
    pub resource_link_id: Option<Value>,
    #[serde(rename = "lineItemType")]
    pub line_item_type: Option<String>,
    #[serde(rename = "assignedActivity")]
    pub assigned_activity: Option<AssignedActivity>,
}

/// Activity reference a tool may attach to a line item payload.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AssignedActivity {
    #[serde(rename = "activityId")]
    pub activity_id: Option<String>,
}

/// Structure holding a Score JSON-LD payload as submitted by a tool.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ScorePayload {
    #[serde(rename = "@type")]
    pub type_name: Option<String>,
    #[serde(rename = "scoreGiven")]
    pub score_given: Option<f64>,
    #[serde(rename = "scoreMaximum")]
    pub score_maximum: Option<f64>,
    pub comment: Option<String>,
    pub timestamp: Option<String>,
    #[serde(rename = "gradingProgress")]
    pub grading_progress: Option<String>,
    #[serde(rename = "resultAgent")]
    pub result_agent: Option<ResultAgent>,
}

/// Agent block of a Score payload, naming the user the score belongs to.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ResultAgent {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Extracts a numeric identifier from a wire value that may be a JSON number or a
/// numeric string. Non-numeric values yield `None` and the field is ignored.
pub fn numeric_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Formats a grade timestamp the way the wire expects it, e.g. `2026-08-06T14:05+0000`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M%z").to_string()
}

/// Parses an incoming ISO-8601 timestamp.
///
/// Accepts RFC 3339 and the minute-precision form produced by `format_timestamp`.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%z")
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Rescales an incoming raw score onto the grade item's own maximum.
///
/// The score keeps its value when no incoming maximum is given, when the incoming
/// maximum equals the item maximum within the grade tolerance, or when the incoming
/// maximum is zero. Otherwise the score is scaled proportionally.
pub fn rescale_raw_grade(given: f64, incoming_max: Option<f64>, item_max: f64) -> f64 {
    let raw = grade_floatval(given);
    if let Some(max) = incoming_max {
        if grade_floats_different(Some(max), Some(item_max))
            && grade_floats_different(Some(max), Some(0.0))
        {
            return grade_floatval(raw * item_max / max);
        }
    }
    raw
}

/// Builds the grade write for one submitted Score payload.
///
/// Arguments:
/// - `score`: Decoded Score payload; callers have already validated required fields.
/// - `user_id`: Target user, taken from the path or the payload's result agent.
/// - `item`: Grade item the score is applied against.
/// - `now`: Timestamp to use when the payload carries none.
pub fn grade_write_from_score(
    score: &ScorePayload,
    user_id: &str,
    item: &GradeItem,
    now: DateTime<Utc>,
) -> GradeWrite {
    let raw_grade = score
        .score_given
        .map(|given| rescale_raw_grade(given, score.score_maximum, item.grade_max));
    let (feedback, feedback_format) = match score.comment.as_deref() {
        Some(comment) if !comment.is_empty() => {
            (Some(comment.to_string()), FeedbackFormat::Plain)
        }
        _ => (None, FeedbackFormat::Native),
    };
    let time_modified = score
        .timestamp
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or(now);

    GradeWrite {
        user_id: user_id.to_string(),
        raw_grade,
        raw_grade_min: grade_floatval(0.0),
        feedback,
        feedback_format,
        time_modified: Some(time_modified),
    }
}

/// Serializes a grade item as LineItem JSON-LD.
///
/// Arguments:
/// - `item`: Grade item to serialize.
/// - `endpoint`: Lineitems container endpoint; the item id is appended to form `@id`.
/// - `is_container`: True when the item is one of many inside a container page, which
///   suppresses the `@context`/`@type` header.
/// - `context_id`: When given, a `lineItemOf` block naming the course context is added.
///
/// The score maximum is truncated to an integer on output. This loses precision but
/// is what consumers of this wire format expect.
pub fn item_to_json(
    item: &GradeItem,
    endpoint: &str,
    is_container: bool,
    context_id: Option<&str>,
) -> Value {
    let id = format!("{}/{}", endpoint, item.id);
    let mut line_item = Map::new();
    line_item.insert("@id".to_string(), json!(id));
    if !is_container {
        line_item.insert("@context".to_string(), json!([CONTEXT_LINE_ITEM]));
        line_item.insert("@type".to_string(), json!("LineItem"));
    }
    line_item.insert("label".to_string(), json!(item.item_name));
    line_item.insert(
        "lineItemScoreMaximum".to_string(),
        json!(item.grade_max.trunc() as i64),
    );
    if let Some(id_number) = item.id_number.as_deref() {
        if !id_number.is_empty() {
            line_item.insert("resourceId".to_string(), json!(id_number));
        }
    }
    line_item.insert("scores".to_string(), json!(format!("{}/scores", id)));
    if let Some(line_item_type) = item.line_item_type.as_deref() {
        if !line_item_type.is_empty() {
            line_item.insert("lineItemType".to_string(), json!(line_item_type));
        }
    }
    if let Some(context) = context_id {
        line_item.insert("lineItemOf".to_string(), json!({ "contextId": context }));
    }
    if let Some(instance) = item.item_instance {
        line_item.insert("resourceLinkId".to_string(), json!(instance.to_string()));
    }
    Value::Object(line_item)
}

/// Serializes a grade record as Result JSON-LD.
///
/// `endpoint` is the lineitem endpoint; the result lives under
/// `{endpoint}/results/{user}`. An ungraded record serializes with a null
/// `resultScore` and no timestamp.
pub fn result_to_json(grade: &GradeRecord, endpoint: &str, include_context: bool) -> Value {
    let mut result = Map::new();
    result.insert(
        "@id".to_string(),
        json!(format!("{}/results/{}", endpoint, grade.user_id)),
    );
    if include_context {
        result.insert("@context".to_string(), json!(CONTEXT_RESULT));
        result.insert("@type".to_string(), json!("Result"));
    }
    result.insert("resultScore".to_string(), json!(grade.final_grade));
    result.insert(
        "resultMaximum".to_string(),
        json!(grade.raw_grade_max.trunc() as i64),
    );
    if let Some(feedback) = grade.feedback.as_deref() {
        if !feedback.is_empty() {
            result.insert("comment".to_string(), json!(feedback));
        }
    }
    if let Some(time_modified) = &grade.time_modified {
        result.insert("timestamp".to_string(), json!(format_timestamp(time_modified)));
    }
    Value::Object(result)
}

/// Serializes a grade record as Score JSON-LD.
///
/// `endpoint` is the lineitem endpoint; the score lives under
/// `{endpoint}/scores/{user}` and points back at the line item through `scoreOf`.
pub fn score_to_json(grade: &GradeRecord, endpoint: &str, include_context: bool) -> Value {
    let mut score = Map::new();
    score.insert(
        "@id".to_string(),
        json!(format!("{}/scores/{}", endpoint, grade.user_id)),
    );
    if include_context {
        score.insert("@context".to_string(), json!(CONTEXT_SCORE));
        score.insert("@type".to_string(), json!("Score"));
    }
    score.insert("scoreGiven".to_string(), json!(grade.final_grade));
    score.insert(
        "scoreMaximum".to_string(),
        json!(grade.raw_grade_max.trunc() as i64),
    );
    if let Some(feedback) = grade.feedback.as_deref() {
        if !feedback.is_empty() {
            score.insert("comment".to_string(), json!(feedback));
        }
    }
    score.insert("scoreOf".to_string(), json!(endpoint));
    if let Some(time_modified) = &grade.time_modified {
        score.insert("timestamp".to_string(), json!(format_timestamp(time_modified)));
    }
    score.insert(
        "resultAgent".to_string(),
        json!({ "userId": grade.user_id }),
    );
    Value::Object(score)
}
