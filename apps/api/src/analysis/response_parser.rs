//! Response Parser — turns the model's free-form reply into a validated `AnalysisResult`.
//!
//! Two stages:
//! 1. Localize a JSON object: parse the whole reply, or failing that the span from the
//!    first `{` to the last `}` (prose or code fences around the object are tolerated).
//! 2. Validate the object: all of "JD Match", "MissingKeywords" and "Profile Summary"
//!    must be present. Unknown keys are ignored. A missing key is an error, never a default.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::analysis::models::{AnalysisResult, JD_MATCH, MISSING_KEYWORDS, PROFILE_SUMMARY};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Model returned an empty reply")]
    EmptyReply,

    #[error("Could not find a JSON object in the model reply")]
    NoJsonFound,

    #[error("Extracted content is not valid JSON: {0}")]
    UnparsableReply(#[source] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Parses a raw model reply.
pub fn parse(reply: &str) -> Result<AnalysisResult, ParseError> {
    if reply.trim().is_empty() {
        return Err(ParseError::EmptyReply);
    }

    let object = match serde_json::from_str::<Map<String, Value>>(reply) {
        Ok(object) => {
            debug!("Model reply parsed as bare JSON");
            object
        }
        Err(e) => {
            debug!(error = %e, "Model reply is not bare JSON; extracting brace-delimited span");
            let span = locate_json_span(reply).ok_or(ParseError::NoJsonFound)?;
            serde_json::from_str(span).map_err(ParseError::UnparsableReply)?
        }
    };

    validate_fields(object)
}

/// Largest `{ ... }` span: first opening brace through the last closing brace after it.
///
/// Sibling objects are deliberately not separated; `{"a":1} and {"b":2}` yields the whole
/// stretch, which then fails to parse.
fn locate_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn validate_fields(mut object: Map<String, Value>) -> Result<AnalysisResult, ParseError> {
    let fields = (
        object.remove(JD_MATCH),
        object.remove(MISSING_KEYWORDS),
        object.remove(PROFILE_SUMMARY),
    );
    let (match_score, missing_keywords, profile_summary) = match fields {
        (Some(score), Some(keywords), Some(summary)) => (score, keywords, summary),
        (None, _, _) => return Err(ParseError::MissingField(JD_MATCH)),
        (_, None, _) => return Err(ParseError::MissingField(MISSING_KEYWORDS)),
        (_, _, None) => return Err(ParseError::MissingField(PROFILE_SUMMARY)),
    };

    let missing_keywords = match missing_keywords {
        Value::Array(items) => items.into_iter().map(display_value).collect(),
        other => {
            return Err(ParseError::InvalidField {
                field: MISSING_KEYWORDS,
                reason: format!("expected a list, found {}", kind_of(&other)),
            })
        }
    };

    let profile_summary = display_value(profile_summary);
    if profile_summary.trim().is_empty() {
        return Err(ParseError::InvalidField {
            field: PROFILE_SUMMARY,
            reason: "summary is blank".to_string(),
        });
    }

    Ok(AnalysisResult::new(
        display_value(match_score),
        missing_keywords,
        profile_summary,
    ))
}

/// Strings pass through verbatim; any other value keeps its JSON spelling (`78`, `true`).
fn display_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
