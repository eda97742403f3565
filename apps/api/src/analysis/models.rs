use serde::Serialize;

/// JSON key for the match percentage in the model's reply.
pub const JD_MATCH: &str = "JD Match";
/// JSON key for the keywords the resume lacks.
pub const MISSING_KEYWORDS: &str = "MissingKeywords";
/// JSON key for the narrative assessment.
pub const PROFILE_SUMMARY: &str = "Profile Summary";

/// Validated outcome of one analysis.
///
/// Only `response_parser` constructs this, and only after all three fields were found in
/// the model's reply. Serializes back to the same three keys the model was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    #[serde(rename = "JD Match")]
    match_score: String,
    #[serde(rename = "MissingKeywords")]
    missing_keywords: Vec<String>,
    #[serde(rename = "Profile Summary")]
    profile_summary: String,
}

impl AnalysisResult {
    pub(crate) fn new(
        match_score: String,
        missing_keywords: Vec<String>,
        profile_summary: String,
    ) -> Self {
        Self {
            match_score,
            missing_keywords,
            profile_summary,
        }
    }

    /// Display string as the model wrote it, e.g. "78%" or "78".
    pub fn match_score(&self) -> &str {
        &self.match_score
    }

    pub fn missing_keywords(&self) -> &[String] {
        &self.missing_keywords
    }

    pub fn profile_summary(&self) -> &str {
        &self.profile_summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_result_serializes_with_schema_keys() {
        let result = AnalysisResult::new(
            "82%".to_string(),
            vec!["Kubernetes".to_string()],
            "Strong backend fit.".to_string(),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "JD Match": "82%",
                "MissingKeywords": ["Kubernetes"],
                "Profile Summary": "Strong backend fit."
            })
        );
    }
}
