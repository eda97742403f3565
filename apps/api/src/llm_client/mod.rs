//! LLM Client — the single point of entry for all model calls in Hirelyzer.
//!
//! ARCHITECTURAL RULE: No other module may call the Gemini API directly.
//! Callers depend on the `ModelGateway` trait: a prompt goes in, raw reply text comes out.
//! Turning that text into structured data is the caller's job (see `analysis::response_parser`).
//!
//! One attempt per call. A failed call is reported to the caller, never retried here.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::analysis::prompt_builder::Prompt;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Used when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode model response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Prompt was blocked by the model: {0}")]
    Blocked(String),

    #[error("Empty response received from the model")]
    EmptyContent,

    #[error("Model did not reply within {0:?}")]
    Timeout(Duration),
}

/// Capability boundary to the hosted model.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Sends one prompt and returns the model's raw, unparsed reply text.
    async fn generate(&self, prompt: &Prompt) -> Result<String, GatewayError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        Some(text)
    }

    fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback.as_ref()?.block_reason.as_deref()
    }
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: String,
}

/// Gemini `generateContent` binding.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            api_key: api_key.trim().to_string(),
            model,
            base_url: GEMINI_API_BASE.to_string(),
            timeout,
        }
    }

    /// Points the client at another API root, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn call(&self, prompt: &str) -> Result<GenerateContentResponse, GatewayError> {
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Gemini API returned {}", status);
            let message = serde_json::from_str::<GoogleError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ModelGateway for GeminiClient {
    async fn generate(&self, prompt: &Prompt) -> Result<String, GatewayError> {
        let started = Instant::now();

        let response = self.call(prompt.as_str()).await.map_err(|e| match e {
            GatewayError::Http(err) if err.is_timeout() => GatewayError::Timeout(self.timeout),
            other => other,
        })?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                "Gemini call succeeded in {}ms: prompt_tokens={}, candidate_tokens={}",
                started.elapsed().as_millis(),
                usage.prompt_token_count,
                usage.candidates_token_count
            );
        }

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => {
                if let Some(reason) = response.block_reason() {
                    return Err(GatewayError::Blocked(reason.to_string()));
                }
                let finish_reason = response
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.as_deref())
                    .unwrap_or("none");
                warn!("Gemini returned no text (finish_reason={finish_reason})");
                Err(GatewayError::EmptyContent)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::analysis::prompt_builder::build;

    const MODEL: &str = "gemini-test";
    const GENERATE_PATH: &str = "/models/gemini-test:generateContent";

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new(
            "AIza-test-key".to_string(),
            MODEL.to_string(),
            Duration::from_secs(5),
        )
        .with_base_url(server.uri())
    }

    fn prompt() -> Prompt {
        build("Rust engineer, 6 years", "Senior Rust engineer wanted").unwrap()
    }

    fn candidate_reply(parts: &[&str]) -> Value {
        let parts: Vec<Value> = parts.iter().map(|t| json!({ "text": t })).collect();
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": parts },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 120, "candidatesTokenCount": 40 }
        })
    }

    #[tokio::test]
    async fn test_generate_returns_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "AIza-test-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(candidate_reply(&["{\"JD Match\": \"70%\"}"])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server).generate(&prompt()).await.unwrap();
        assert_eq!(text, "{\"JD Match\": \"70%\"}");
    }

    #[tokio::test]
    async fn test_generate_sends_prompt_as_single_user_part() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_reply(&["ok"])))
            .mount(&server)
            .await;

        let prompt = prompt();
        client_for(&server).generate(&prompt).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], prompt.as_str());
    }

    #[tokio::test]
    async fn test_generate_joins_multiple_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(candidate_reply(&["{\"a\":", " 1}"])),
            )
            .mount(&server)
            .await;

        let text = client_for(&server).generate(&prompt()).await.unwrap();
        assert_eq!(text, "{\"a\": 1}");
    }

    #[tokio::test]
    async fn test_generate_api_error_uses_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).generate(&prompt()).await.unwrap_err();
        match err {
            GatewayError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).generate(&prompt()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Api { status: 503, ref message } if message == "overloaded"));
    }

    #[tokio::test]
    async fn test_generate_blocked_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).generate(&prompt()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Blocked(ref reason) if reason == "SAFETY"));
    }

    #[tokio::test]
    async fn test_generate_blank_text_is_empty_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_reply(&["  \n"])))
            .mount(&server)
            .await;

        let err = client_for(&server).generate(&prompt()).await.unwrap_err();
        assert!(matches!(err, GatewayError::EmptyContent));
    }

    #[tokio::test]
    async fn test_generate_no_candidates_is_empty_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = client_for(&server).generate(&prompt()).await.unwrap_err();
        assert!(matches!(err, GatewayError::EmptyContent));
    }

    #[tokio::test]
    async fn test_generate_undecodable_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate(&prompt()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[tokio::test]
    async fn test_generate_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(candidate_reply(&["late"]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new(
            "AIza-test-key".to_string(),
            MODEL.to_string(),
            Duration::from_millis(200),
        )
        .with_base_url(server.uri());

        let err = client.generate(&prompt()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Timeout(d) if d == Duration::from_millis(200)));
    }

    #[test]
    fn test_with_base_url_strips_trailing_slash() {
        let client = GeminiClient::new("k".to_string(), MODEL.to_string(), Duration::from_secs(1))
            .with_base_url("http://localhost:9999/");
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/models/gemini-test:generateContent"
        );
        assert_eq!(client.model(), MODEL);
    }
}
