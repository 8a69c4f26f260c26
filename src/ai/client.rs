//! HTTP LLM providers used by the fact checker.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::config::{ProviderEndpoint, ProviderKind};

/// Connection timeout for HTTP requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall request timeout. Fact-check answers are long-form.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Retries allowed for a request answered with a server error.
const MAX_RETRIES: u32 = 3;

/// Anthropic API version sent with every Claude request.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Errors from AI provider operations.
#[derive(Error, Debug)]
pub enum AiError {
    #[error("API key not configured (env: {0})")]
    MissingApiKey(String),
    #[error("API request failed: {0}")]
    RequestFailed(String),
    #[error("Failed to parse response: {0}")]
    ParseError(String),
    #[error("AI request timed out")]
    Timeout,
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::RequestFailed(e.to_string())
        }
    }
}

/// Delay before retrying a failed response, or `None` when it is final.
///
/// Only 5xx answers are retried, waiting 1s, 2s, then 4s.
fn retry_delay(status: StatusCode, attempt: u32) -> Option<Duration> {
    (status.is_server_error() && attempt < MAX_RETRIES)
        .then(|| Duration::from_secs(1 << attempt))
}

/// Join every text part found at `parts`, ignoring non-text entries.
fn collect_text(parts: &serde_json::Value) -> Option<String> {
    let text: Vec<&str> = parts
        .as_array()?
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text.concat())
    }
}

/// Trait for AI providers.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Generate a response from the AI provider.
    async fn generate(&self, system: &str, user: &str) -> Result<String, AiError>;
}

/// Endpoint, credentials and HTTP client shared by the providers.
#[derive(Debug, Clone)]
struct Connection {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl Connection {
    fn new(endpoint: &ProviderEndpoint, api_key: String) -> Self {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to configure HTTP client, using defaults");
                Client::new()
            });
        Self {
            client,
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: endpoint.model.clone(),
            max_tokens: endpoint.max_tokens,
        }
    }

    /// POST `body` to `path`, retrying server errors, and return the JSON reply.
    async fn post_json(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, AiError> {
        let url = format!("{}{path}", self.base_url);
        let mut attempt = 0;
        loop {
            let request = headers
                .iter()
                .fold(self.client.post(&url), |req, (name, value)| req.header(*name, *value));
            let response = request.json(body).send().await?;

            let status = response.status();
            if status.is_success() {
                return response
                    .json()
                    .await
                    .map_err(|e| AiError::ParseError(e.to_string()));
            }

            match retry_delay(status, attempt) {
                Some(delay) => {
                    tracing::debug!(%url, %status, attempt, ?delay, "Retrying provider request");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    let text = response.text().await.unwrap_or_default();
                    return Err(AiError::RequestFailed(format!("HTTP {status}: {text}")));
                }
            }
        }
    }
}

/// Gemini `generateContent` provider.
#[derive(Debug, Clone)]
pub struct GeminiProvider(Connection);

impl GeminiProvider {
    fn request_body(&self, system: &str, user: &str) -> serde_json::Value {
        serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": user }] }],
            "systemInstruction": { "parts": [{ "text": system }] },
            "generationConfig": { "maxOutputTokens": self.0.max_tokens }
        })
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    async fn generate(&self, system: &str, user: &str) -> Result<String, AiError> {
        let conn = &self.0;
        let path = format!("/models/{}:generateContent", conn.model);
        let reply = conn
            .post_json(
                &path,
                &[("x-goog-api-key", conn.api_key.as_str())],
                &self.request_body(system, user),
            )
            .await?;

        collect_text(&reply["candidates"][0]["content"]["parts"])
            .ok_or_else(|| AiError::ParseError("No text in Gemini response".to_string()))
    }
}

/// Claude Messages API provider.
#[derive(Debug, Clone)]
pub struct ClaudeProvider(Connection);

impl ClaudeProvider {
    fn request_body(&self, system: &str, user: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.0.model,
            "max_tokens": self.0.max_tokens,
            "system": system,
            "messages": [{ "role": "user", "content": user }]
        })
    }
}

#[async_trait]
impl AiProvider for ClaudeProvider {
    async fn generate(&self, system: &str, user: &str) -> Result<String, AiError> {
        let conn = &self.0;
        let reply = conn
            .post_json(
                "/v1/messages",
                &[
                    ("x-api-key", conn.api_key.as_str()),
                    ("anthropic-version", ANTHROPIC_VERSION),
                ],
                &self.request_body(system, user),
            )
            .await?;

        collect_text(&reply["content"])
            .ok_or_else(|| AiError::ParseError("No text in Claude response".to_string()))
    }
}

/// A configured provider, dispatched by kind.
#[derive(Debug, Clone)]
pub enum Provider {
    Gemini(GeminiProvider),
    Claude(ClaudeProvider),
}

impl Provider {
    /// Build a provider for an endpoint with an explicit API key.
    #[must_use]
    pub fn new(endpoint: &ProviderEndpoint, api_key: String) -> Self {
        let conn = Connection::new(endpoint, api_key);
        match endpoint.kind {
            ProviderKind::Gemini => Self::Gemini(GeminiProvider(conn)),
            ProviderKind::Claude => Self::Claude(ClaudeProvider(conn)),
        }
    }

    /// Build a provider reading the API key from the endpoint's environment variable.
    ///
    /// # Errors
    ///
    /// Returns `AiError::MissingApiKey` if the variable is unset or empty.
    pub fn from_env(endpoint: &ProviderEndpoint) -> Result<Self, AiError> {
        let api_key = std::env::var(&endpoint.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AiError::MissingApiKey(endpoint.api_key_env.clone()))?;
        Ok(Self::new(endpoint, api_key))
    }
}

#[async_trait]
impl AiProvider for Provider {
    async fn generate(&self, system: &str, user: &str) -> Result<String, AiError> {
        match self {
            Self::Gemini(p) => p.generate(system, user).await,
            Self::Claude(p) => p.generate(system, user).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(kind: ProviderKind, env: &str) -> ProviderEndpoint {
        ProviderEndpoint {
            kind,
            model: format!("{kind}-test"),
            base_url: "https://api.example.com".to_string(),
            api_key_env: env.to_string(),
            max_tokens: 1024,
        }
    }

    #[test]
    fn test_retry_delay_only_for_server_errors() {
        assert_eq!(
            retry_delay(StatusCode::INTERNAL_SERVER_ERROR, 0),
            Some(Duration::from_secs(1))
        );
        assert_eq!(retry_delay(StatusCode::BAD_GATEWAY, 1), Some(Duration::from_secs(2)));
        assert_eq!(
            retry_delay(StatusCode::SERVICE_UNAVAILABLE, 2),
            Some(Duration::from_secs(4))
        );

        assert!(retry_delay(StatusCode::BAD_REQUEST, 0).is_none());
        assert!(retry_delay(StatusCode::UNAUTHORIZED, 0).is_none());
        assert!(retry_delay(StatusCode::TOO_MANY_REQUESTS, 0).is_none());
    }

    #[test]
    fn test_retry_delay_gives_up_after_max_retries() {
        assert!(retry_delay(StatusCode::INTERNAL_SERVER_ERROR, MAX_RETRIES).is_none());
        assert!(retry_delay(StatusCode::SERVICE_UNAVAILABLE, MAX_RETRIES + 1).is_none());
    }

    #[test]
    fn test_collect_text_joins_parts() {
        let parts = serde_json::json!([
            { "text": "Verdict: " },
            { "type": "tool_use" },
            { "text": "misleading" }
        ]);
        assert_eq!(collect_text(&parts).as_deref(), Some("Verdict: misleading"));
    }

    #[test]
    fn test_collect_text_missing() {
        assert!(collect_text(&serde_json::Value::Null).is_none());
        assert!(collect_text(&serde_json::json!([{ "type": "image" }])).is_none());
    }

    #[test]
    fn test_provider_new_dispatches_by_kind() {
        let gemini = Provider::new(&endpoint(ProviderKind::Gemini, "UNUSED"), "k".to_string());
        assert!(matches!(gemini, Provider::Gemini(ref p) if p.0.model == "gemini-test"));

        let claude = Provider::new(&endpoint(ProviderKind::Claude, "UNUSED"), "k".to_string());
        assert!(matches!(claude, Provider::Claude(ref p) if p.0.max_tokens == 1024));
    }

    #[test]
    fn test_connection_trims_trailing_slash() {
        let mut ep = endpoint(ProviderKind::Gemini, "UNUSED");
        ep.base_url = "https://api.example.com/v1beta/".to_string();
        let conn = Connection::new(&ep, "k".to_string());
        assert_eq!(conn.base_url, "https://api.example.com/v1beta");
    }

    #[test]
    fn test_gemini_request_body() {
        let Provider::Gemini(gemini) =
            Provider::new(&endpoint(ProviderKind::Gemini, "UNUSED"), "k".to_string())
        else {
            panic!("expected Gemini provider");
        };
        let body = gemini.request_body("be strict", "detox tea");

        assert_eq!(body["contents"][0]["parts"][0]["text"], "detox tea");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be strict");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn test_claude_request_body() {
        let Provider::Claude(claude) =
            Provider::new(&endpoint(ProviderKind::Claude, "UNUSED"), "k".to_string())
        else {
            panic!("expected Claude provider");
        };
        let body = claude.request_body("be strict", "detox tea");

        assert_eq!(body["model"], "claude-test");
        assert_eq!(body["system"], "be strict");
        assert_eq!(body["messages"][0]["content"], "detox tea");
        assert_eq!(body["max_tokens"], 1024);
    }

    #[test]
    fn test_from_env_missing_key() {
        let result = Provider::from_env(&endpoint(
            ProviderKind::Gemini,
            "ORGAN_FACTCHECK_TEST_UNSET_KEY",
        ));
        assert!(matches!(result, Err(AiError::MissingApiKey(ref env)) if env == "ORGAN_FACTCHECK_TEST_UNSET_KEY"));
    }

    #[test]
    fn test_from_env_with_key() {
        std::env::set_var("ORGAN_FACTCHECK_TEST_CLAUDE_KEY", "test-key");
        let provider = Provider::from_env(&endpoint(
            ProviderKind::Claude,
            "ORGAN_FACTCHECK_TEST_CLAUDE_KEY",
        ))
        .unwrap();
        assert!(matches!(provider, Provider::Claude(_)));
        std::env::remove_var("ORGAN_FACTCHECK_TEST_CLAUDE_KEY");
    }
}
