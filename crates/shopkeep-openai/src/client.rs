// SPDX-FileCopyrightText: 2026 Shopkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible chat completions endpoints.
//!
//! Provides [`OpenAiClient`] which handles authentication, timeouts and
//! optional retry of transient errors.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use shopkeep_core::ShopError;
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse};

/// HTTP client for chat completions communication.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    default_model: String,
    max_retries: u32,
    timeout: Duration,
    endpoint: String,
}

impl OpenAiClient {
    /// Creates a new client.
    ///
    /// `base_url` is the API root (for Gemini,
    /// `https://generativelanguage.googleapis.com/v1beta/openai/`); the
    /// `chat/completions` path is appended to it.
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: String,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, ShopError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| ShopError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ShopError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            default_model: model,
            max_retries,
            timeout,
            endpoint: completions_endpoint(base_url),
        })
    }

    /// Returns the default model identifier.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Points the client at a different API root (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.endpoint = completions_endpoint(url);
        self
    }

    /// Sends a completion request and returns the parsed response.
    ///
    /// Transient statuses (429, 500, 502, 503) are retried after a one-second
    /// delay, up to `max_retries` times.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ShopError> {
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying completion request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .json(request)
                .send()
                .await
                .map_err(|e| self.transport_error(e))?;

            let status = response.status();
            debug!(status = %status, attempt, "completion response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| self.transport_error(e))?;
                return serde_json::from_str(&body).map_err(|e| ShopError::Provider {
                    message: format!("failed to parse API response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            let body = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body, "transient error, will retry");
                continue;
            }

            return Err(ShopError::provider(api_error_message(status, &body)));
        }

        Err(ShopError::provider("completion request failed after retries"))
    }

    fn transport_error(&self, e: reqwest::Error) -> ShopError {
        if e.is_timeout() {
            ShopError::Timeout {
                duration: self.timeout,
            }
        } else {
            ShopError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            }
        }
    }
}

fn completions_endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

/// Builds a readable error from a non-success response body.
fn api_error_message(status: StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<ApiErrorResponse>(body).or_else(|_| {
        serde_json::from_str::<Vec<ApiErrorResponse>>(body).and_then(|mut v| {
            if v.is_empty() {
                Err(serde::de::Error::custom("empty error array"))
            } else {
                Ok(v.swap_remove(0))
            }
        })
    });
    match parsed {
        Ok(api_err) => match api_err.error.type_ {
            Some(kind) => format!("API error {status} ({kind}): {}", api_err.error.message),
            None => format!("API error {status}: {}", api_err.error.message),
        },
        Err(_) => format!("API returned {status}: {body}"),
    }
}

/// Returns true for HTTP status codes worth retrying.
fn is_transient_error(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(uri: &str, max_retries: u32) -> OpenAiClient {
        OpenAiClient::new(
            "test-api-key",
            "https://unused.invalid/",
            "gemini-2.0-flash".into(),
            Duration::from_secs(5),
            max_retries,
        )
        .unwrap()
        .with_base_url(uri)
    }

    fn test_request() -> ChatRequest {
        ChatRequest {
            model: "gemini-2.0-flash".into(),
            messages: vec![ChatMessage {
                role: "user".into(),
                content: Some("Hello".into()),
                tool_calls: vec![],
                tool_call_id: None,
            }],
            tools: vec![],
            response_format: None,
            max_tokens: Some(64),
        }
    }

    fn ok_body(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "model": "gemini-2.0-flash",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hi there"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2}
        })
    }

    #[test]
    fn transient_statuses() {
        assert!(is_transient_error(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient_error(StatusCode::BAD_GATEWAY));
        assert!(is_transient_error(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_transient_error(StatusCode::BAD_REQUEST));
        assert!(!is_transient_error(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn endpoint_joins_with_single_slash() {
        assert_eq!(
            completions_endpoint("https://example.com/v1beta/openai/"),
            "https://example.com/v1beta/openai/chat/completions"
        );
        assert_eq!(
            completions_endpoint("https://example.com/v1"),
            "https://example.com/v1/chat/completions"
        );
    }

    #[test]
    fn error_message_handles_array_envelope() {
        let body = r#"[{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}]"#;
        let msg = api_error_message(StatusCode::BAD_REQUEST, body);
        assert!(msg.contains("API key not valid"), "got: {msg}");
    }

    #[tokio::test]
    async fn complete_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("chatcmpl-1")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), 0);
        let resp = client.complete(&test_request()).await.unwrap();
        assert_eq!(resp.id, "chatcmpl-1");
        assert_eq!(resp.choices[0].message.content.as_deref(), Some("Hi there"));
    }

    #[tokio::test]
    async fn sends_bearer_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-api-key"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("chatcmpl-auth")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), 0);
        let result = client.complete(&test_request()).await;
        assert!(result.is_ok(), "headers should match: {result:?}");
    }

    #[tokio::test]
    async fn no_retry_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), 0);
        let err = client.complete(&test_request()).await.unwrap_err();
        assert!(err.is_upstream());
        assert!(err.to_string().contains("503"), "got: {err}");
    }

    #[tokio::test]
    async fn retries_transient_when_enabled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body("chatcmpl-retry")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), 1);
        let resp = client.complete(&test_request()).await.unwrap();
        assert_eq!(resp.id, "chatcmpl-retry");
    }

    #[tokio::test]
    async fn client_error_is_not_retried() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "error": {"type": "invalid_request_error", "message": "Bad model"}
        });
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), 3);
        let err = client.complete(&test_request()).await.unwrap_err().to_string();
        assert!(err.contains("invalid_request_error"), "got: {err}");
        assert!(err.contains("Bad model"), "got: {err}");
    }

    #[tokio::test]
    async fn malformed_body_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), 0);
        let err = client.complete(&test_request()).await.unwrap_err();
        assert!(err.to_string().contains("failed to parse API response"));
    }
}
