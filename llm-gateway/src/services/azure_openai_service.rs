//! Azure OpenAI completion service.
//!
//! Minimal, non-streaming client around an Azure OpenAI-style chat
//! completions endpoint. The full endpoint URL comes from
//! [`CompletionConfig::endpoint`]; authentication uses the `api-key` header.
//!
//! Constructor validation:
//! - `cfg.endpoint` must start with http:// or https://
//! - `cfg.api_key` must be non-empty
//!
//! Request pacing: every call accepts an explicit pre-call delay. This is a
//! self-imposed throttle chosen by the caller, not a reactive retry-after —
//! the 429 payload is carried opaquely and never parsed for timing hints.
//! The service never retries; on `RateLimited` the caller decides whether to
//! skip the unit of work.
//!
//! Errors are normalized via the unified types in `error_handler`.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    config::completion_config::CompletionConfig,
    error_handler::{ConfigError, LlmGatewayError, make_snippet, validate_http_endpoint},
    usage::UsageStats,
};

/// Per-call generation parameters.
///
/// Already validated/clamped by the caller (the review orchestrator derives
/// them from the configured token budget).
#[derive(Debug, Clone, Copy)]
pub struct CompletionOptions {
    /// Maximum number of tokens the model may generate.
    pub max_tokens: u32,
    /// Sampling temperature, `0.0..=2.0`.
    pub temperature: f32,
}

/// Outcome of one successful completion call.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Model reply, if any. `None` when the service returned no choices —
    /// a valid "no feedback produced" outcome, not an error.
    pub reply: Option<String>,
    /// Token consumption reported for this call; zeros when the `usage`
    /// object was absent or malformed.
    pub usage: UsageStats,
}

/// Thin client for an Azure OpenAI-style completions endpoint.
///
/// Constructed from a complete [`CompletionConfig`]. Internally keeps a
/// preconfigured `reqwest::Client` (with timeout and default headers).
#[derive(Debug)]
pub struct AzureOpenAiService {
    client: reqwest::Client,
    url: String,
}

impl AzureOpenAiService {
    /// Creates a new [`AzureOpenAiService`] from the given config.
    ///
    /// Validates the endpoint scheme and the API key, then builds an HTTP
    /// client with default headers and a configurable timeout.
    ///
    /// # Errors
    /// - [`LlmGatewayError::Config`] with `InvalidEndpoint` if `cfg.endpoint` is invalid
    /// - [`LlmGatewayError::Config`] with `MissingApiKey` if `cfg.api_key` is empty
    /// - [`LlmGatewayError::Transport`] if the HTTP client cannot be built
    pub fn new(cfg: CompletionConfig) -> Result<Self, LlmGatewayError> {
        validate_http_endpoint(&cfg.endpoint)?;

        if cfg.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey.into());
        }

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "api-key",
            header::HeaderValue::from_str(&cfg.api_key)
                .map_err(|_| LlmGatewayError::from(ConfigError::InvalidApiKey))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let url = cfg.endpoint.trim().to_string();

        info!(
            endpoint = %url,
            timeout_secs = cfg.timeout_secs.unwrap_or(60),
            "AzureOpenAiService initialized"
        );

        Ok(Self { client, url })
    }

    /// Performs one **non-streaming** chat completion request.
    ///
    /// Sleeps `delay` before issuing the call (self-imposed throttle used by
    /// the chunk loop to spread load across a rate-limited window), then
    /// POSTs `{max_tokens, temperature, messages:[{role:"user", content}]}`.
    ///
    /// # Errors
    /// - [`LlmGatewayError::RateLimited`] on HTTP 429, carrying the raw body
    /// - [`LlmGatewayError::HttpStatus`] for any other non-2xx response
    /// - [`LlmGatewayError::Transport`] for network failures or an unreadable body
    /// - [`LlmGatewayError::InvalidResponse`] when `choices` has an unexpected shape
    ///
    /// An empty or absent `choices` array is **not** an error: it yields
    /// `Completion { reply: None, .. }`. Likewise a malformed `usage` object
    /// only degrades the returned counters to zero.
    pub async fn complete(
        &self,
        prompt: &str,
        options: CompletionOptions,
        delay: Duration,
    ) -> Result<Completion, LlmGatewayError> {
        if !delay.is_zero() {
            debug!(delay_ms = delay.as_millis() as u64, "throttling before request");
            tokio::time::sleep(delay).await;
        }

        let started = Instant::now();
        let body = ChatCompletionRequest {
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!(
            prompt_len = prompt.len(),
            max_tokens = options.max_tokens,
            temperature = options.temperature,
            "POST {}", self.url
        );

        let resp = self.client.post(&self.url).json(&body).send().await?;
        let status = resp.status();
        debug!(%status, latency_ms = started.elapsed().as_millis() as u64, "response status");

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let payload = resp.text().await.unwrap_or_default();
            warn!(
                %status,
                url = %self.url,
                payload = %make_snippet(&payload),
                "completion endpoint rate limited the request"
            );
            return Err(LlmGatewayError::RateLimited { payload });
        }

        if !status.is_success() {
            let url = self.url.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                latency_ms = started.elapsed().as_millis() as u64,
                "completion endpoint returned non-success status"
            );

            return Err(LlmGatewayError::HttpStatus {
                status,
                url,
                snippet,
            });
        }

        let raw: serde_json::Value = resp.json().await?;

        // Choices are extracted strictly; usage tolerantly. A response with
        // no choices at all is a valid "no feedback" outcome.
        let reply = extract_reply(&raw)?;
        let usage = extract_usage(&raw);

        info!(
            latency_ms = started.elapsed().as_millis() as u64,
            has_reply = reply.is_some(),
            %usage,
            "chat completion completed"
        );

        Ok(Completion { reply, usage })
    }
}

/// Pulls `choices[0].message.content` out of the response body.
///
/// Absent or empty `choices` → `Ok(None)`. Present-but-malformed `choices`
/// → [`LlmGatewayError::InvalidResponse`].
fn extract_reply(raw: &serde_json::Value) -> Result<Option<String>, LlmGatewayError> {
    let choices = match raw.get("choices") {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(v) => v,
    };

    let parsed: Vec<ChatChoice> = serde_json::from_value(choices.clone()).map_err(|e| {
        LlmGatewayError::InvalidResponse(format!(
            "serde error: {e}; expected `choices[0].message.content`"
        ))
    })?;

    Ok(parsed.into_iter().find_map(|c| c.message.content))
}

/// Pulls the `usage` object out of the response body.
///
/// Extraction failures are logged and degrade to zeros; they never affect
/// whether the completion itself is considered successful.
fn extract_usage(raw: &serde_json::Value) -> UsageStats {
    match raw.get("usage") {
        None => UsageStats::default(),
        Some(v) => match serde_json::from_value::<UsageStats>(v.clone()) {
            Ok(u) => u,
            Err(e) => {
                warn!(error = %e, "failed to decode `usage` object; counting zero tokens");
                UsageStats::default()
            }
        },
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

/// Request body for the chat completions endpoint (non-streaming).
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

/// Chat message for the completions API.
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn service_for(url: &str) -> AzureOpenAiService {
        AzureOpenAiService::new(CompletionConfig {
            endpoint: url.to_string(),
            api_key: "test-key".to_string(),
            timeout_secs: Some(5),
        })
        .expect("service")
    }

    const OPTS: CompletionOptions = CompletionOptions {
        max_tokens: 100,
        temperature: 0.0,
    };

    #[tokio::test]
    async fn successful_completion_parses_reply_and_usage() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("api-key", "test-key")
            .with_status(200)
            .with_body(
                r#"{"choices":[{"message":{"content":"Revisar el manejo de errores."}}],
                    "usage":{"completion_tokens":10,"prompt_tokens":20,"total_tokens":30}}"#,
            )
            .create_async()
            .await;

        let svc = service_for(&server.url());
        let out = svc
            .complete("hola", OPTS, Duration::ZERO)
            .await
            .expect("completion");

        assert_eq!(out.reply.as_deref(), Some("Revisar el manejo de errores."));
        assert_eq!(out.usage.total_tokens, 30);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_choices_is_no_feedback_not_an_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let svc = service_for(&server.url());
        let out = svc.complete("hola", OPTS, Duration::ZERO).await.unwrap();

        assert!(out.reply.is_none());
        assert!(out.usage.is_zero());
    }

    #[tokio::test]
    async fn http_429_maps_to_rate_limited_with_raw_payload() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(429)
            .with_body(r#"{"error":{"code":"429","message":"busy"}}"#)
            .create_async()
            .await;

        let svc = service_for(&server.url());
        let err = svc.complete("hola", OPTS, Duration::ZERO).await.unwrap_err();

        match err {
            LlmGatewayError::RateLimited { payload } => assert!(payload.contains("busy")),
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_success_status_maps_to_http_status() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let svc = service_for(&server.url());
        let err = svc.complete("hola", OPTS, Duration::ZERO).await.unwrap_err();

        match err {
            LlmGatewayError::HttpStatus { status, .. } => assert_eq!(status.as_u16(), 500),
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_choices_shape_is_invalid_response() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"choices":[{"unexpected":true}]}"#)
            .create_async()
            .await;

        let svc = service_for(&server.url());
        let err = svc.complete("hola", OPTS, Duration::ZERO).await.unwrap_err();

        assert!(matches!(err, LlmGatewayError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn malformed_usage_degrades_to_zero_without_failing() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(
                r#"{"choices":[{"message":{"content":"ok"}}],"usage":"not-an-object"}"#,
            )
            .create_async()
            .await;

        let svc = service_for(&server.url());
        let out = svc.complete("hola", OPTS, Duration::ZERO).await.unwrap();

        assert_eq!(out.reply.as_deref(), Some("ok"));
        assert!(out.usage.is_zero());
    }

    #[test]
    fn constructor_rejects_bad_config() {
        let bad_endpoint = AzureOpenAiService::new(CompletionConfig {
            endpoint: "not-a-url".into(),
            api_key: "k".into(),
            timeout_secs: None,
        });
        assert!(bad_endpoint.is_err());

        let no_key = AzureOpenAiService::new(CompletionConfig {
            endpoint: "https://example.com".into(),
            api_key: "  ".into(),
            timeout_secs: None,
        });
        assert!(no_key.is_err());
    }
}
