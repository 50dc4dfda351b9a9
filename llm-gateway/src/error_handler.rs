//! Unified error handling for `llm-gateway`.
//!
//! This module exposes a single top-level error type [`LlmGatewayError`] for
//! the whole crate, groups configuration errors in a nested enum
//! ([`ConfigError`]), and provides small helpers for reading/validating
//! environment variables that return the unified [`Result<T>`] alias.
//!
//! All messages include the suffix `[LLM Gateway]` to simplify attribution in
//! logs.

use reqwest::StatusCode;
use thiserror::Error;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, LlmGatewayError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `llm-gateway` crate.
///
/// The first four variants form the request-failure taxonomy consumed by the
/// review orchestrator:
///
/// - [`LlmGatewayError::RateLimited`] — HTTP 429; the raw payload is carried
///   for logging but never parsed. The gateway does not retry; the caller
///   decides whether to skip the unit of work.
/// - [`LlmGatewayError::HttpStatus`] — any other non-2xx status.
/// - [`LlmGatewayError::Transport`] — network/IO failure or unreadable body.
/// - [`LlmGatewayError::InvalidResponse`] — 2xx body without the expected
///   completion-choice structure.
///
/// Configuration problems are fatal and surface before any request is made.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LlmGatewayError {
    /// Configuration/validation errors (startup/readiness).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The completion endpoint answered HTTP 429.
    #[error("[LLM Gateway] rate limited by completion endpoint: {payload}")]
    RateLimited {
        /// Raw response body, opaque; logged, never parsed for retry hints.
        payload: String,
    },

    /// Upstream returned a non-successful HTTP status other than 429.
    #[error("[LLM Gateway] HTTP {status} from {url}: {snippet}")]
    HttpStatus {
        /// Numeric HTTP status code.
        status: StatusCode,
        /// Request URL.
        url: String,
        /// Short snippet of the response body (trimmed).
        snippet: String,
    },

    /// Underlying HTTP transport error (e.g., `reqwest::Error`).
    #[error("[LLM Gateway] transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response payload lacked the expected completion-choice structure.
    #[error("[LLM Gateway] invalid completion response: {0}")]
    InvalidResponse(String),
}

impl LlmGatewayError {
    /// True when the failure is the remote service's rate limit.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LlmGatewayError::RateLimited { .. })
    }
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
///
/// Keep this focused: only errors that realistically happen at config
/// load/validation time.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("[LLM Gateway] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (like timeouts).
    #[error("[LLM Gateway] invalid number in {var}: {reason}")]
    InvalidNumber {
        /// Variable name (e.g., `AOI_TIMEOUT_SECS`).
        var: &'static str,
        /// Human-readable reason (e.g., `expected u64`).
        reason: &'static str,
    },

    /// API key was missing or empty.
    #[error("[LLM Gateway] missing api key")]
    MissingApiKey,

    /// API key contained characters that cannot form a header value.
    #[error("[LLM Gateway] api key is not a valid header value")]
    InvalidApiKey,

    /// Endpoint was empty or does not start with http/https.
    #[error("[LLM Gateway] invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Fetches a required, non-empty environment variable.
///
/// # Errors
/// Returns [`LlmGatewayError::Config`] with [`ConfigError::MissingVar`] if
/// the variable is absent or empty.
pub fn must_env(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Parses an optional `u64` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`LlmGatewayError::Config`] with [`ConfigError::InvalidNumber`]
/// if the variable is set but not a valid `u64`.
pub fn env_opt_u64(name: &'static str) -> Result<Option<u64>> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v.parse::<u64>().map(Some).map_err(|_| {
            LlmGatewayError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        }),
        _ => Ok(None),
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers                                                        */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
///
/// # Errors
/// Returns [`LlmGatewayError::Config`] with [`ConfigError::InvalidEndpoint`]
/// when the string does not start with a valid HTTP scheme.
pub fn validate_http_endpoint(value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidEndpoint(value.to_string()).into())
    }
}

/// Builds a short, single-line snippet of a response body for logs.
///
/// Collapses whitespace and truncates to a bounded length so error payloads
/// never flood log lines.
pub fn make_snippet(body: &str) -> String {
    const MAX: usize = 240;
    let collapsed: String = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX {
        collapsed
    } else {
        collapsed.chars().take(MAX).collect::<String>() + "…"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_collapses_and_truncates() {
        assert_eq!(make_snippet("a  b\n c"), "a b c");
        let long = "x".repeat(1000);
        let snip = make_snippet(&long);
        assert!(snip.chars().count() <= 241);
        assert!(snip.ends_with('…'));
    }

    #[test]
    fn endpoint_validation() {
        assert!(validate_http_endpoint("https://api.example.com").is_ok());
        assert!(validate_http_endpoint("http://localhost:8080").is_ok());
        assert!(validate_http_endpoint("ftp://nope").is_err());
        assert!(validate_http_endpoint("").is_err());
    }
}
