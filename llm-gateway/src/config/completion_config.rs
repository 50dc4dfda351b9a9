//! Completion endpoint configuration loaded strictly from environment
//! variables.
//!
//! # Environment variables
//!
//! - `AOI_ENDPOINT`     = full completion endpoint URL (mandatory)
//! - `AOI_API_KEY`      = credential sent in the `api-key` header (mandatory)
//! - `AOI_TIMEOUT_SECS` = optional request timeout in seconds (u64)
//!
//! Missing endpoint or credential is a fatal configuration error and is
//! surfaced before any request is attempted.

use crate::error_handler::{LlmGatewayError, env_opt_u64, must_env, validate_http_endpoint};

/// Configuration for the remote completion service.
///
/// # Fields
///
/// - `endpoint`: Full URL the chat completion request is POSTed to.
/// - `api_key`: Credential for the `api-key` request header.
/// - `timeout_secs`: Optional request timeout in seconds.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Completion endpoint URL (must start with `http://` or `https://`).
    pub endpoint: String,

    /// Credential sent as the `api-key` header value.
    pub api_key: String,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl CompletionConfig {
    /// Constructs a config strictly from environment variables.
    ///
    /// # Errors
    /// - [`ConfigError::MissingVar`](crate::error_handler::ConfigError::MissingVar)
    ///   if `AOI_ENDPOINT` or `AOI_API_KEY` is absent/empty
    /// - [`ConfigError::InvalidEndpoint`](crate::error_handler::ConfigError::InvalidEndpoint)
    ///   if the endpoint lacks an http/https scheme
    /// - [`ConfigError::InvalidNumber`](crate::error_handler::ConfigError::InvalidNumber)
    ///   if `AOI_TIMEOUT_SECS` is set but not a valid `u64`
    pub fn from_env() -> Result<Self, LlmGatewayError> {
        let endpoint = must_env("AOI_ENDPOINT")?;
        validate_http_endpoint(&endpoint)?;
        let api_key = must_env("AOI_API_KEY")?;
        let timeout_secs = env_opt_u64("AOI_TIMEOUT_SECS")?;

        Ok(Self {
            endpoint,
            api_key,
            timeout_secs,
        })
    }
}
