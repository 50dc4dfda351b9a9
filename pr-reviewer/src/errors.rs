//! Crate-wide error hierarchy for pr-reviewer.
//!
//! Goals:
//! - Single root `Error` for all public functions.
//! - Gateway failures (rate limit, transport, invalid response) flow through
//!   unchanged so the orchestrator can match on them per chunk.
//! - No dynamic dispatch, ergonomic `?` via `From` impls.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type ReviewResult<T> = Result<T, Error>;

/// Root error type for the pr-reviewer crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Completion gateway failure (rate limited, transport, bad payload).
    #[error(transparent)]
    Gateway(#[from] llm_gateway::LlmGatewayError),

    /// Configuration problems detected before or during orchestration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// True when the underlying failure is the remote service's rate limit.
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            Error::Gateway(llm_gateway::LlmGatewayError::RateLimited { .. })
        )
    }
}

/// Configuration and setup errors local to the review pipeline.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The budget allocator was asked to divide across zero chunks.
    #[error("chunk count must be at least 1")]
    ZeroChunkCount,
}
