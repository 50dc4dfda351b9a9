//! Shared completion gateway for the PR review pipeline.
//!
//! Thin, non-streaming client around an Azure OpenAI-style chat completions
//! endpoint, plus the supporting pieces the review orchestrator needs:
//!
//! - [`config`] — endpoint/credential configuration, strict env constructors.
//! - [`services`] — the HTTP executor ([`services::azure_openai_service`]).
//! - [`usage`] — token-usage counters, summed per run by callers.
//! - [`error_handler`] — unified error type and env helpers.
//!
//! Design follows the rest of the workspace: no async-trait, no
//! `Box<dyn ...>`, unified errors via `thiserror`, structured `tracing` logs.

pub mod config;
pub mod error_handler;
pub mod services;
pub mod usage;

pub use config::completion_config::CompletionConfig;
pub use error_handler::{ConfigError, LlmGatewayError, Result};
pub use services::azure_openai_service::{AzureOpenAiService, Completion, CompletionOptions};
pub use usage::UsageStats;
