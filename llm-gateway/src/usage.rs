//! Token-usage accounting.
//!
//! The remote service reports per-call token consumption in a `usage` object.
//! Counters are summed by addition across calls and never reset mid-run.
//! There is intentionally no global accumulator: each completed call returns
//! its own [`UsageStats`], and callers that want cumulative totals own and
//! thread an accumulator explicitly.

use serde::Deserialize;

/// Token counters reported by the completion service for one call, or summed
/// across many calls by the owner of an accumulator.
///
/// All fields default to zero so a partial or absent `usage` object degrades
/// to "nothing consumed" rather than an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct UsageStats {
    /// Tokens generated by the model.
    #[serde(default)]
    pub completion_tokens: u64,

    /// Tokens consumed by the prompt.
    #[serde(default)]
    pub prompt_tokens: u64,

    /// Total tokens for the call.
    #[serde(default)]
    pub total_tokens: u64,
}

impl UsageStats {
    /// Adds another measurement into this accumulator.
    pub fn add(&mut self, other: UsageStats) {
        self.completion_tokens += other.completion_tokens;
        self.prompt_tokens += other.prompt_tokens;
        self.total_tokens += other.total_tokens;
    }

    /// True when no tokens were recorded.
    pub fn is_zero(&self) -> bool {
        *self == UsageStats::default()
    }
}

impl std::fmt::Display for UsageStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "completions={} prompts={} total={}",
            self.completion_tokens, self.prompt_tokens, self.total_tokens
        )
    }
}
