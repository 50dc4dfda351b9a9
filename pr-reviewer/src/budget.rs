//! Token budget parsing, clamping, and per-chunk allocation.
//!
//! The token ceiling and temperature arrive as raw configuration strings.
//! Out-of-range or unparsable values reset to safe defaults (logged) so the
//! review proceeds instead of aborting over a knob typo.

use tracing::warn;

use crate::errors::{ConfigError, ReviewResult};

/// Default token ceiling for a single-file review.
pub const DEFAULT_FILE_MAX_TOKENS: u32 = 100;

/// Default token ceiling for a whole change-request review.
pub const DEFAULT_CR_MAX_TOKENS: u32 = 500;

/// Fixed per-chunk floor added on top of the divided budget so every chunk
/// keeps a minimally useful response allowance even under division.
pub const FLOOR_BONUS: u32 = 100;

/// Validated total budget for one review unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenBudget {
    /// Maximum tokens the model may generate across the unit.
    pub max_tokens: u32,
    /// Sampling temperature, already clamped to `0.0..=2.0`.
    pub temperature: f32,
}

impl TokenBudget {
    /// Budget for the per-file review path (default ceiling 100).
    pub fn for_file_review(token_max: Option<&str>, temperature: Option<&str>) -> Self {
        Self::parse(token_max, temperature, DEFAULT_FILE_MAX_TOKENS)
    }

    /// Budget for the whole-change-request review path (default ceiling 500).
    pub fn for_change_request(token_max: Option<&str>, temperature: Option<&str>) -> Self {
        Self::parse(token_max, temperature, DEFAULT_CR_MAX_TOKENS)
    }

    fn parse(token_max: Option<&str>, temperature: Option<&str>, default_max: u32) -> Self {
        let max_tokens = match token_max.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => match raw.parse::<u32>() {
                Ok(v) => v,
                Err(_) => {
                    warn!(raw, default_max, "token ceiling unparsable; using default");
                    default_max
                }
            },
            None => {
                warn!(default_max, "token ceiling not configured; using default");
                default_max
            }
        };

        let temperature = match temperature.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => match raw.parse::<f32>() {
                Ok(v) if (0.0..=2.0).contains(&v) => v,
                _ => {
                    warn!(raw, "temperature outside [0,2] or unparsable; using 0");
                    0.0
                }
            },
            None => 0.0,
        };

        TokenBudget {
            max_tokens,
            temperature,
        }
    }
}

/// Per-chunk allowance derived from a [`TokenBudget`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerChunkBudget {
    /// Tokens each chunk request may generate.
    pub max_tokens: u32,
    /// Temperature, copied unchanged from the total budget.
    pub temperature: f32,
}

/// Divides `total.max_tokens` across `chunk_count` chunks, adding
/// [`FLOOR_BONUS`] so small per-chunk allowances still permit a minimally
/// useful response.
///
/// # Errors
/// [`ConfigError::ZeroChunkCount`] when `chunk_count == 0` — reported,
/// never silently divided.
pub fn allocate(total: TokenBudget, chunk_count: usize) -> ReviewResult<PerChunkBudget> {
    if chunk_count == 0 {
        return Err(ConfigError::ZeroChunkCount.into());
    }
    Ok(PerChunkBudget {
        max_tokens: total.max_tokens / chunk_count as u32 + FLOOR_BONUS,
        temperature: total.temperature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_knobs_are_absent_or_empty() {
        let b = TokenBudget::for_file_review(None, None);
        assert_eq!(b.max_tokens, 100);
        assert_eq!(b.temperature, 0.0);

        let b = TokenBudget::for_change_request(Some(""), Some("  "));
        assert_eq!(b.max_tokens, 500);
        assert_eq!(b.temperature, 0.0);
    }

    #[test]
    fn valid_knobs_are_honored() {
        let b = TokenBudget::for_change_request(Some("800"), Some("1.5"));
        assert_eq!(b.max_tokens, 800);
        assert_eq!(b.temperature, 1.5);
    }

    #[test]
    fn out_of_range_temperature_resets_to_zero() {
        assert_eq!(
            TokenBudget::for_file_review(Some("100"), Some("2.5")).temperature,
            0.0
        );
        assert_eq!(
            TokenBudget::for_file_review(Some("100"), Some("-0.1")).temperature,
            0.0
        );
        assert_eq!(
            TokenBudget::for_file_review(Some("100"), Some("warm")).temperature,
            0.0
        );
    }

    #[test]
    fn unparsable_token_ceiling_resets_to_default() {
        assert_eq!(
            TokenBudget::for_change_request(Some("many"), None).max_tokens,
            500
        );
    }

    #[test]
    fn allocation_divides_and_adds_the_floor() {
        let total = TokenBudget {
            max_tokens: 500,
            temperature: 0.7,
        };
        let per = allocate(total, 5).unwrap();
        assert_eq!(per.max_tokens, 200);
        assert_eq!(per.temperature, 0.7);
    }

    #[test]
    fn allocation_never_drops_below_the_floor() {
        let total = TokenBudget {
            max_tokens: 3,
            temperature: 0.0,
        };
        for n in 1..=10 {
            assert!(allocate(total, n).unwrap().max_tokens >= FLOOR_BONUS);
        }
    }

    #[test]
    fn zero_chunk_count_is_an_error() {
        let total = TokenBudget {
            max_tokens: 500,
            temperature: 0.0,
        };
        assert!(allocate(total, 0).is_err());
    }
}
