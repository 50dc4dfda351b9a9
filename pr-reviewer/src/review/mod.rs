//! Review orchestration.
//!
//! Flow for a change-request review:
//!   1) Size check: small diffs go out as one request with the full budget;
//!   2) Large diffs are partitioned on file boundaries (30 000-byte ceiling);
//!   3) Chunks are processed strictly sequentially under a linearly
//!      increasing pre-call delay that spreads load across the remote
//!      rate-limit window;
//!   4) Per-chunk failures are logged and skipped — partial success beats
//!      total failure, and a rate-limited chunk is never retried;
//!   5) Non-empty verdicts are consolidated into exactly one report handed
//!      to the comment sink; token usage is summed across all calls.
//!
//! Logs:
//! - `INFO`: final summary (#sections, #with feedback, usage, timing)
//! - `DEBUG`: per-chunk decisions and delays
//! - `WARN`: skipped chunks with index, size, and error context.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use llm_gateway::{AzureOpenAiService, CompletionOptions, UsageStats};

use crate::budget::{self, TokenBudget};
use crate::chunk::{DEFAULT_MAX_CHUNK_BYTES, split_diff};
use crate::errors::ReviewResult;
use crate::prompt::{self, PromptConfig};
use crate::report::{self, SectionVerdict, Verdict, classify_reply};
use crate::sink::CommentSink;

/// Diffs at or above this size are partitioned instead of sent whole.
/// Distinct from the per-chunk byte ceiling on purpose: a 40 KB diff still
/// fits one request, while a 60 KB one is cut into ≤30 KB sections.
pub const PARTITION_THRESHOLD_KB: f64 = 50.0;

/// Inter-call delay schedule for the chunk loop.
///
/// Chunk `i` waits `0` for `i = 0`, otherwise `base + i * step`. This is a
/// fixed linear spread, not an adaptive or exponential retry policy.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    /// Delay base applied from the second chunk on.
    pub base: Duration,
    /// Additional delay per chunk position.
    pub step: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(5000),
            step: Duration::from_millis(3000),
        }
    }
}

impl Pacing {
    /// No delays at all (tests, already-throttled callers).
    pub fn none() -> Self {
        Self {
            base: Duration::ZERO,
            step: Duration::ZERO,
        }
    }

    /// Delay before the call for the chunk at `position` (0-based).
    pub fn delay_for(&self, position: usize) -> Duration {
        if position == 0 {
            Duration::ZERO
        } else {
            self.base + self.step * position as u32
        }
    }
}

/// Caller-supplied knobs for one review unit.
#[derive(Debug, Clone, Default)]
pub struct ReviewOptions {
    /// Token ceiling as a raw configuration string (see [`crate::budget`]).
    pub token_max: Option<String>,
    /// Temperature as a raw configuration string.
    pub temperature: Option<String>,
    /// Instruction override / additional instruction lines.
    pub prompt: PromptConfig,
    /// Inter-call delay schedule; defaults preserve the production spread.
    pub pacing: Pacing,
}

/// Outcome of one review unit, returned to the caller.
///
/// Token usage is carried here explicitly instead of a process-global
/// accumulator; callers that review several units sum the stats themselves.
#[derive(Debug, Clone, Default)]
pub struct ReviewSummary {
    /// Sections analyzed (1 for single-shot and per-file reviews).
    pub chunk_count: usize,
    /// Sections that produced non-empty feedback.
    pub sections_with_feedback: usize,
    /// Token usage summed over all completed calls of this unit.
    pub usage: UsageStats,
    /// Whether an outcome was handed to the comment sink.
    pub posted: bool,
}

/// Reviews a whole change request, partitioning the diff when it is too
/// large for one request.
///
/// The partitioned path always posts exactly one consolidated report, even
/// when every chunk failed; the single-shot path posts only when the model
/// produced non-sentinel feedback. Request failures are logged and end the
/// unit with nothing posted, on both paths.
///
/// # Errors
/// Fails only on configuration problems (like a zero chunk count); no
/// request failure aborts the run.
pub async fn review_change_request(
    service: &AzureOpenAiService,
    diff: &str,
    pr_number: &str,
    options: &ReviewOptions,
    sink: &mut CommentSink,
) -> ReviewResult<ReviewSummary> {
    let t0 = Instant::now();

    if diff.trim().is_empty() {
        info!(pr_number, "no changes found; nothing to review");
        return Ok(ReviewSummary::default());
    }

    let diff_size_kb = diff.len() as f64 / 1024.0;
    let budget =
        TokenBudget::for_change_request(options.token_max.as_deref(), options.temperature.as_deref());
    let partitioned = diff_size_kb > PARTITION_THRESHOLD_KB;

    info!(
        pr_number,
        diff_size_kb,
        partitioned,
        max_tokens = budget.max_tokens,
        "starting change-request review"
    );

    let instructions = prompt::change_request_instructions(&options.prompt, partitioned);
    let label = report::change_request_label(pr_number);

    let summary = if partitioned {
        review_partitioned(
            service,
            diff,
            pr_number,
            diff_size_kb,
            budget,
            &instructions,
            &label,
            options.pacing,
            sink,
        )
        .await?
    } else {
        review_single_shot(
            service,
            diff,
            pr_number,
            diff_size_kb,
            budget,
            &instructions,
            &label,
            sink,
        )
        .await?
    };

    info!(
        pr_number,
        sections = summary.chunk_count,
        with_feedback = summary.sections_with_feedback,
        usage = %summary.usage,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "change-request review finished"
    );

    Ok(summary)
}

/// Single request covering the whole diff with the full token budget.
async fn review_single_shot(
    service: &AzureOpenAiService,
    diff: &str,
    pr_number: &str,
    diff_size_kb: f64,
    budget: TokenBudget,
    instructions: &str,
    label: &str,
    sink: &mut CommentSink,
) -> ReviewResult<ReviewSummary> {
    debug!(pr_number, "diff under partition threshold; single request");

    let mut summary = ReviewSummary {
        chunk_count: 1,
        ..ReviewSummary::default()
    };

    let prompt_text = prompt::whole_pr_prompt(instructions, pr_number, diff_size_kb, diff);
    let result = service
        .complete(
            &prompt_text,
            CompletionOptions {
                max_tokens: budget.max_tokens,
                temperature: budget.temperature,
            },
            Duration::ZERO,
        )
        .await;

    // Same tolerance as the partitioned path: a failed request ends the
    // unit with nothing posted instead of aborting the run.
    let completion = match result {
        Ok(completion) => completion,
        Err(err) => {
            warn!(
                pr_number,
                diff_size_kb,
                error = %err,
                "change-request review failed; nothing posted"
            );
            return Ok(summary);
        }
    };
    summary.usage.add(completion.usage);

    match completion.reply.as_deref().map(|r| classify_reply(r, false)) {
        Some(Verdict::Feedback(text)) => {
            sink.post(label, &text);
            summary.sections_with_feedback = 1;
            summary.posted = true;
        }
        Some(Verdict::NoFeedback) | None => {
            info!(pr_number, "no feedback for the change request");
        }
    }

    Ok(summary)
}

/// Sequential chunk loop: one request per chunk under the pacing schedule,
/// tolerating individual failures, ending with one consolidated report.
async fn review_partitioned(
    service: &AzureOpenAiService,
    diff: &str,
    pr_number: &str,
    diff_size_kb: f64,
    budget: TokenBudget,
    instructions: &str,
    label: &str,
    pacing: Pacing,
    sink: &mut CommentSink,
) -> ReviewResult<ReviewSummary> {
    let chunks = split_diff(diff, DEFAULT_MAX_CHUNK_BYTES);
    let total = chunks.len();
    let per_chunk = budget::allocate(budget, total)?;

    info!(
        pr_number,
        chunks = total,
        per_chunk_tokens = per_chunk.max_tokens,
        "diff too large; partitioned into sections"
    );

    let mut verdicts: Vec<SectionVerdict> = Vec::new();
    let mut usage = UsageStats::default();

    for (position, chunk) in chunks.iter().enumerate() {
        let chunk_size_kb = chunk.len() as f64 / 1024.0;
        let delay = pacing.delay_for(position);
        debug!(
            position = position + 1,
            total,
            chunk_size_kb,
            delay_ms = delay.as_millis() as u64,
            "processing section"
        );

        let prompt_text = prompt::chunk_prompt(
            instructions,
            pr_number,
            position,
            total,
            chunk_size_kb,
            diff_size_kb,
            chunk,
        );

        let result = service
            .complete(
                &prompt_text,
                CompletionOptions {
                    max_tokens: per_chunk.max_tokens,
                    temperature: per_chunk.temperature,
                },
                delay,
            )
            .await;

        match result {
            Ok(completion) => {
                usage.add(completion.usage);
                if let Some(reply) = completion.reply.as_deref() {
                    if let Verdict::Feedback(text) = classify_reply(reply, true) {
                        verdicts.push(SectionVerdict {
                            position,
                            total,
                            text,
                        });
                    }
                }
                debug!(position = position + 1, total, "section processed");
            }
            Err(err) if err.is_rate_limited() => {
                // At-most-once per chunk: skip, never retry.
                warn!(
                    position = position + 1,
                    total,
                    chunk_size_kb,
                    error = %err,
                    "rate limited; skipping section"
                );
            }
            Err(err) => {
                warn!(
                    position = position + 1,
                    total,
                    chunk_size_kb,
                    error = %err,
                    "section failed; continuing with the rest"
                );
            }
        }
    }

    let with_feedback = verdicts.len();
    let body = report::aggregate(pr_number, diff_size_kb, total, verdicts);
    sink.post(label, &body);

    Ok(ReviewSummary {
        chunk_count: total,
        sections_with_feedback: with_feedback,
        usage,
        posted: true,
    })
}

/// Reviews a single file diff: one request, no delay, no chunking.
///
/// A reply matching the no-feedback sentinel produces no comment.
///
/// # Errors
/// Request failures propagate to the caller, which typically logs them and
/// moves on to the next file.
pub async fn review_file(
    service: &AzureOpenAiService,
    diff: &str,
    file_name: &str,
    options: &ReviewOptions,
    sink: &mut CommentSink,
) -> ReviewResult<ReviewSummary> {
    info!(file_name, "starting file review");

    let budget =
        TokenBudget::for_file_review(options.token_max.as_deref(), options.temperature.as_deref());
    let instructions = prompt::file_review_instructions(&options.prompt);
    let prompt_text = prompt::file_prompt(&instructions, diff);

    let completion = service
        .complete(
            &prompt_text,
            CompletionOptions {
                max_tokens: budget.max_tokens,
                temperature: budget.temperature,
            },
            Duration::ZERO,
        )
        .await?;

    let mut summary = ReviewSummary {
        chunk_count: 1,
        ..ReviewSummary::default()
    };
    summary.usage.add(completion.usage);

    match completion.reply.as_deref().map(|r| classify_reply(r, false)) {
        Some(Verdict::Feedback(text)) => {
            sink.post(file_name, &text);
            summary.sections_with_feedback = 1;
            summary.posted = true;
        }
        Some(Verdict::NoFeedback) | None => {
            info!(file_name, "no feedback for this file");
        }
    }

    info!(file_name, usage = %summary.usage, "file review finished");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pacing_matches_the_linear_schedule() {
        let pacing = Pacing::default();
        assert_eq!(pacing.delay_for(0), Duration::ZERO);
        assert_eq!(pacing.delay_for(1), Duration::from_millis(8000));
        assert_eq!(pacing.delay_for(2), Duration::from_millis(11000));
        assert_eq!(pacing.delay_for(3), Duration::from_millis(14000));
    }

    #[test]
    fn zero_pacing_never_waits() {
        let pacing = Pacing::none();
        for i in 0..5 {
            assert_eq!(pacing.delay_for(i), Duration::ZERO);
        }
    }
}
