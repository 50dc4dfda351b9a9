//! Diff partitioning and resilient review orchestration.
//!
//! Sends a unified diff to a remote completion service and turns the
//! response into review comments, staying correct when the diff is too
//! large for one request:
//!
//! 1) **Chunking** — [`chunk`] splits the diff into bounded-size sections
//!    aligned on file boundaries, never cutting inside a file's block.
//! 2) **Budgeting** — [`budget`] validates the configured token ceiling and
//!    divides it across sections with a fixed per-section floor.
//! 3) **Orchestration** — [`review`] decides single-shot vs. partitioned,
//!    drives one request per section sequentially under a linear delay
//!    schedule, and tolerates per-section failures (a rate-limited section
//!    is skipped, not retried).
//! 4) **Consolidation** — [`report`] merges the non-empty verdicts into one
//!    report (or a fixed "no issues" report) handed exactly once to the
//!    [`sink`] boundary; token usage is summed and returned to the caller.
//!
//! The prompt texts and their "no feedback" sentinel phrases are an external
//! contract, kept bit-exact in [`prompt`]. Every run is stateless; nothing
//! persists across reviews. No async-trait and no heap trait objects — plain
//! `async fn` and enum dispatch over the thin gateway client.

pub mod budget;
pub mod chunk;
pub mod errors;
pub mod prompt;
pub mod report;
pub mod review;
pub mod sink;

pub use errors::{Error, ReviewResult};
pub use review::{
    Pacing, ReviewOptions, ReviewSummary, review_change_request, review_file,
};
pub use sink::{CommentSink, PostedComment};
