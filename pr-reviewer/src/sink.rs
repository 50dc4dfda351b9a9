//! Comment-posting boundary.
//!
//! Posting/updating comments on a hosted pull request is an external
//! collaborator; the core only guarantees it hands over exactly one
//! `(label, body)` outcome per review unit. Enum dispatch, no trait objects.

use tracing::info;

/// One comment handed to the external sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedComment {
    /// Comment label (file name or consolidated-report title).
    pub label: String,
    /// Markdown body.
    pub body: String,
}

/// Destination for completed review outcomes.
#[derive(Debug)]
pub enum CommentSink {
    /// Log what would be posted without calling any provider.
    DryRun,
    /// Capture comments in memory (tests, embedding callers).
    Memory(Vec<PostedComment>),
}

impl CommentSink {
    /// Hands one review outcome to the sink.
    ///
    /// Callers invoke this at most once per review unit with a given label.
    pub fn post(&mut self, label: &str, body: &str) {
        match self {
            CommentSink::DryRun => {
                info!(label, body_len = body.len(), "dry-run: review comment ready");
            }
            CommentSink::Memory(posted) => {
                posted.push(PostedComment {
                    label: label.to_string(),
                    body: body.to_string(),
                });
            }
        }
    }

    /// Comments captured so far (empty for [`CommentSink::DryRun`]).
    pub fn posted(&self) -> &[PostedComment] {
        match self {
            CommentSink::DryRun => &[],
            CommentSink::Memory(posted) => posted,
        }
    }
}
