//! File-boundary-respecting diff chunking.
//!
//! A unified diff is treated as an opaque text blob structurally delimited by
//! per-file markers (`diff --git` line prefix). Chunking packs whole file
//! blocks into size-bounded chunks and never splits inside a block: a single
//! block that alone exceeds the ceiling is emitted as one oversized chunk,
//! trading the strict size bound for structural integrity.
//!
//! Pure functions, no side effects: output order equals input order and
//! re-running on identical input yields identical chunks.

use tracing::debug;

/// Line prefix that starts a new file's block inside a unified diff.
pub const FILE_MARKER: &str = "diff --git";

/// Default per-chunk byte ceiling used by the partitioned review path.
pub const DEFAULT_MAX_CHUNK_BYTES: usize = 30_000;

/// Splits a diff into whole file blocks.
///
/// A block begins at a [`FILE_MARKER`] line and runs until the next marker or
/// end of input. Content before the first marker (or a diff with no markers
/// at all) forms a leading block of its own. Line terminators are preserved
/// so byte accounting stays exact.
fn file_blocks(diff: &str) -> Vec<String> {
    let mut blocks: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in diff.split_inclusive('\n') {
        if line.starts_with(FILE_MARKER) && !current.is_empty() {
            blocks.push(std::mem::take(&mut current));
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// Splits `diff` into ordered chunks of at most `max_chunk_bytes` bytes,
/// aligned on file boundaries.
///
/// Packing is greedy: file blocks are appended to the in-progress chunk
/// until the next block would push it past the ceiling, at which point the
/// chunk is closed and the next block starts a new one. A block whose own
/// size already exceeds the ceiling becomes a chunk by itself, unsplit.
///
/// Emitted chunks are trimmed; concatenating them reconstructs the diff
/// content in order, modulo whitespace at chunk boundaries.
///
/// Edge cases: an empty (or whitespace-only) diff yields no chunks; a diff
/// without any marker yields one chunk containing the whole text.
pub fn split_diff(diff: &str, max_chunk_bytes: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for block in file_blocks(diff) {
        if !current.is_empty() && current.len() + block.len() > max_chunk_bytes {
            push_trimmed(&mut chunks, &current);
            current.clear();
        }
        current.push_str(&block);
    }
    push_trimmed(&mut chunks, &current);

    debug!(
        chunks = chunks.len(),
        max_chunk_bytes,
        diff_bytes = diff.len(),
        "diff split into chunks"
    );
    chunks
}

fn push_trimmed(chunks: &mut Vec<String>, chunk: &str) {
    let trimmed = chunk.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(name: &str, body_lines: usize) -> String {
        let mut s = format!("diff --git a/{name} b/{name}\n");
        for i in 0..body_lines {
            s.push_str(&format!("+line {i} of {name}\n"));
        }
        s
    }

    #[test]
    fn empty_diff_yields_no_chunks() {
        assert!(split_diff("", 1000).is_empty());
        assert!(split_diff("   \n\n", 1000).is_empty());
    }

    #[test]
    fn diff_without_markers_is_one_chunk() {
        let text = "just some text\nwith no markers\n";
        let chunks = split_diff(text, 5);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], text.trim());
    }

    #[test]
    fn packs_whole_blocks_under_the_ceiling() {
        let a = block("a.rs", 3);
        let b = block("b.rs", 3);
        let diff = format!("{a}{b}");

        // Both fit together.
        let chunks = split_diff(&diff, diff.len());
        assert_eq!(chunks.len(), 1);

        // Ceiling forces one block per chunk.
        let chunks = split_diff(&diff, a.len());
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].starts_with("diff --git a/a.rs"));
        assert!(chunks[1].starts_with("diff --git a/b.rs"));
    }

    #[test]
    fn content_is_preserved_in_order() {
        let diff = format!("{}{}{}", block("a.rs", 5), block("b.rs", 2), block("c.rs", 8));
        let chunks = split_diff(&diff, 120);

        let rejoined = chunks.join("\n");
        // Every original non-empty line survives, in order.
        let original: Vec<&str> = diff.lines().filter(|l| !l.trim().is_empty()).collect();
        let restored: Vec<&str> = rejoined.lines().filter(|l| !l.trim().is_empty()).collect();
        assert_eq!(original, restored);
    }

    #[test]
    fn size_bound_holds_except_for_oversized_single_blocks() {
        let small = block("small.rs", 2);
        let huge = block("huge.rs", 200);
        let diff = format!("{small}{huge}{small}");
        let ceiling = 300;
        assert!(huge.len() > ceiling);

        let chunks = split_diff(&diff, ceiling);
        for chunk in &chunks {
            let within = chunk.len() <= ceiling;
            let is_single_oversized_block =
                chunk.matches(FILE_MARKER).count() == 1 && chunk.len() > ceiling;
            assert!(within || is_single_oversized_block, "chunk violates bound");
        }
        // The huge block came through unsplit.
        assert!(chunks.iter().any(|c| c.starts_with("diff --git a/huge.rs")));
    }

    #[test]
    fn splitting_is_idempotent_on_chunk_boundaries() {
        let diff = format!("{}{}{}", block("a.rs", 10), block("b.rs", 40), block("c.rs", 10));
        let ceiling = 500;
        for chunk in split_diff(&diff, ceiling) {
            let again = split_diff(&chunk, ceiling);
            assert_eq!(again, vec![chunk.clone()]);
        }
    }

    #[test]
    fn trailing_content_joins_the_last_block() {
        let diff = format!("{}trailing context line", block("a.rs", 1));
        let chunks = split_diff(&diff, 10_000);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].ends_with("trailing context line"));
    }
}
