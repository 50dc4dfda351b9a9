//! Verdict classification and report consolidation.
//!
//! Replies are classified into a tagged [`Verdict`] immediately after the
//! response is parsed, so downstream logic never re-compares raw sentinel
//! strings. Aggregation is pure: no network, no shared state.

use crate::prompt::{NO_FEEDBACK_SENTINEL, SECTION_NO_ISSUES_SENTINEL};

/// Classified outcome of one remote review call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The model produced review feedback.
    Feedback(String),
    /// The model answered with a "nothing to report" sentinel.
    NoFeedback,
}

/// Classifies a raw model reply.
///
/// The file/whole-PR sentinel is matched exactly (case-sensitive, after
/// trimming); the partition sentinel is matched as a substring, and only
/// when `partitioned` is set.
pub fn classify_reply(reply: &str, partitioned: bool) -> Verdict {
    let trimmed = reply.trim();
    if trimmed.is_empty() || trimmed == NO_FEEDBACK_SENTINEL {
        return Verdict::NoFeedback;
    }
    if partitioned && trimmed.contains(SECTION_NO_ISSUES_SENTINEL) {
        return Verdict::NoFeedback;
    }
    Verdict::Feedback(trimmed.to_string())
}

/// Non-empty feedback for one partitioned section.
#[derive(Debug, Clone)]
pub struct SectionVerdict {
    /// 0-based chunk position in diff order.
    pub position: usize,
    /// Total number of chunks in the partition.
    pub total: usize,
    /// Feedback text returned for this section.
    pub text: String,
}

/// Builds the consolidated report for a partitioned review.
///
/// Sections are rendered in chunk-index order regardless of the order in
/// which verdicts were collected. With no feedback at all, a fixed
/// "no significant issues" report is produced instead — the sink always
/// receives exactly one outcome.
pub fn aggregate(
    pr_number: &str,
    diff_size_kb: f64,
    chunk_count: usize,
    mut sections: Vec<SectionVerdict>,
) -> String {
    sections.sort_by_key(|s| s.position);

    if sections.is_empty() {
        return format!(
            r#"**Revisión Completa del PR #{pr_number} (Análisis por Secciones)**

**Información del Análisis:**
- **Tamaño del PR:** {diff_size_kb:.2} KB
- **Secciones analizadas:** {chunk_count}
- **Resultado:** Sin problemas significativos encontrados

**Resultado:** No se identificaron problemas significativos en ninguna de las {chunk_count} secciones analizadas.

**Nota:** Este PR fue dividido automáticamente en secciones para su análisis debido a su gran tamaño."#
        );
    }

    let rendered: Vec<String> = sections
        .iter()
        .map(|s| {
            format!(
                "**Sección {}/{}:**\n{}",
                s.position + 1,
                s.total,
                s.text
            )
        })
        .collect();

    format!(
        r#"**Revisión Completa del PR #{pr_number} (Análisis por Secciones)**

**Información del Análisis:**
- **Tamaño del PR:** {diff_size_kb:.2} KB
- **Secciones analizadas:** {chunk_count}
- **Secciones con comentarios:** {with_comments}

---

{body}

---

**Nota:** Este PR fue dividido automáticamente en {chunk_count} secciones para su análisis debido a su gran tamaño. Cada sección fue revisada independientemente para proporcionar retroalimentación detallada."#,
        with_comments = sections.len(),
        body = rendered.join("\n\n---\n\n"),
    )
}

/// Label under which the consolidated change-request report is posted.
pub fn change_request_label(pr_number: &str) -> String {
    format!("**Revisión Completa del PR #{pr_number}**")
}
