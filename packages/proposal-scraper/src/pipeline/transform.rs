//! Per-section transformation with failure isolation.
//!
//! Each section gets exactly one model call. A failed call never escapes:
//! it becomes a fallback block holding the untransformed content and an
//! inline error marker, so the document stays complete and a reviewer can
//! find the gap.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::pipeline::prompts::format_section_prompt;
use crate::traits::model::CompletionModel;
use crate::types::section::{Section, TransformedSection};

/// Inline marker appended to fallback blocks.
pub const ERROR_MARKER: &str = "*[Error occurred during parsing]*";

static LEADING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```markdown\s*\n?").expect("valid leading fence pattern"));

static TRAILING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?```\s*$").expect("valid trailing fence pattern"));

/// Rewrite one section into markdown. Always returns exactly one result with
/// the section's index.
pub async fn transform_section<M>(model: &M, section: &Section, total: usize) -> TransformedSection
where
    M: CompletionModel + ?Sized,
{
    debug!(
        section = section.position(),
        total,
        chars = section.char_len,
        "Transforming section"
    );

    let prompt = format_section_prompt(&section.content);

    match model.complete(&prompt).await {
        Ok(response) => TransformedSection::transformed(section.index, strip_code_fence(&response)),
        Err(e) => {
            warn!(
                section = section.position(),
                total,
                model = model.name(),
                error = %e,
                "Section transformation failed, keeping original content"
            );
            TransformedSection::fallback(section.index, fallback_block(section), e.to_string())
        }
    }
}

/// Transform sections one after another, in order.
pub async fn transform_sections<M>(model: &M, sections: &[Section]) -> Vec<TransformedSection>
where
    M: CompletionModel + ?Sized,
{
    let mut transformed = Vec::with_capacity(sections.len());
    for section in sections {
        transformed.push(transform_section(model, section, sections.len()).await);
    }
    transformed
}

/// Remove a ```` ```markdown ```` opener and a closing ```` ``` ```` the
/// model may have wrapped its answer in.
pub fn strip_code_fence(response: &str) -> String {
    let without_leading = LEADING_FENCE.replace(response, "");
    TRAILING_FENCE.replace(&without_leading, "").into_owned()
}

/// Deterministic substitute for a section whose transformation failed.
pub fn fallback_block(section: &Section) -> String {
    format!(
        "## Section {}\n\n{}\n\n{}\n",
        section.position(),
        section.content,
        ERROR_MARKER
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockModel;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```markdown\n# Title\n\nBody\n```"), "# Title\n\nBody");
        assert_eq!(strip_code_fence("```markdown   \n# Title\n```  \n"), "# Title");
        assert_eq!(strip_code_fence("# Plain"), "# Plain");
    }

    #[test]
    fn test_inner_fences_survive() {
        let response = "Intro\n\n```rust\nlet x = 1;\n```\n\nOutro";
        assert_eq!(strip_code_fence(response), response);
    }

    #[test]
    fn test_fallback_block_shape() {
        let section = Section::new(2, "<h2>Budget</h2>Up to $50,000");
        assert_eq!(
            fallback_block(&section),
            "## Section 3\n\n<h2>Budget</h2>Up to $50,000\n\n*[Error occurred during parsing]*\n"
        );
    }

    #[tokio::test]
    async fn test_transform_section_success() {
        let model = MockModel::new().with_response("```markdown\n## Budget\n```");
        let section = Section::new(0, "<h2>Budget</h2>");

        let result = transform_section(&model, &section, 1).await;

        assert_eq!(result.index, 0);
        assert_eq!(result.markdown, "## Budget");
        assert!(!result.is_fallback());
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_transform_section_failure_falls_back() {
        let model = MockModel::new().failing_on_call(0);
        let section = Section::new(4, "raw <b>text</b>");

        let result = transform_section(&model, &section, 6).await;

        assert_eq!(result.index, 4);
        assert!(result.is_fallback());
        assert!(result.markdown.starts_with("## Section 5\n\nraw <b>text</b>"));
        assert!(result.markdown.contains(ERROR_MARKER));
    }

    #[tokio::test]
    async fn test_failure_at_index_two_of_four() {
        let model = MockModel::new().failing_on_call(2);
        let sections: Vec<Section> = (0..4)
            .map(|i| Section::new(i, format!("<h2>Part {i}</h2>content {i}")))
            .collect();

        let results = transform_sections(&model, &sections).await;

        assert_eq!(results.len(), 4);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.index, i);
        }
        assert!(results[2].is_fallback());
        assert!(results[2].markdown.contains("<h2>Part 2</h2>content 2"));
        assert!(results[2].markdown.contains(ERROR_MARKER));
        for i in [0, 1, 3] {
            assert!(!results[i].is_fallback());
            assert!(!results[i].markdown.contains(ERROR_MARKER));
        }
    }
}
