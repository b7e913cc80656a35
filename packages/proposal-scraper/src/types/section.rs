//! Sections of a page and their transformed counterparts.

use serde::{Deserialize, Serialize};

/// A contiguous span of extracted content.
///
/// `index` is 0-based and defines document order; it must never be
/// reshuffled downstream of the splitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub index: usize,

    /// Trimmed content, possibly with embedded heading markup
    pub content: String,

    /// Character count of `content`
    pub char_len: usize,
}

impl Section {
    /// Create a section from raw text. The text is trimmed.
    pub fn new(index: usize, content: impl AsRef<str>) -> Self {
        let content = content.as_ref().trim().to_string();
        let char_len = content.chars().count();
        Self {
            index,
            content,
            char_len,
        }
    }

    /// 1-based position, as shown in logs and fallback headings.
    pub fn position(&self) -> usize {
        self.index + 1
    }
}

/// How a section's markdown was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransformOutcome {
    /// The model rewrote the section
    Transformed,

    /// The model call failed; the original content was kept with an error marker
    Fallback { error: String },
}

/// The markdown produced for one [`Section`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformedSection {
    /// Same index as the source section
    pub index: usize,
    pub markdown: String,
    pub outcome: TransformOutcome,
}

impl TransformedSection {
    pub fn transformed(index: usize, markdown: impl Into<String>) -> Self {
        Self {
            index,
            markdown: markdown.into(),
            outcome: TransformOutcome::Transformed,
        }
    }

    pub fn fallback(index: usize, markdown: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            index,
            markdown: markdown.into(),
            outcome: TransformOutcome::Fallback {
                error: error.into(),
            },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.outcome, TransformOutcome::Fallback { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_trims_and_counts_chars() {
        let section = Section::new(3, "  <h2>Élan</h2> text \n");
        assert_eq!(section.content, "<h2>Élan</h2> text");
        assert_eq!(section.char_len, 18);
        assert_eq!(section.position(), 4);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let section = TransformedSection::fallback(0, "body", "boom");
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["outcome"]["status"], "fallback");
        assert_eq!(json["outcome"]["error"], "boom");
        assert!(section.is_fallback());
        assert!(!TransformedSection::transformed(0, "ok").is_fallback());
    }
}
