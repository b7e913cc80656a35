//! Section splitting.
//!
//! Two strategies, tried in order:
//!
//! 1. **Heading-bounded accumulation** - scan for `<h1>`..`<h6>` elements and
//!    cut a new section at each heading once the text gathered so far is
//!    longer than the merge threshold. Short runs merge forward into the next
//!    heading's section.
//! 2. **Paragraph packing** - used when (1) yields at most one section. The
//!    fragment is split on blank lines and paragraphs are packed greedily into
//!    chunks that fit the size budget. Paragraphs are atomic: one longer than
//!    the budget becomes its own oversized chunk.

use regex::{Captures, Regex};
use std::fmt::Write;
use std::sync::LazyLock;
use tracing::debug;

use crate::types::config::SplitConfig;
use crate::types::section::Section;

/// Heading elements, one alternative per level so the closing tag must match
/// the opening level. Heading text does not span lines.
static HEADING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = (1..=6)
        .map(|level| format!(r"<(h{level})[^>]*>(.*?)</h{level}>"))
        .collect();
    Regex::new(&format!("(?i){}", alternatives.join("|"))).expect("valid heading pattern")
});

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid paragraph pattern"));

const CHUNK_SEPARATOR: &str = "\n\n";

/// Split a content fragment into ordered sections.
///
/// An empty (or whitespace-only) fragment yields no sections.
pub fn split_content(fragment: &str, config: &SplitConfig) -> Vec<Section> {
    let by_heading = split_on_headings(fragment, config.merge_threshold);

    let spans = if by_heading.len() > 1 {
        debug!(sections = by_heading.len(), "Split content on headings");
        by_heading
    } else {
        let chunks = pack_paragraphs(fragment, config.max_chunk_chars);
        debug!(
            sections = chunks.len(),
            max_chunk_chars = config.max_chunk_chars,
            "No usable headings, packed paragraphs instead"
        );
        chunks
    };

    spans
        .into_iter()
        .enumerate()
        .map(|(index, content)| Section::new(index, content))
        .collect()
}

/// Heading-bounded accumulation. Returned spans are trimmed and non-empty.
pub(crate) fn split_on_headings(fragment: &str, merge_threshold: usize) -> Vec<String> {
    let mut sections = Vec::new();
    let mut current = String::new();
    let mut last_end = 0;

    for cap in HEADING_PATTERN.captures_iter(fragment) {
        let Some(whole) = cap.get(0) else { continue };
        let Some((tag, text)) = heading_parts(&cap) else {
            continue;
        };

        current.push_str(&fragment[last_end..whole.start()]);

        if current.trim().chars().count() > merge_threshold {
            sections.push(current.trim().to_string());
            current.clear();
        }

        // Attributes are dropped; the tag name keeps its original case.
        let _ = write!(current, "<{tag}>{text}</{tag}>");
        last_end = whole.end();
    }

    current.push_str(&fragment[last_end..]);
    if !current.trim().is_empty() {
        sections.push(current.trim().to_string());
    }

    sections
}

/// Tag name and inner text of whichever heading level matched.
fn heading_parts<'a>(cap: &Captures<'a>) -> Option<(&'a str, &'a str)> {
    (1..=6).find_map(|level| {
        let tag = cap.get(level * 2 - 1)?;
        let text = cap.get(level * 2)?;
        Some((tag.as_str(), text.as_str()))
    })
}

/// Greedy paragraph packing. Returned chunks are trimmed and non-empty.
pub(crate) fn pack_paragraphs(fragment: &str, max_chunk_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for paragraph in PARAGRAPH_BREAK.split(fragment) {
        let paragraph_chars = paragraph.chars().count();

        if current.is_empty() {
            current.push_str(paragraph);
            current_chars = paragraph_chars;
            continue;
        }

        let packed = current_chars + CHUNK_SEPARATOR.len() + paragraph_chars;
        if packed > max_chunk_chars {
            push_trimmed(&mut chunks, &current);
            current = paragraph.to_string();
            current_chars = paragraph_chars;
        } else {
            current.push_str(CHUNK_SEPARATOR);
            current.push_str(paragraph);
            current_chars = packed;
        }
    }

    push_trimmed(&mut chunks, &current);
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
    use proptest::prelude::*;

    fn filler(len: usize) -> String {
        "x".repeat(len)
    }

    #[test]
    fn test_two_long_heading_blocks() {
        let fragment = format!(
            "<h1>A</h1>{}<h2>B</h2>{}",
            filler(150),
            filler(150)
        );

        let sections = split_content(&fragment, &SplitConfig::default());

        assert_eq!(sections.len(), 2);
        assert!(sections[0].content.starts_with("<h1>A</h1>"));
        assert!(sections[1].content.starts_with("<h2>B</h2>"));
        assert_eq!(sections[0].index, 0);
        assert_eq!(sections[1].index, 1);
    }

    #[test]
    fn test_short_blocks_merge_forward() {
        let fragment = format!(
            "<h1>Title</h1>short intro<h2>Eligibility</h2>{}<h2>Deadline</h2>{}",
            filler(120),
            filler(120)
        );

        let sections = split_on_headings(&fragment, 100);

        assert_eq!(sections.len(), 2);
        assert!(sections[0].starts_with("<h1>Title</h1>short intro<h2>Eligibility</h2>"));
        assert!(sections[1].starts_with("<h2>Deadline</h2>"));
    }

    #[test]
    fn test_heading_attributes_are_dropped() {
        let fragment = format!(
            "<H2 class=\"title\" id=\"a\">Funding</H2>{}<h3 style=\"x\">More</h3>{}",
            filler(110),
            filler(10)
        );

        let sections = split_on_headings(&fragment, 100);

        assert_eq!(sections.len(), 2);
        assert!(sections[0].starts_with("<H2>Funding</H2>"));
        assert_eq!(sections[1], format!("<h3>More</h3>{}", filler(10)));
    }

    #[test]
    fn test_mismatched_heading_levels_are_not_headings() {
        let sections = split_on_headings("<h1>open</h2> text", 100);
        assert_eq!(sections, vec!["<h1>open</h2> text".to_string()]);
    }

    #[test]
    fn test_single_merged_block_falls_back_to_paragraphs() {
        let fragment = "<h1>Only</h1>first para\n\nsecond para";
        let sections = split_content(fragment, &SplitConfig::default());

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].content, "<h1>Only</h1>first para\n\nsecond para");
    }

    #[test]
    fn test_paragraphs_pack_until_budget() {
        let a = filler(40);
        let b = "y".repeat(40);
        let c = "z".repeat(40);
        let fragment = format!("{a}\n\n{b}\n  \n{c}");

        let chunks = pack_paragraphs(&fragment, 90);

        assert_eq!(chunks, vec![format!("{a}\n\n{b}"), c]);
    }

    #[test]
    fn test_oversized_paragraph_is_its_own_chunk() {
        let big = filler(200);
        let fragment = format!("small\n\n{big}\n\ntail");

        let chunks = pack_paragraphs(&fragment, 50);

        assert_eq!(chunks, vec!["small".to_string(), big, "tail".to_string()]);
    }

    #[test]
    fn test_no_headings_no_blank_lines_is_one_chunk() {
        let fragment = filler(5000);
        let sections = split_content(&fragment, &SplitConfig::default());

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].char_len, 5000);
    }

    #[test]
    fn test_empty_fragment_yields_nothing() {
        assert!(split_content("", &SplitConfig::default()).is_empty());
        assert!(split_content("  \n\n \n ", &SplitConfig::default()).is_empty());
    }

    fn strip_whitespace(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn block_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            (1usize..=6, "[A-Za-z]{1,12}").prop_map(|(level, text)| format!("<h{level}>{text}</h{level}>")),
            "[a-z]{1,60}( [a-z]{1,60}){0,4}",
            Just("\n\n".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn prop_sections_cover_fragment_in_order(
            blocks in prop::collection::vec(block_strategy(), 0..40),
            threshold in 0usize..200,
        ) {
            let fragment = blocks.concat();
            let config = SplitConfig::new().with_merge_threshold(threshold).with_max_chunk_chars(120);

            let sections = split_content(&fragment, &config);
            let joined: String = sections.iter().map(|s| s.content.as_str()).collect();

            prop_assert_eq!(strip_whitespace(&joined), strip_whitespace(&fragment));
            for (i, section) in sections.iter().enumerate() {
                prop_assert_eq!(section.index, i);
                prop_assert!(section.char_len > 0);
            }
        }

        #[test]
        fn prop_heading_sections_exceed_threshold_except_last(
            blocks in prop::collection::vec(block_strategy(), 0..40),
            threshold in 0usize..200,
        ) {
            let fragment = blocks.concat();
            let sections = split_on_headings(&fragment, threshold);

            if let Some((_, flushed)) = sections.split_last() {
                for section in flushed {
                    prop_assert!(section.chars().count() > threshold);
                }
            }
        }

        #[test]
        fn prop_chunks_fit_budget_unless_paragraph_is_oversized(
            paragraphs in prop::collection::vec("[a-z][a-z ]{0,119}", 1..30),
            max in 20usize..200,
        ) {
            let fragment = paragraphs.join("\n\n");
            let chunks = pack_paragraphs(&fragment, max);

            for chunk in &chunks {
                let len = chunk.chars().count();
                let oversized_paragraph = paragraphs
                    .iter()
                    .any(|p| p.trim() == chunk && p.trim().chars().count() > max);
                prop_assert!(len <= max || oversized_paragraph, "chunk of {} chars over {}", len, max);
            }
        }
    }
}
