//! Document assembly.

use crate::types::section::TransformedSection;

/// Separator placed between consecutive sections.
pub const SECTION_SEPARATOR: &str = "\n\n";

/// Join transformed sections, in the order given, into one document.
pub fn assemble_document(sections: &[TransformedSection]) -> String {
    sections
        .iter()
        .map(|s| s.markdown.as_str())
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR)
}
