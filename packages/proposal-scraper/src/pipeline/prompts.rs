//! LLM prompt for rewriting one section of a funding opportunity page.

/// Instruction template. `{section}` is the only variable input.
pub const SECTION_PROMPT: &str = r#"
You are an expert at parsing and formatting web content into clean, well-structured markdown.

Please parse the following section of a funding opportunity page and convert it into properly formatted markdown.

IMPORTANT INSTRUCTIONS:
- Focus ONLY on the main content of the funding opportunity (descriptions, requirements, guidelines, etc.)
- IGNORE all navigation elements, menus, breadcrumbs, headers, footers, and metadata
- IGNORE elements like "Top", "Back to Results", "Search Again", "Print Preview", "Watch this Opportunity", etc.
- IGNORE technical elements like scripts, styles, and accessibility features
- IGNORE language selection options and site navigation
- Focus on the actual funding opportunity content starting from "Funding Opportunity Details" or similar main content areas

When parsing, focus on:
- Maintaining the hierarchical structure with appropriate heading levels
- Preserving all important information about the funding opportunity
- Making the content readable and well-organized
- Using proper markdown formatting (headers, lists, tables, etc.)
- Keeping the original meaning and context intact
- Making each section self-contained and coherent

Section content:
{section}

IMPORTANT: Return only the formatted markdown content. Do NOT wrap your response in ```markdown``` code blocks or any other formatting envelopes. Return the raw markdown text directly.
"#;

/// Fill the section template.
pub fn format_section_prompt(section: &str) -> String {
    SECTION_PROMPT.replacen("{section}", section, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_is_interpolated_once() {
        let prompt = format_section_prompt("<h2>Eligibility</h2>Open to {section} holders");

        assert!(prompt.contains("Section content:\n<h2>Eligibility</h2>Open to {section} holders\n"));
        assert!(prompt.contains("\"Back to Results\""));
        assert!(prompt.contains("Watch this Opportunity"));
        assert!(!prompt.contains("Section content:\n{section}"));
    }
}
