//! Content extraction: pick the meaningful fragment out of a full page.
//!
//! This is first-match pattern scanning, not markup parsing. The first
//! closing tag of the same name ends a region even when same-name tags are
//! nested inside it.

use regex::Regex;
use std::sync::LazyLock;

static MAIN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<main[^>]*>(.*?)</main>").expect("valid main pattern"));

static BODY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body[^>]*>(.*?)</body>").expect("valid body pattern"));

/// Return the inner content of the first `<main>` region, else of the first
/// `<body>` region, else the input unchanged. Never fails.
pub fn extract_main_content(html: &str) -> &str {
    [&*MAIN_PATTERN, &*BODY_PATTERN]
        .into_iter()
        .find_map(|pattern| inner_content(pattern, html))
        .unwrap_or(html)
}

fn inner_content<'a>(pattern: &Regex, html: &'a str) -> Option<&'a str> {
    pattern
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
}
