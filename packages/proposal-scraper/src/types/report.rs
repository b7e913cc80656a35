//! Result of a completed job run.

use serde::Serialize;

use crate::traits::sink::StoredRecord;

/// What a successful run produced and where it went.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    pub job_id: String,
    pub url: String,

    /// Number of sections the page was split into
    pub section_count: usize,

    /// Indices of sections that fell back to their original content
    pub fallback_sections: Vec<usize>,

    /// Length of the assembled document in bytes
    pub document_len: usize,

    pub record: StoredRecord,
}

impl ScrapeReport {
    /// True when every section was rewritten by the model.
    pub fn is_clean(&self) -> bool {
        self.fallback_sections.is_empty()
    }
}
