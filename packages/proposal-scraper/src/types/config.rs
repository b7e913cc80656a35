//! Configuration types for splitting and running the pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::traits::loader::LoadOptions;

/// Trimmed length a heading-delimited buffer must exceed before it is
/// flushed as its own section.
pub const DEFAULT_MERGE_THRESHOLD: usize = 100;

/// Character budget for one chunk in paragraph packing.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 3000;

/// Pause between sections for standalone runs.
pub const STANDALONE_SECTION_DELAY_MS: u64 = 1000;

/// Thresholds for the section splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Buffers at or below this trimmed length merge forward into the next
    /// heading's section. Default: 100.
    pub merge_threshold: usize,

    /// Maximum packed chunk size for the paragraph fallback. A single
    /// paragraph larger than this is kept whole. Default: 3000.
    pub max_chunk_chars: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            merge_threshold: DEFAULT_MERGE_THRESHOLD,
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
        }
    }
}

impl SplitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_merge_threshold(mut self, threshold: usize) -> Self {
        self.merge_threshold = threshold;
        self
    }

    pub fn with_max_chunk_chars(mut self, max: usize) -> Self {
        self.max_chunk_chars = max;
        self
    }
}

/// Configuration for one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub split: SplitConfig,

    /// Delay between successive section transformations in milliseconds.
    ///
    /// 0 disables the pause (managed jobs rely on the runner's own limits).
    #[serde(default)]
    pub section_delay_ms: u64,

    /// Options passed to the page loader
    #[serde(default)]
    pub load: LoadOptions,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings for a manual run: pauses between sections to avoid throttling.
    pub fn standalone() -> Self {
        Self::default().with_section_delay_ms(STANDALONE_SECTION_DELAY_MS)
    }

    /// Settings for a job-runner invocation: no pause.
    pub fn managed() -> Self {
        Self::default()
    }

    pub fn with_split(mut self, split: SplitConfig) -> Self {
        self.split = split;
        self
    }

    pub fn with_section_delay_ms(mut self, ms: u64) -> Self {
        self.section_delay_ms = ms;
        self
    }

    pub fn with_load_options(mut self, load: LoadOptions) -> Self {
        self.load = load;
        self
    }

    /// The inter-section pause, if any.
    pub fn section_delay(&self) -> Option<Duration> {
        (self.section_delay_ms > 0).then(|| Duration::from_millis(self.section_delay_ms))
    }
}
