//! Local file sink for standalone runs.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::SinkResult;
use crate::traits::sink::{DocumentSink, StoredRecord};

/// Default output file for standalone runs.
pub const DEFAULT_OUTPUT_FILE: &str = "researchnet-parsed.md";

/// Writes the document to a single file, replacing any previous content.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_FILE)
    }
}

#[async_trait]
impl DocumentSink for FileSink {
    async fn store(&self, job_id: &str, document: &str) -> SinkResult<StoredRecord> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, document).await?;

        info!(job_id, path = %self.path.display(), bytes = document.len(), "Document written");

        Ok(StoredRecord::new(job_id, self.path.display().to_string()))
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_document_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/doc.md");
        let sink = FileSink::new(&path);

        let record = sink.store("local", "# Title\n\nBody").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Title\n\nBody");
        assert_eq!(record.location, path.display().to_string());
    }

    #[tokio::test]
    async fn test_overwrites_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        let sink = FileSink::new(&path);

        sink.store("local", "first run, longer text").await.unwrap();
        sink.store("local", "second").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_default_output_file() {
        assert_eq!(FileSink::default().path(), Path::new("researchnet-parsed.md"));
    }
}
