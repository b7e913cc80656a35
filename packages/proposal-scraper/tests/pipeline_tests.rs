//! End-to-end pipeline runs against mock collaborators.

use proposal_scraper::pipeline::ERROR_MARKER;
use proposal_scraper::{
    FileSink, JobPayload, LoadError, MemorySink, MockLoader, MockModel, Pipeline, PipelineConfig,
    PipelineError, SplitConfig, ValidationError,
};
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

const URL: &str = "https://funding.example.org/opportunity/4361";

fn opportunity_page() -> String {
    let para = |topic: &str| {
        format!("<p>{topic}: applicants must read the full guidelines before applying to this program.</p>")
    };
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Catalyst Grant</title></head>
<body>
  <nav><a href="/">Top</a> | <a href="/search">Search Again</a></nav>
  <main id="content">
    <h1 class="title">Catalyst Grant: Health Data</h1>
    {}
    <h2>Eligibility</h2>
    {}
    <h2>How to Apply</h2>
    {}
  </main>
  <footer>Print Preview</footer>
</body>
</html>"#,
        para("Overview"),
        para("Eligibility"),
        para("Application")
    )
}

#[tokio::test]
async fn heading_split_keeps_heading_at_section_start() {
    let fragment = format!("<h1>A</h1>{}<h2>B</h2>{}", "x".repeat(120), "y".repeat(120));
    let loader = MockLoader::new().with_page(URL, format!("<main>{fragment}</main>"));
    let model = MockModel::new();
    let pipeline = Pipeline::new(loader, model, MemorySink::new());

    let report = assert_ok!(
        pipeline
            .run(JobPayload::new("rec-1", URL), &CancellationToken::new())
            .await
    );

    assert_eq!(report.section_count, 2);
    let prompts = pipeline.model().prompts();
    assert!(prompts[0].contains(&format!("<h1>A</h1>{}", "x".repeat(120))));
    assert!(prompts[1].contains(&format!("<h2>B</h2>{}", "y".repeat(120))));
}

#[tokio::test]
async fn full_page_only_sends_main_content() {
    let loader = MockLoader::new().with_page(URL, opportunity_page());
    let pipeline = Pipeline::new(loader, MockModel::new(), MemorySink::new())
        .with_config(PipelineConfig::new().with_split(SplitConfig::new().with_merge_threshold(50)));

    let report = assert_ok!(
        pipeline
            .run(JobPayload::new("rec-7", URL), &CancellationToken::new())
            .await
    );

    assert_eq!(report.section_count, 3);
    assert!(report.is_clean());

    for prompt in pipeline.model().prompts() {
        assert!(!prompt.contains("Search Again</a>"));
        assert!(!prompt.contains("<footer>"));
    }

    let document = pipeline.sink().document("rec-7").unwrap();
    assert!(document.starts_with("Rewritten: <h1>Catalyst Grant: Health Data</h1>"));
    assert_eq!(document.matches("Rewritten: ").count(), 3);
}

#[tokio::test]
async fn page_without_headings_is_packed_by_paragraph() {
    let paragraphs: Vec<String> = (0..6).map(|i| format!("Paragraph {i} {}", "w".repeat(40))).collect();
    let page = format!("<body>{}</body>", paragraphs.join("\n\n"));
    let loader = MockLoader::new().with_page(URL, page);
    let config = PipelineConfig::new().with_split(SplitConfig::new().with_max_chunk_chars(120));
    let pipeline = Pipeline::new(loader, MockModel::new(), MemorySink::new()).with_config(config);

    let report = assert_ok!(
        pipeline
            .run(JobPayload::new("rec-2", URL), &CancellationToken::new())
            .await
    );

    // Each paragraph is 52 chars; two fit with the separator, three do not.
    assert_eq!(report.section_count, 3);
    let prompts = pipeline.model().prompts();
    assert!(prompts[0].contains("Paragraph 0") && prompts[0].contains("Paragraph 1"));
    assert!(!prompts[0].contains("Paragraph 2"));
}

#[tokio::test]
async fn every_failed_section_is_marked_and_kept() {
    let loader = MockLoader::new().with_page(URL, opportunity_page());
    let model = MockModel::new().failing_on_call(0).failing_on_call(2);
    let pipeline = Pipeline::new(loader, model, MemorySink::new())
        .with_config(PipelineConfig::new().with_split(SplitConfig::new().with_merge_threshold(50)));

    let report = assert_ok!(
        pipeline
            .run(JobPayload::new("rec-3", URL), &CancellationToken::new())
            .await
    );

    assert_eq!(report.fallback_sections, vec![0, 2]);
    let document = pipeline.sink().document("rec-3").unwrap();
    assert_eq!(document.matches(ERROR_MARKER).count(), 2);
    assert!(document.starts_with("## Section 1\n\n<h1>Catalyst Grant: Health Data</h1>"));
    assert!(document.contains("## Section 3\n\n<h2>How to Apply</h2>"));
    assert!(document.contains("Rewritten: <h2>Eligibility</h2>"));
}

#[tokio::test]
async fn invalid_payloads_fail_before_loading() {
    let pipeline = Pipeline::new(MockLoader::new(), MockModel::new(), MemorySink::new());
    let cancel = CancellationToken::new();

    let err = assert_err!(pipeline.run(JobPayload::url_only(URL), &cancel).await);
    assert!(matches!(err, PipelineError::Validation(ValidationError::MissingField("id"))));

    let err = assert_err!(pipeline.run(JobPayload::new("rec-4", "ftp://host/x"), &cancel).await);
    assert!(matches!(err, PipelineError::Validation(ValidationError::InvalidUrl { .. })));

    assert_eq!(pipeline.loader().call_count(), 0);
}

#[tokio::test]
async fn unreachable_page_fails_the_job() {
    let pipeline = Pipeline::new(MockLoader::new(), MockModel::new(), MemorySink::new());

    let err = assert_err!(
        pipeline
            .run(JobPayload::new("rec-5", URL), &CancellationToken::new())
            .await
    );

    assert!(matches!(err, PipelineError::Load(LoadError::Status { status: 404, .. })));
    assert!(pipeline.sink().writes().is_empty());
}

#[tokio::test]
async fn standalone_run_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("researchnet-parsed.md");
    let loader = MockLoader::new().with_page(URL, opportunity_page());
    let pipeline = Pipeline::new(loader, MockModel::new(), FileSink::new(&path))
        .with_config(PipelineConfig::new().with_split(SplitConfig::new().with_merge_threshold(50)));

    let report = assert_ok!(
        pipeline
            .run(JobPayload::new("local", URL), &CancellationToken::new())
            .await
    );

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.len(), report.document_len);
    assert_eq!(report.record.location, path.display().to_string());
}
