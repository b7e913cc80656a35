//! Funding opportunity scraper CLI
//!
//! `scrape` runs one page through the pipeline and writes a markdown file.
//! `serve` starts the managed job endpoint that persists to the record store.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use proposal_scraper::{
    server::{build_app, AppState},
    AppConfig, CompletionModel, FileSink, HttpLoader, JobPayload, OpenAiModel, PageLoader,
    Pipeline, PipelineConfig, PostgrestSink,
};

const DEFAULT_TARGET_URL: &str = "https://www.researchnet-recherchenet.ca/rnr16/vwOpprtntyDtls.do?all=1&masterList=true&org=CIHR&prog=4361&resultCount=25&sort=program&type=EXACT&view=currentOpps&language=E";

#[derive(Parser)]
#[command(name = "proposal-scraper")]
#[command(about = "Turn funding opportunity pages into markdown documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape one page and write the document to a file
    Scrape {
        /// Page to scrape
        #[arg(default_value = DEFAULT_TARGET_URL)]
        url: String,

        /// Output file
        #[arg(short, long, default_value = proposal_scraper::sinks::DEFAULT_OUTPUT_FILE)]
        output: String,

        /// Record id to log the run under (defaults to a random UUID)
        #[arg(long)]
        id: Option<String>,

        /// Pause between sections in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Run the managed job endpoint
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,proposal_scraper=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Scrape {
            url,
            output,
            id,
            delay_ms,
        } => scrape(&config, url, output, id, delay_ms).await,
        Commands::Serve { port } => serve(&config, port).await,
    }
}

async fn scrape(
    config: &AppConfig,
    url: String,
    output: String,
    id: Option<String>,
    delay_ms: Option<u64>,
) -> Result<()> {
    let mut pipeline_config = config.pipeline_config(PipelineConfig::standalone());
    if let Some(ms) = delay_ms {
        pipeline_config = pipeline_config.with_section_delay_ms(ms);
    }

    let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    tracing::info!(url = %url, output = %output, "Starting standalone scrape");

    let pipeline = Pipeline::new(build_loader(config)?, build_model(config), FileSink::new(&output))
        .with_config(pipeline_config);

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current section");
            ctrl_c_token.cancel();
        }
    });

    let report = pipeline
        .run(JobPayload::new(id, url), &cancel)
        .await
        .context("Scrape failed")?;

    tracing::info!(
        sections = report.section_count,
        fallbacks = report.fallback_sections.len(),
        bytes = report.document_len,
        path = %report.record.location,
        "Parsed content saved"
    );

    Ok(())
}

async fn serve(config: &AppConfig, port: Option<u16>) -> Result<()> {
    let (url, key) = config.record_store()?;
    let mut sink = PostgrestSink::new(url, key).context("Failed to configure record store")?;
    if let Some(table) = &config.proposal_table {
        sink = sink.with_table(table);
    }
    if let Some(column) = &config.proposal_markdown_column {
        sink = sink.with_column(column);
    }

    let model_config = config.clone();
    let model_factory =
        move || Arc::new(build_model(&model_config)) as Arc<dyn CompletionModel>;

    let state = AppState::new(build_loader(config)?, model_factory, Arc::new(sink))
        .with_pipeline_config(config.pipeline_config(PipelineConfig::managed()))
        .with_job_timeout(Duration::from_secs(config.job_timeout_secs));

    let app = build_app(state, config.max_concurrent_jobs);

    let addr = format!("0.0.0.0:{}", port.unwrap_or(config.port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(addr = %addr, "Job endpoint listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Server error")?;

    Ok(())
}

fn build_model(config: &AppConfig) -> OpenAiModel {
    let mut model = OpenAiModel::new(&config.openai_api_key).with_model(&config.openai_model);
    if let Some(base_url) = &config.openai_base_url {
        model = model.with_base_url(base_url);
    }
    model
}

/// Firecrawl when a key is configured and the feature is built, plain HTTP otherwise.
fn build_loader(config: &AppConfig) -> Result<Arc<dyn PageLoader>> {
    if let Some(loader) = firecrawl_loader(config)? {
        return Ok(loader);
    }
    let loader: Arc<dyn PageLoader> =
        Arc::new(HttpLoader::new().context("Failed to create HTTP loader")?);
    Ok(loader)
}

#[cfg(feature = "firecrawl")]
fn firecrawl_loader(config: &AppConfig) -> Result<Option<Arc<dyn PageLoader>>> {
    let Some(key) = &config.firecrawl_api_key else {
        return Ok(None);
    };
    let loader: Arc<dyn PageLoader> = Arc::new(
        proposal_scraper::FirecrawlLoader::new(key).context("Failed to create Firecrawl loader")?,
    );
    Ok(Some(loader))
}

#[cfg(not(feature = "firecrawl"))]
fn firecrawl_loader(config: &AppConfig) -> Result<Option<Arc<dyn PageLoader>>> {
    if config.firecrawl_api_key.is_some() {
        tracing::warn!("FIRECRAWL_API_KEY is set but the firecrawl feature is disabled, using HTTP");
    }
    Ok(None)
}
