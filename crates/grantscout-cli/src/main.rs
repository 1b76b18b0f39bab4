use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use grantscout_client::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use grantscout_client::{HtmdCleaner, OpenAiService, ReqwestFetcher};
use grantscout_core::prompt::DEFAULT_MAX_CONTENT_CHARS;
use grantscout_core::traits::{Cleaner, PassthroughCleaner};
use grantscout_core::{Exemplar, Pipeline, PipelineConfig, RunSummary, open_destination};

/// Exit code used with `--fail-on-partial` when some pages degraded.
const PARTIAL_EXIT_CODE: u8 = 2;

#[derive(Parser)]
#[command(
    name = "grantscout",
    version,
    about = "Discover grant pages from a listing page and extract them as JSON lines"
)]
struct Cli {
    /// Listing page to start from
    seed_url: String,

    /// Example grant record defining the output fields
    #[arg(
        short,
        long,
        env = "GRANTSCOUT_EXEMPLAR",
        default_value = "grant_example.json"
    )]
    exemplar: PathBuf,

    /// Output file for newline-delimited records ("-" for stdout)
    #[arg(short, long, default_value = "grants.jsonl")]
    output: String,

    /// LLM model to use (e.g., "o3-mini", "gpt-4o-mini")
    #[arg(short, long, env = "GRANTSCOUT_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// OpenAI-compatible API base URL
    #[arg(short, long, env = "GRANTSCOUT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// API key (reads GRANTSCOUT_API_KEY, then OPENAI_API_KEY)
    #[arg(short, long, env = "GRANTSCOUT_API_KEY")]
    api_key: Option<String>,

    /// Number of grant pages processed at once
    #[arg(short, long, default_value_t = 1)]
    concurrency: usize,

    /// Page characters sent per request; longer pages are cut (0 = no limit)
    #[arg(long, default_value_t = DEFAULT_MAX_CONTENT_CHARS)]
    max_content_chars: usize,

    /// Timeout for fetching a page, in seconds
    #[arg(long, default_value_t = 30)]
    fetch_timeout_secs: u64,

    /// Timeout for one LLM request, in seconds
    #[arg(long, default_value_t = 120)]
    llm_timeout_secs: u64,

    /// Convert HTML to Markdown before sending it to the LLM
    #[arg(long, default_value_t = false)]
    clean: bool,

    /// Also drop nav/header/footer/aside when cleaning (implies --clean)
    #[arg(long, default_value_t = false)]
    strip_chrome: bool,

    /// Exit with status 2 if any page failed to fetch or extract
    #[arg(long, default_value_t = false)]
    fail_on_partial: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("grantscout=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let summary = if cli.strip_chrome {
        scrape(&cli, HtmdCleaner::without_chrome()).await?
    } else if cli.clean {
        scrape(&cli, HtmdCleaner::new()).await?
    } else {
        scrape(&cli, PassthroughCleaner).await?
    };

    Ok(exit_code(&summary, cli.fail_on_partial))
}

async fn scrape<C: Cleaner>(cli: &Cli, cleaner: C) -> Result<RunSummary> {
    let exemplar = Exemplar::load(&cli.exemplar)
        .with_context(|| format!("Failed to load exemplar {}", cli.exemplar.display()))?;
    tracing::info!(
        exemplar = %exemplar.name,
        fields = %exemplar.field_names().collect::<Vec<_>>().join(","),
        "Loaded exemplar"
    );

    let api_key = resolve_api_key(cli.api_key.clone())?;

    let fetcher = ReqwestFetcher::with_timeout(Duration::from_secs(cli.fetch_timeout_secs))
        .context("Failed to create HTTP client")?;
    let service = OpenAiService::with_base_url(&api_key, &cli.model, &cli.base_url)
        .and_then(|s| s.with_timeout(Duration::from_secs(cli.llm_timeout_secs)))
        .context("Failed to create LLM client")?;

    let config = PipelineConfig::default()
        .with_concurrency(cli.concurrency)
        .with_max_content_chars(cli.max_content_chars);

    tracing::info!(model = %service.model(), concurrency = config.concurrency, "Starting run");

    // Open the destination first so an unwritable path fails before any LLM calls.
    let destination = open_destination(&cli.output)
        .with_context(|| format!("Failed to open output {}", cli.output))?;

    let pipeline = Pipeline::new(fetcher, cleaner, service, exemplar, config);
    let report = pipeline
        .run_to(&cli.seed_url, destination)
        .await
        .with_context(|| format!("Failed to write output {}", cli.output))?;

    eprintln!("Saved {} grants to {}", report.summary.written, cli.output);

    Ok(report.summary)
}

fn resolve_api_key(explicit: Option<String>) -> Result<String> {
    explicit
        .or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .filter(|key| !key.trim().is_empty())
        .context("No API key. Pass --api-key or set GRANTSCOUT_API_KEY / OPENAI_API_KEY.")
}

fn exit_code(summary: &RunSummary, fail_on_partial: bool) -> ExitCode {
    if fail_on_partial && !summary.is_complete() {
        tracing::warn!(
            fetched_failed = summary.fetched_failed,
            extracted_empty = summary.extracted_empty,
            "Run was partial"
        );
        ExitCode::from(PARTIAL_EXIT_CODE)
    } else {
        ExitCode::SUCCESS
    }
}
