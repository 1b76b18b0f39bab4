use std::io::Write;

use futures::StreamExt;
use futures::stream;
use tracing::Instrument;

use crate::content::ContentFetcher;
use crate::discovery::LinkDiscovery;
use crate::error::AppError;
use crate::exemplar::Exemplar;
use crate::models::{GrantBatch, RunReport, RunSummary};
use crate::output::write_jsonl;
use crate::prompt::DEFAULT_MAX_CONTENT_CHARS;
use crate::record::{Extraction, RecordExtractor};
use crate::traits::{Cleaner, ExtractionService, Fetcher};

/// Tunables for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of detail pages processed at once. `1` is strictly sequential.
    pub concurrency: usize,
    /// Page characters kept per instruction, `0` for no limit.
    pub max_content_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
        }
    }
}

impl PipelineConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_max_content_chars(mut self, max_content_chars: usize) -> Self {
        self.max_content_chars = max_content_chars;
        self
    }
}

/// Result of processing one discovered link.
struct LinkOutcome {
    fetched: bool,
    extraction: Extraction,
}

/// Orchestrates a run: fetch listing → discover links → for each link fetch
/// and extract → emit.
///
/// Generic over the fetcher, cleaner and extraction service so tests can
/// inject deterministic doubles. Failures are contained per page; the only
/// error a run can return comes from writing the output.
pub struct Pipeline<F, C, E>
where
    F: Fetcher,
    C: Cleaner,
    E: ExtractionService,
{
    content: ContentFetcher<F, C>,
    discovery: LinkDiscovery<E>,
    records: RecordExtractor<E>,
    config: PipelineConfig,
}

impl<F, C, E> Pipeline<F, C, E>
where
    F: Fetcher,
    C: Cleaner,
    E: ExtractionService,
{
    pub fn new(
        fetcher: F,
        cleaner: C,
        service: E,
        exemplar: Exemplar,
        config: PipelineConfig,
    ) -> Self {
        Self {
            content: ContentFetcher::new(fetcher, cleaner),
            discovery: LinkDiscovery::new(service.clone(), config.max_content_chars),
            records: RecordExtractor::new(service, exemplar, config.max_content_chars),
            config,
        }
    }

    /// Run the pipeline from `seed_url` and return the batch with its summary.
    ///
    /// The batch holds one record per discovered link, in discovery order,
    /// including empty records for pages that failed.
    pub async fn run(&self, seed_url: &str) -> RunReport {
        let mut summary = RunSummary::start(seed_url);
        let span = tracing::info_span!("run", run_id = %summary.run_id, seed = %seed_url);

        let batch = async {
            tracing::info!("Fetching listing page {}", seed_url);
            let listing = self.content.fetch(seed_url).await;
            summary.listing_fetched = !listing.is_failed();

            let links = self.discovery.discover_links(&listing).await;
            summary.discovered = links.len();
            if links.is_empty() {
                tracing::info!("No grant links discovered");
                return GrantBatch::new();
            }

            let total = links.len();
            let outcomes: Vec<LinkOutcome> = stream::iter(links.iter().enumerate())
                .map(|(index, url)| self.process_link(index, total, url))
                .buffered(self.config.concurrency.max(1))
                .collect()
                .await;

            let mut batch = GrantBatch::new();
            for outcome in outcomes {
                if outcome.fetched {
                    summary.fetched_ok += 1;
                } else {
                    summary.fetched_failed += 1;
                }
                if outcome.extraction.is_degraded() {
                    summary.extracted_empty += 1;
                } else {
                    summary.extracted_ok += 1;
                }
                batch.push(outcome.extraction.record);
            }
            batch
        }
        .instrument(span)
        .await;

        summary.finish();
        tracing::info!(
            run_id = %summary.run_id,
            discovered = summary.discovered,
            fetched_ok = summary.fetched_ok,
            fetched_failed = summary.fetched_failed,
            extracted_ok = summary.extracted_ok,
            extracted_empty = summary.extracted_empty,
            "Run finished"
        );

        RunReport { batch, summary }
    }

    /// Run the pipeline and write the batch to `writer` as JSONL.
    ///
    /// Fails only if writing fails.
    pub async fn run_to<W: Write>(
        &self,
        seed_url: &str,
        writer: W,
    ) -> Result<RunReport, AppError> {
        let mut report = self.run(seed_url).await;
        report.summary.written = write_jsonl(&report.batch, writer)?;
        tracing::info!(
            written = report.summary.written,
            summary = %serde_json::to_string(&report.summary)?,
            "Grant records written"
        );
        Ok(report)
    }

    async fn process_link(&self, index: usize, total: usize, url: &str) -> LinkOutcome {
        tracing::info!(link = index + 1, total, %url, "Processing grant page");
        let page = self.content.fetch(url).await;
        let extraction = self.records.extract(&page).await;
        LinkOutcome {
            fetched: !page.is_failed(),
            extraction,
        }
    }
}
