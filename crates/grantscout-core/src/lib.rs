pub mod content;
pub mod discovery;
pub mod error;
pub mod exemplar;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod record;
pub mod traits;

#[cfg(test)]
pub(crate) mod testutil;

pub use content::ContentFetcher;
pub use discovery::LinkDiscovery;
pub use error::AppError;
pub use exemplar::Exemplar;
pub use models::{
    GrantBatch, GrantRecord, LinkSet, PageContent, RunReport, RunSummary, compute_hash,
};
pub use output::{open_destination, write_jsonl};
pub use pipeline::{Pipeline, PipelineConfig};
pub use record::{Extraction, ExtractionStatus, RecordExtractor};
pub use traits::{Cleaner, ExtractionService, Fetcher, PassthroughCleaner};
