use std::future::Future;

use crate::error::AppError;

/// Fetches the raw body of a page.
///
/// Implementations report failures as errors; [`crate::ContentFetcher`] is
/// the layer that turns them into empty content.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Converts raw HTML into text that is cheaper to send to the extraction service.
pub trait Cleaner: Send + Sync + Clone {
    fn clean(&self, html: &str) -> Result<String, AppError>;
}

/// A language-model-backed service that answers an instruction with a single
/// JSON document.
pub trait ExtractionService: Send + Sync + Clone {
    /// Sends `instruction` and returns the raw text of the JSON document the
    /// service produced. Parsing is left to the caller.
    fn complete_json(
        &self,
        instruction: &str,
    ) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// A Cleaner that leaves the page body untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCleaner;

impl Cleaner for PassthroughCleaner {
    fn clean(&self, html: &str) -> Result<String, AppError> {
        Ok(html.to_string())
    }
}
