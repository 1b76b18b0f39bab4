use crate::models::PageContent;
use crate::traits::{Cleaner, Fetcher};

/// Fetches pages without ever failing.
///
/// Transport errors and non-2xx responses become [`PageContent::failed`] with
/// an empty body. Cleaning errors fall back to the raw body.
#[derive(Clone)]
pub struct ContentFetcher<F, C> {
    fetcher: F,
    cleaner: C,
}

impl<F, C> ContentFetcher<F, C>
where
    F: Fetcher,
    C: Cleaner,
{
    pub fn new(fetcher: F, cleaner: C) -> Self {
        Self { fetcher, cleaner }
    }

    pub async fn fetch(&self, url: &str) -> PageContent {
        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(%url, error = %e, transport = e.is_transport(), "Fetch failed");
                return PageContent::failed(url, e.to_string());
            }
        };
        tracing::info!("Fetched {} bytes from {}", html.len(), url);

        let body = match self.cleaner.clean(&html) {
            Ok(cleaned) => {
                if cleaned.len() != html.len() {
                    tracing::debug!(
                        "Cleaned to {} bytes ({}% reduction)",
                        cleaned.len(),
                        if html.is_empty() {
                            0
                        } else {
                            100usize.saturating_sub(cleaned.len() * 100 / html.len())
                        }
                    );
                }
                cleaned
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "Cleaning failed, using raw HTML");
                html
            }
        };

        PageContent::new(url, body)
    }
}
