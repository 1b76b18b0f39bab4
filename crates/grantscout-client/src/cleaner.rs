use std::sync::Arc;

use grantscout_core::error::AppError;
use grantscout_core::traits::Cleaner;
use htmd::HtmlToMarkdown;

/// Elements that never carry grant details or links to them.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "canvas", "template", "form", "button",
];

/// HTML-to-Markdown cleaner using htmd.
///
/// Shrinks pages before they are embedded in instructions. Anchors survive
/// as Markdown links, so listing pages keep their grant URLs. Navigation
/// chrome (`nav`, `header`, `footer`, `aside`) is only dropped when
/// [`HtmdCleaner::without_chrome`] is used, since some listing pages put
/// their grant index in a sidebar.
pub struct HtmdCleaner {
    converter: Arc<HtmlToMarkdown>,
}

impl Clone for HtmdCleaner {
    fn clone(&self) -> Self {
        Self {
            converter: Arc::clone(&self.converter),
        }
    }
}

impl HtmdCleaner {
    pub fn new() -> Self {
        Self::with_skipped(SKIPPED_TAGS.to_vec())
    }

    pub fn without_chrome() -> Self {
        let mut tags = SKIPPED_TAGS.to_vec();
        tags.extend(["nav", "header", "footer", "aside"]);
        Self::with_skipped(tags)
    }

    fn with_skipped(tags: Vec<&str>) -> Self {
        let converter = HtmlToMarkdown::builder().skip_tags(tags).build();
        Self {
            converter: Arc::new(converter),
        }
    }
}

impl Default for HtmdCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl Cleaner for HtmdCleaner {
    fn clean(&self, html: &str) -> Result<String, AppError> {
        self.converter
            .convert(html)
            .map_err(|e| AppError::CleanerError(e.to_string()))
    }
}
