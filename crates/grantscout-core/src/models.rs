use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// A structured grant: field name to string, number, list or `null`.
///
/// Field identity comes from the exemplar document, see [`crate::Exemplar`].
pub type GrantRecord = serde_json::Map<String, serde_json::Value>;

/// Raw content of a fetched page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContent {
    /// Address the content was fetched from.
    pub url: String,
    /// Page body. Empty when the fetch failed.
    pub body: String,
    /// Failure description, `None` when the fetch succeeded.
    pub failure: Option<String>,
}

impl PageContent {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
            failure: None,
        }
    }

    /// Content standing in for a page that could not be fetched.
    pub fn failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: String::new(),
            failure: Some(reason.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// True if there is nothing to extract from, whether or not the fetch failed.
    pub fn is_blank(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// Absolute addresses of grant-detail pages, in discovery order.
///
/// Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    links: Vec<String>,
}

impl LinkSet {
    pub fn new(links: Vec<String>) -> Self {
        Self { links }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.links.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.links
    }
}

impl<'a> IntoIterator for &'a LinkSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

/// Ordered grant records, one per discovered detail link.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrantBatch {
    records: Vec<GrantRecord>,
}

impl GrantBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: GrantRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[GrantRecord] {
        &self.records
    }
}

impl FromIterator<GrantRecord> for GrantBatch {
    fn from_iter<I: IntoIterator<Item = GrantRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Counters describing how a pipeline run went.
///
/// `written` can be smaller than `discovered` only if emission did not happen;
/// degraded records are still written, and counted in `extracted_empty`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub seed_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub listing_fetched: bool,
    pub discovered: usize,
    pub fetched_ok: usize,
    pub fetched_failed: usize,
    pub extracted_ok: usize,
    pub extracted_empty: usize,
    pub written: usize,
}

impl RunSummary {
    pub fn start(seed_url: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            seed_url: seed_url.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            listing_fetched: false,
            discovered: 0,
            fetched_ok: 0,
            fetched_failed: 0,
            extracted_ok: 0,
            extracted_empty: 0,
            written: 0,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// True when the listing and every detail page were fetched and every
    /// record was extracted without degrading.
    pub fn is_complete(&self) -> bool {
        self.listing_fetched && self.fetched_failed == 0 && self.extracted_empty == 0
    }
}

/// Output of [`crate::Pipeline::run`].
#[derive(Debug, Clone)]
pub struct RunReport {
    pub batch: GrantBatch,
    pub summary: RunSummary,
}

/// Compute a SHA-256 hash of a string, returned as 64-char hex.
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
