use crate::exemplar::{Exemplar, json_kind};
use crate::models::{GrantRecord, PageContent, compute_hash};
use crate::prompt::{record_instruction, truncate_content};
use crate::traits::ExtractionService;

/// Whether a record was extracted or degraded to the empty record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStatus {
    Extracted,
    /// Empty record substituted; the reason is kept for the run log.
    Degraded(String),
}

/// A record together with how it was obtained.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub record: GrantRecord,
    pub status: ExtractionStatus,
}

impl Extraction {
    pub fn is_degraded(&self) -> bool {
        matches!(self.status, ExtractionStatus::Degraded(_))
    }
}

/// Turns a grant-detail page into a record shaped like the exemplar.
///
/// Missing exemplar fields are filled with `null`. An unusable answer, a
/// failed request or a blank page yields [`Exemplar::empty_record`].
#[derive(Clone)]
pub struct RecordExtractor<E> {
    service: E,
    exemplar: Exemplar,
    max_content_chars: usize,
}

impl<E: ExtractionService> RecordExtractor<E> {
    pub fn new(service: E, exemplar: Exemplar, max_content_chars: usize) -> Self {
        Self {
            service,
            exemplar,
            max_content_chars,
        }
    }

    /// Extract a record, discarding the status.
    pub async fn extract_record(&self, content: &PageContent) -> GrantRecord {
        self.extract(content).await.record
    }

    pub async fn extract(&self, content: &PageContent) -> Extraction {
        if content.is_blank() {
            return self.degraded(content, "page has no content".to_string());
        }

        let body = truncate_content(&content.body, self.max_content_chars);
        if body.len() < content.body.len() {
            tracing::info!(
                url = %content.url,
                kept = body.len(),
                total = content.body.len(),
                "Detail page truncated before extraction"
            );
        }

        let instruction = record_instruction(&self.exemplar, body);
        let raw = match self.service.complete_json(&instruction).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(transport = e.is_transport(), "Extraction request failed");
                return self.degraded(content, format!("extraction request failed: {e}"));
            }
        };

        let record = match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Object(record)) => record,
            Ok(other) => {
                return self.degraded(
                    content,
                    format!("expected a JSON object, got {}", json_kind(&other)),
                );
            }
            Err(e) => {
                return self.degraded(content, format!("unable to parse response as JSON: {e}"));
            }
        };

        let (record, filled) = self.exemplar.conform(record);
        if filled > 0 {
            tracing::debug!(url = %content.url, filled, "Filled missing fields with null");
        }

        let data_hash = compute_hash(&serde_json::Value::Object(record.clone()).to_string());
        tracing::info!(
            url = %content.url,
            content_hash = %&compute_hash(&content.body)[..8],
            data_hash = %&data_hash[..8],
            "Record extracted"
        );

        Extraction {
            record,
            status: ExtractionStatus::Extracted,
        }
    }

    fn degraded(&self, content: &PageContent, reason: String) -> Extraction {
        tracing::warn!(url = %content.url, %reason, "Extraction degraded to empty record");
        Extraction {
            record: self.exemplar.empty_record(),
            status: ExtractionStatus::Degraded(reason),
        }
    }
}
