use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use grantscout_core::{AppError, Exemplar, ExtractionService, Fetcher};

/// Fetcher serving a fixed set of pages; anything else is a 404.
#[derive(Clone, Default)]
pub struct StaticSite {
    pages: Arc<HashMap<String, String>>,
}

impl StaticSite {
    pub fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.to_string()))
                    .collect(),
            ),
        }
    }
}

impl Fetcher for StaticSite {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::HttpError(format!("HTTP 404 for {url}")))
    }
}

/// Extraction service answering by marker: the first marker found in the
/// instruction picks the answer, otherwise `fallback` is returned.
#[derive(Clone)]
pub struct ScriptedService {
    answers: Arc<Vec<(String, String)>>,
    fallback: String,
    pub calls: Arc<Mutex<usize>>,
}

impl ScriptedService {
    pub fn new(answers: &[(&str, serde_json::Value)], fallback: &str) -> Self {
        Self {
            answers: Arc::new(
                answers
                    .iter()
                    .map(|(marker, value)| (marker.to_string(), value.to_string()))
                    .collect(),
            ),
            fallback: fallback.to_string(),
            calls: Arc::new(Mutex::new(0)),
        }
    }
}

impl ExtractionService for ScriptedService {
    async fn complete_json(&self, instruction: &str) -> Result<String, AppError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self
            .answers
            .iter()
            .find(|(marker, _)| instruction.contains(marker.as_str()))
            .map(|(_, answer)| answer.clone())
            .unwrap_or_else(|| self.fallback.clone()))
    }
}

/// The grant shape used by the reference exemplar file.
pub fn grant_exemplar() -> Exemplar {
    Exemplar::from_value(
        "grant_example",
        serde_json::json!({
            "title": "Example Research Grant",
            "description": "Supports undergraduate research projects.",
            "eligibility": ["Undergraduate"],
            "amountMin": 500,
            "amountMax": 5000,
            "url": "https://example.org/grants/example",
            "deadline": "2025-03-01",
            "nextCycleStartDate": null
        }),
    )
    .unwrap()
}
