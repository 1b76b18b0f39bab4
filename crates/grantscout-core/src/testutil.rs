//! Test utilities: deterministic doubles for the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests. Responses are
//! keyed by URL or by a needle found in the instruction, so they stay
//! deterministic when links are processed concurrently. All mocks use
//! `Arc<Mutex<_>>` so tests can assert on recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::traits::{Cleaner, ExtractionService, Fetcher};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher serving pages from an in-memory map.
///
/// URLs that were never registered fail with an HTTP 404 error.
#[derive(Clone, Default)]
pub struct MockFetcher {
    pages: Arc<Mutex<HashMap<String, Result<String, String>>>>,
    pub requested: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, body: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(body.to_string()));
        self
    }

    /// Register a URL whose fetch fails with `AppError::HttpError(message)`.
    pub fn with_error(self, url: &str, message: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(message.to_string()));
        self
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.requested.lock().unwrap().push(url.to_string());
        match self.pages.lock().unwrap().get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(message)) => Err(AppError::HttpError(message.clone())),
            None => Err(AppError::HttpError(format!("HTTP 404 for {url}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// MockCleaner
// ---------------------------------------------------------------------------

/// Mock cleaner that upper-cases its input, or fails once.
#[derive(Clone)]
pub struct MockCleaner {
    error: Arc<Mutex<Option<AppError>>>,
}

impl MockCleaner {
    pub fn uppercase() -> Self {
        Self {
            error: Arc::new(Mutex::new(None)),
        }
    }

    /// Creates a cleaner whose first call returns `error`.
    pub fn with_error(error: AppError) -> Self {
        Self {
            error: Arc::new(Mutex::new(Some(error))),
        }
    }
}

impl Cleaner for MockCleaner {
    fn clean(&self, html: &str) -> Result<String, AppError> {
        if let Some(e) = self.error.lock().unwrap().take() {
            return Err(e);
        }
        Ok(html.to_uppercase())
    }
}

// ---------------------------------------------------------------------------
// MockService
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum Reply {
    Text(String),
    Fail(String),
}

/// Deterministic extraction service.
///
/// Each rule pairs a needle with a reply; the first rule whose needle occurs
/// in the instruction answers it. Unmatched instructions get the default
/// reply, `{}` unless changed.
#[derive(Clone)]
pub struct MockService {
    rules: Arc<Mutex<Vec<(String, Reply)>>>,
    default: Arc<Mutex<Reply>>,
    pub instructions: Arc<Mutex<Vec<String>>>,
}

impl Default for MockService {
    fn default() -> Self {
        Self {
            rules: Arc::new(Mutex::new(Vec::new())),
            default: Arc::new(Mutex::new(Reply::Text("{}".to_string()))),
            instructions: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer instructions containing `needle` with the raw text `response`.
    pub fn respond(self, needle: &str, response: &str) -> Self {
        self.rules
            .lock()
            .unwrap()
            .push((needle.to_string(), Reply::Text(response.to_string())));
        self
    }

    /// Answer instructions containing `needle` with the JSON `value`.
    pub fn respond_json(self, needle: &str, value: serde_json::Value) -> Self {
        self.respond(needle, &value.to_string())
    }

    /// Fail instructions containing `needle` with an HTTP 500 `LlmError`.
    pub fn fail(self, needle: &str, message: &str) -> Self {
        self.rules
            .lock()
            .unwrap()
            .push((needle.to_string(), Reply::Fail(message.to_string())));
        self
    }

    pub fn with_default(self, response: &str) -> Self {
        *self.default.lock().unwrap() = Reply::Text(response.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.instructions.lock().unwrap().len()
    }
}

impl ExtractionService for MockService {
    async fn complete_json(&self, instruction: &str) -> Result<String, AppError> {
        self.instructions
            .lock()
            .unwrap()
            .push(instruction.to_string());

        let reply = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|(needle, _)| instruction.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.default.lock().unwrap().clone());

        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Fail(message) => Err(AppError::LlmError {
                message,
                status_code: 500,
            }),
        }
    }
}
