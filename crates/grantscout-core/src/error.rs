use thiserror::Error;

/// Error types shared by the grantscout crates.
///
/// Most variants never escape the pipeline: fetch and extraction failures are
/// downgraded to empty results where they happen. Only [`AppError::ExemplarError`]
/// and [`AppError::Io`] abort a run.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed or returned a non-2xx status.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Extraction service returned an error response.
    #[error("LLM error (HTTP {status_code}): {message}")]
    LlmError { message: String, status_code: u16 },

    /// Extraction service rejected the request because of a rate limit or quota.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// HTML-to-Markdown conversion failed.
    #[error("Cleaner error: {0}")]
    CleanerError(String),

    /// The exemplar document could not be loaded or is not a JSON object.
    #[error("Exemplar error: {0}")]
    ExemplarError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Writing the output destination failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Returns true if the error came from the network transport rather than
    /// from the content of a response.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::NetworkError(_) | AppError::Timeout(_) | AppError::RateLimitExceeded
        )
    }
}
