//! Error types for extraction, fetching and the AI client

use thiserror::Error;

/// The page could not be treated as an HTML document at all.
///
/// Sparse pages are not errors; they extract with empty fields.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("document is not valid UTF-8 text: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("document contains binary data")]
    Binary,

    #[error("document contains no HTML markup")]
    NoMarkup,
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("host unreachable: {0}")]
    Unreachable(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("upstream returned HTTP {0}")]
    HttpStatus(u16),

    #[error("page is behind bot protection")]
    BotProtection,

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl ScrapeError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScrapeError::Timeout(url.to_string())
        } else if err.is_connect() {
            ScrapeError::Unreachable(url.to_string())
        } else {
            ScrapeError::Request(err)
        }
    }
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("invalid or missing Gemini API key")]
    InvalidApiKey,

    #[error("Gemini API quota exceeded")]
    QuotaExceeded,

    #[error("Gemini API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Gemini returned no text")]
    EmptyResponse,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl AiError {
    /// Classify a non-success response from the API by status and raw body.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        if status == 401 || status == 403 || body.contains("API_KEY") {
            return AiError::InvalidApiKey;
        }
        if status == 429 || body.to_lowercase().contains("quota") {
            return AiError::QuotaExceeded;
        }
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or_else(|| body.to_string());
        AiError::Api { status, message }
    }

    pub(crate) fn is_transient(&self) -> bool {
        match self {
            AiError::Api { status, .. } => *status >= 500,
            AiError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}
