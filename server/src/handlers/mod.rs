pub mod ai_handlers;
pub mod blog_handlers;
pub mod scrape_handlers;
pub mod service_handler;
pub mod user_handlers;

use axum::{http::StatusCode, Json};
use blog_scraper_cli::{ai::AIAnalyzer, AiError, ScrapeError};
use serde_json::{json, Value};
use tracing::error;

use crate::state::AppState;
use crate::store::StoreError;

/// Handler error shape: a status and `{ "error": message }`.
pub type ApiError = (StatusCode, Json<Value>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

/// Message carried by an [`ApiError`], for places that only keep text.
pub fn error_message(err: &ApiError) -> String {
    let Json(body) = &err.1;
    body["error"].as_str().unwrap_or_default().to_string()
}

pub fn scrape_error(err: &ScrapeError) -> ApiError {
    match err {
        ScrapeError::InvalidUrl(_) => api_error(StatusCode::BAD_REQUEST, "Invalid URL format."),
        ScrapeError::Unreachable(_) => {
            api_error(StatusCode::NOT_FOUND, "URL not found or unreachable.")
        }
        ScrapeError::Timeout(_) => {
            api_error(StatusCode::REQUEST_TIMEOUT, "Request timeout. Please try again.")
        }
        ScrapeError::HttpStatus(code) => api_error(
            StatusCode::BAD_GATEWAY,
            format!("The page responded with HTTP {code}."),
        ),
        ScrapeError::BotProtection => api_error(
            StatusCode::BAD_GATEWAY,
            "The page is protected against automated access.",
        ),
        ScrapeError::Extract(e) => api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("The page could not be read as an HTML document: {e}"),
        ),
        ScrapeError::Request(_) | ScrapeError::Client(_) => {
            error!(error = %err, "scrape failed");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to scrape the blog. Please check the URL and try again.",
            )
        }
    }
}

pub fn ai_error(err: &AiError, fallback: &str) -> ApiError {
    match err {
        AiError::InvalidApiKey => {
            api_error(StatusCode::UNAUTHORIZED, "Invalid or missing Gemini API key.")
        }
        AiError::QuotaExceeded => api_error(
            StatusCode::TOO_MANY_REQUESTS,
            "API quota exceeded. Please try again later.",
        ),
        _ => {
            error!(error = %err, "Gemini request failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, fallback)
        }
    }
}

pub fn store_error(err: &StoreError) -> ApiError {
    error!(error = %err, "store failure");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
}

pub fn require_ai(state: &AppState) -> Result<&AIAnalyzer, ApiError> {
    state.ai.as_ref().ok_or_else(|| {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Gemini API key is not configured.",
        )
    })
}

/// Trimmed, non-empty value of an optional payload field.
pub fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}


#[cfg(test)]
mod tests {
    use super::*;
    use blog_scraper_cli::ExtractError;

    #[test]
    fn scrape_errors_map_to_distinct_statuses() {
        let cases = [
            (ScrapeError::InvalidUrl("x".into()), StatusCode::BAD_REQUEST),
            (ScrapeError::Unreachable("x".into()), StatusCode::NOT_FOUND),
            (ScrapeError::Timeout("x".into()), StatusCode::REQUEST_TIMEOUT),
            (ScrapeError::HttpStatus(500), StatusCode::BAD_GATEWAY),
            (ScrapeError::BotProtection, StatusCode::BAD_GATEWAY),
            (
                ScrapeError::Extract(ExtractError::NoMarkup),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(scrape_error(&err).0, status, "{err}");
        }
    }

    #[test]
    fn ai_errors_map_to_statuses() {
        assert_eq!(ai_error(&AiError::InvalidApiKey, "x").0, StatusCode::UNAUTHORIZED);
        assert_eq!(ai_error(&AiError::QuotaExceeded, "x").0, StatusCode::TOO_MANY_REQUESTS);
        let err = ai_error(&AiError::EmptyResponse, "Failed to translate text");
        assert_eq!(err.0, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_message(&err), "Failed to translate text");
    }

    #[test]
    fn required_trims_blanks() {
        assert_eq!(required(Some("  a ")), Some("a"));
        assert_eq!(required(Some("   ")), None);
        assert_eq!(required(None), None);
    }
}
