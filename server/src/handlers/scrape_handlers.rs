use axum::{extract::State, http::StatusCode, Json};
use blog_scraper_cli::{SummaryLength, SummaryRequest};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{ai_error, api_error, require_ai, required, scrape_error, ApiError};
use crate::state::{AppState, ScrapeSummary};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeUrlPayload {
    pub url: Option<String>,
    #[serde(default)]
    pub summary_length: SummaryLength,
}

pub async fn scrape(
    State(state): State<AppState>,
    Json(payload): Json<ScrapeUrlPayload>,
) -> Result<Json<Value>, ApiError> {
    let url = required(payload.url.as_deref())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "URL is required."))?;

    let doc = state.scraper.scrape(url).await.map_err(|e| scrape_error(&e))?;

    Ok(Json(json!({ "success": true, "data": doc })))
}

pub async fn scrape_usage() -> Json<Value> {
    Json(json!({
        "message": "Blog Scraper API",
        "usage": "Send a POST request with { url: 'https://example.com/blog-post' }",
    }))
}

pub async fn scrape_and_summarize(
    State(state): State<AppState>,
    Json(payload): Json<ScrapeUrlPayload>,
) -> Result<Json<Value>, ApiError> {
    let url = required(payload.url.as_deref())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "URL is required."))?;

    let result = run_scrape_and_summarize(&state, url, payload.summary_length).await?;

    Ok(Json(json!({ "success": true, "data": result })))
}

pub async fn scrape_and_summarize_usage() -> Json<Value> {
    Json(json!({
        "message": "Blog Scraper and Summarizer API",
        "usage": "Send a POST request with { url: 'https://example.com/blog-post', summaryLength: 'medium' }",
        "summaryLengths": ["short", "medium", "long"],
        "features": [
            "Scrapes blog content from URL",
            "Extracts title, content, author, and metadata",
            "Generates AI-powered summary using Gemini",
            "Extracts key points and takeaways",
        ],
    }))
}

/// Scrape one page and summarize it; shared by the direct and job endpoints.
pub async fn run_scrape_and_summarize(
    state: &AppState,
    url: &str,
    length: SummaryLength,
) -> Result<ScrapeSummary, ApiError> {
    let ai = require_ai(state)?;

    info!(url, "scraping blog");
    let doc = state.scraper.scrape(url).await.map_err(|e| scrape_error(&e))?;
    if doc.body_text().is_empty() {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "No readable content found on the page.",
        ));
    }

    info!(url, words = doc.word_count(), "generating summary");
    let summary = ai
        .summarize(&SummaryRequest::from(&doc), length)
        .await
        .map_err(|e| {
            ai_error(
                &e,
                "Failed to scrape and summarize the blog. Please check the URL and try again.",
            )
        })?;

    Ok(ScrapeSummary {
        scraped_data: doc,
        summary,
    })
}
