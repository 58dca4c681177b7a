use axum::{extract::State, http::StatusCode, Json};
use blog_scraper_cli::{SummaryLength, SummaryRequest};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ai_error, api_error, require_ai, required, ApiError};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizePayload {
    pub scraped_data: Option<SummaryRequest>,
    #[serde(default)]
    pub summary_length: SummaryLength,
}

pub async fn summarize(
    State(state): State<AppState>,
    Json(payload): Json<SummarizePayload>,
) -> Result<Json<Value>, ApiError> {
    let request = payload
        .scraped_data
        .filter(|d| !d.content.trim().is_empty())
        .ok_or_else(|| {
            api_error(
                StatusCode::BAD_REQUEST,
                "Scraped data with content is required for summarization.",
            )
        })?;
    let ai = require_ai(&state)?;

    let summary = ai
        .summarize(&request, payload.summary_length)
        .await
        .map_err(|e| ai_error(&e, "Failed to generate summary. Please try again."))?;

    Ok(Json(json!({ "success": true, "data": { "summary": summary } })))
}

pub async fn summarize_usage() -> Json<Value> {
    Json(json!({
        "message": "Blog Summarizer API using Gemini AI",
        "usage": "Send a POST request with scraped data from /api/scrape",
        "requiredFields": ["scrapedData"],
        "scrapedDataFormat": {
            "title": "string (optional)",
            "content": "string (required)",
            "author": "string (optional)",
            "publishDate": "string (optional)",
            "url": "string (optional)",
        },
        "optionalFields": ["summaryLength"],
        "summaryLengths": ["short", "medium", "long"],
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatePayload {
    pub text: Option<String>,
    pub target_language: Option<String>,
}

pub async fn translate(
    State(state): State<AppState>,
    Json(payload): Json<TranslatePayload>,
) -> Result<Json<Value>, ApiError> {
    let text = required(payload.text.as_deref())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Text is required"))?;
    let ai = require_ai(&state)?;
    let language =
        required(payload.target_language.as_deref()).unwrap_or(state.translate_language.as_str());

    let translated = ai
        .translate(text, language)
        .await
        .map_err(|e| ai_error(&e, "Failed to translate text"))?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "originalText": text,
            "translatedText": translated,
            "targetLanguage": language,
        }
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{gemini_reply, state, GEMINI_PATH};
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn summarize_requires_content() {
        let payload = SummarizePayload {
            scraped_data: Some(SummaryRequest {
                title: Some("T".into()),
                content: "   ".into(),
                ..Default::default()
            }),
            summary_length: SummaryLength::Medium,
        };
        let (status, _) = summarize(State(state(None)), Json(payload)).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn summarize_maps_quota_errors() {
        let mut gemini = Server::new_async().await;
        gemini
            .mock("POST", GEMINI_PATH)
            .with_status(429)
            .with_body(r#"{"error":{"code":429,"message":"quota exhausted"}}"#)
            .create_async()
            .await;

        let payload: SummarizePayload = serde_json::from_value(json!({
            "scrapedData": { "title": "T", "content": "Body" },
            "summaryLength": "long",
        }))
        .unwrap();
        let (status, _) = summarize(State(state(Some(gemini.url()))), Json(payload))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn translate_uses_default_language() {
        let mut gemini = Server::new_async().await;
        let mock = gemini
            .mock("POST", GEMINI_PATH)
            .match_body(Matcher::Regex("English text to Urdu".into()))
            .with_status(200)
            .with_body(gemini_reply("سلام"))
            .create_async()
            .await;

        let payload = TranslatePayload {
            text: Some("Hello".into()),
            target_language: None,
        };
        let Json(body) = translate(State(state(Some(gemini.url()))), Json(payload))
            .await
            .unwrap();

        assert_eq!(body["data"]["originalText"], "Hello");
        assert_eq!(body["data"]["translatedText"], "سلام");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn translate_requires_text() {
        let payload = TranslatePayload {
            text: Some(" ".into()),
            target_language: Some("French".into()),
        };
        let (status, Json(body)) = translate(State(state(None)), Json(payload))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Text is required");
    }
}
