use crate::error::AiError;
use crate::{Summary, SummaryLength, SummaryRequest};
use backoff::{future::retry, ExponentialBackoff};
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TARGET_LANGUAGE: &str = "Urdu";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_RETRY_BUDGET: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Client for Gemini `generateContent`, shared by summarization and translation.
#[derive(Debug, Clone)]
pub struct AIAnalyzer {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    retry_budget: Duration,
}

impl AIAnalyzer {
    pub fn new(api_key: String) -> Result<Self, AiError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(AiError::Client)?;
        Ok(Self {
            client,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            retry_budget: DEFAULT_RETRY_BUDGET,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Total time spent retrying transient failures before giving up.
    pub fn with_retry_budget(mut self, budget: Duration) -> Self {
        self.retry_budget = budget;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Summary and key points for one post, generated concurrently.
    pub async fn summarize(
        &self,
        request: &SummaryRequest,
        length: SummaryLength,
    ) -> Result<Summary, AiError> {
        info!(model = %self.model, ?length, chars = request.content.len(), "summarizing");
        let summary_prompt = summary_prompt(request, length);
        let key_points_prompt = key_points_prompt(&request.content);

        let (text, key_points) = futures::try_join!(
            self.generate(&summary_prompt),
            self.generate(&key_points_prompt)
        )?;

        Ok(Summary {
            text,
            key_points,
            summary_length: length,
            generated_at: Utc::now(),
        })
    }

    pub async fn translate(&self, text: &str, target_language: &str) -> Result<String, AiError> {
        info!(model = %self.model, target_language, chars = text.len(), "translating");
        self.generate(&translate_prompt(text, target_language)).await
    }

    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.retry_budget),
            ..ExponentialBackoff::default()
        };

        retry(backoff, || async {
            self.generate_once(prompt).await.map_err(|e| {
                if e.is_transient() {
                    warn!(error = %e, "transient Gemini failure, retrying");
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        })
        .await
    }

    async fn generate_once(&self, prompt: &str) -> Result<String, AiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key).map_err(|_| AiError::InvalidApiKey)?,
        );

        let payload = json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        });

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), %body, "Gemini request failed");
            return Err(AiError::from_response(status.as_u16(), &body));
        }

        response
            .json::<GenerateResponse>()
            .await?
            .into_text()
            .ok_or(AiError::EmptyResponse)
    }
}

fn summary_prompt(request: &SummaryRequest, length: SummaryLength) -> String {
    let or = |value: &Option<String>, fallback: &'static str| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(fallback)
            .to_string()
    };

    format!(
        "Please analyze and summarize the following blog post:\n\n\
         Title: {title}\n\
         Author: {author}\n\
         Published: {published}\n\
         URL: {url}\n\n\
         Content:\n{content}\n\n\
         {instruction}\n\n\
         Please provide a well-structured summary that includes:\n\
         1. Main topic and key points\n\
         2. Important insights or findings\n\
         3. Key takeaways for readers\n\n\
         Make sure the summary is clear, accurate, and captures the essence of the original content.",
        title = or(&request.title, "Untitled"),
        author = or(&request.author, "Unknown"),
        published = or(&request.publish_date, "Unknown"),
        url = or(&request.url, "N/A"),
        content = request.content,
        instruction = length.instruction(),
    )
}

fn key_points_prompt(content: &str) -> String {
    format!(
        "Based on the following blog content, extract 3-5 key points or main takeaways:\n\n\
         {content}\n\n\
         Please provide the key points in a bullet-point format."
    )
}

fn translate_prompt(text: &str, target_language: &str) -> String {
    format!(
        "Translate the following English text to {target_language}. \
         Return only the translated text without any additional formatting or explanations:\n\n{text}"
    )
}
