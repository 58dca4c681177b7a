pub mod ai;
pub mod error;
pub mod extractor;
pub mod scraper;
pub mod utils;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use error::{AiError, ExtractError, ScrapeError};

/// Readable text and metadata pulled out of one HTML page.
///
/// Only the extractor builds these, so `title` is never empty and every other
/// string field is present (possibly empty).
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDocument {
    source_url: String,
    title: String,
    body_text: String,
    description: String,
    author: String,
    publish_date: String,
    word_count: usize,
    extracted_at: DateTime<Utc>,
}

impl ExtractedDocument {
    pub(crate) fn new(
        source_url: String,
        title: String,
        body_text: String,
        description: String,
        author: String,
        publish_date: String,
        extracted_at: DateTime<Utc>,
    ) -> Self {
        let word_count = body_text.split_whitespace().count();
        Self {
            source_url,
            title,
            body_text,
            description,
            author,
            publish_date,
            word_count,
            extracted_at,
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body_text(&self) -> &str {
        &self.body_text
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn publish_date(&self) -> &str {
        &self.publish_date
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn extracted_at(&self) -> DateTime<Utc> {
        self.extracted_at
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl SummaryLength {
    pub fn instruction(self) -> &'static str {
        match self {
            SummaryLength::Short => "Create a concise summary in 2-3 sentences.",
            SummaryLength::Medium => "Create a comprehensive summary in 3-4 paragraphs.",
            SummaryLength::Long => "Create a detailed summary in 4-6 paragraphs.",
        }
    }
}

impl std::str::FromStr for SummaryLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(SummaryLength::Short),
            "medium" => Ok(SummaryLength::Medium),
            "long" => Ok(SummaryLength::Long),
            other => Err(format!("unknown summary length: {other}")),
        }
    }
}

/// What the summarizer needs to know about a post.
///
/// Accepts both the scrape response field names and the shorter
/// `url`/`content` names.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub publish_date: Option<String>,
    #[serde(default, alias = "sourceUrl")]
    pub url: Option<String>,
    #[serde(default, alias = "bodyText")]
    pub content: String,
}

impl From<&ExtractedDocument> for SummaryRequest {
    fn from(doc: &ExtractedDocument) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            title: Some(doc.title.clone()),
            author: non_empty(&doc.author),
            publish_date: non_empty(&doc.publish_date),
            url: Some(doc.source_url.clone()),
            content: doc.body_text.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub text: String,
    pub key_points: String,
    pub summary_length: SummaryLength,
    pub generated_at: DateTime<Utc>,
}
