use crate::error::ScrapeError;
use crate::{extractor, ExtractedDocument};
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const BOT_WALL_MARKERS: &[&str] = &["Attention Required!", "Checking your browser", "Just a moment"];
const CHALLENGE_STATUSES: &[u16] = &[403, 429, 503];

#[derive(Debug, Clone)]
pub struct ScraperOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ScraperOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Fetches one page and hands the body to the extractor.
#[derive(Debug, Clone)]
pub struct Scraper {
    client: Client,
}

impl Scraper {
    pub fn new(options: ScraperOptions) -> Result<Self, ScrapeError> {
        Ok(Self {
            client: Client::builder()
                .timeout(options.timeout)
                .user_agent(options.user_agent)
                .build()
                .map_err(ScrapeError::Client)?,
        })
    }

    pub async fn scrape(&self, url: &str) -> Result<ExtractedDocument, ScrapeError> {
        let parsed = parse_url(url)?;
        info!(url = %parsed, "fetching page");

        let res = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .map_err(|e| ScrapeError::from_reqwest(url, e))?;

        let status = res.status();
        let mitigated = res.headers().contains_key("cf-mitigated");
        let body = res
            .bytes()
            .await
            .map_err(|e| ScrapeError::from_reqwest(url, e))?;

        if is_challenge(status, mitigated, &body) {
            warn!(url = %parsed, %status, "page returned a bot protection wall");
            return Err(ScrapeError::BotProtection);
        }
        if !status.is_success() {
            warn!(url = %parsed, %status, "upstream HTTP error");
            return Err(ScrapeError::HttpStatus(status.as_u16()));
        }

        Ok(extractor::extract_bytes(url, &body)?)
    }
}

/// A challenge interstitial: flagged by the CDN header, or served with a
/// blocking status and a challenge `<title>`. Articles that merely mention
/// the phrases are not challenges.
fn is_challenge(status: StatusCode, mitigated: bool, body: &[u8]) -> bool {
    if mitigated {
        return true;
    }
    if !CHALLENGE_STATUSES.contains(&status.as_u16()) {
        return false;
    }
    let html = String::from_utf8_lossy(body);
    let Ok(selector) = Selector::parse("title") else {
        return false;
    };
    Html::parse_document(&html)
        .select(&selector)
        .next()
        .map(|title| title.text().collect::<String>())
        .is_some_and(|title| BOT_WALL_MARKERS.iter().any(|m| title.contains(m)))
}

/// Accept only absolute http(s) URLs.
pub fn parse_url(url: &str) -> Result<Url, ScrapeError> {
    let parsed = Url::parse(url.trim()).map_err(|e| ScrapeError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ScrapeError::InvalidUrl(format!("unsupported scheme: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use mockito::Server;

    #[test]
    fn url_validation() {
        assert!(parse_url("https://example.com/post").is_ok());
        assert!(matches!(parse_url("not a url"), Err(ScrapeError::InvalidUrl(_))));
        assert!(matches!(parse_url("ftp://example.com/x"), Err(ScrapeError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn scrapes_and_extracts_a_page() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/post")
            .match_header("user-agent", DEFAULT_USER_AGENT)
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(
                r#"<html><head><title>Post</title><meta name="author" content="Ada"></head>
                <body><article><p>Hello there.</p></article></body></html>"#,
            )
            .create_async()
            .await;

        let scraper = Scraper::new(ScraperOptions::default()).unwrap();
        let url = format!("{}/post", server.url());
        let doc = scraper.scrape(&url).await.unwrap();

        assert_eq!(doc.title(), "Post");
        assert_eq!(doc.author(), "Ada");
        assert_eq!(doc.body_text(), "Hello there.");
        assert_eq!(doc.source_url(), url);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let scraper = Scraper::new(ScraperOptions::default()).unwrap();
        let err = scraper
            .scrape(&format!("{}/missing", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::HttpStatus(404)));
    }

    #[tokio::test]
    async fn bot_walls_are_detected() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(403)
            .with_header("server", "cloudflare")
            .with_body("<html><title>Attention Required! | Cloudflare</title></html>")
            .create_async()
            .await;
        server
            .mock("GET", "/flagged")
            .with_status(200)
            .with_header("cf-mitigated", "challenge")
            .with_body("<html><title>Just a moment...</title></html>")
            .create_async()
            .await;

        let scraper = Scraper::new(ScraperOptions::default()).unwrap();
        for path in ["/", "/flagged"] {
            let err = scraper
                .scrape(&format!("{}{path}", server.url()))
                .await
                .unwrap_err();
            assert!(matches!(err, ScrapeError::BotProtection), "{path}: {err:?}");
        }
    }

    #[tokio::test]
    async fn articles_about_bot_walls_still_extract() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/post")
            .with_status(200)
            .with_header("server", "cloudflare")
            .with_body(
                "<html><head><title>Why Cloudflare shows Checking your browser</title></head>
                <body><article><p>Attention Required! pages explained.</p></article></body></html>",
            )
            .create_async()
            .await;

        let scraper = Scraper::new(ScraperOptions::default()).unwrap();
        let doc = scraper
            .scrape(&format!("{}/post", server.url()))
            .await
            .unwrap();
        assert_eq!(doc.title(), "Why Cloudflare shows Checking your browser");
        assert_eq!(doc.body_text(), "Attention Required! pages explained.");
    }

    #[tokio::test]
    async fn forbidden_pages_without_a_challenge_keep_their_status() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/private")
            .with_status(403)
            .with_body("<html><title>Forbidden</title></html>")
            .create_async()
            .await;

        let scraper = Scraper::new(ScraperOptions::default()).unwrap();
        let err = scraper
            .scrape(&format!("{}/private", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::HttpStatus(403)));
    }

    #[tokio::test]
    async fn non_utf8_body_is_an_encoding_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/latin1")
            .with_status(200)
            .with_header("content-type", "text/html; charset=iso-8859-1")
            .with_body(b"<html><title>Caf\xe9</title></html>".to_vec())
            .create_async()
            .await;

        let scraper = Scraper::new(ScraperOptions::default()).unwrap();
        let err = scraper
            .scrape(&format!("{}/latin1", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Extract(ExtractError::Encoding(_))));
    }

    #[tokio::test]
    async fn non_html_body_is_an_extract_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/plain")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("plain words only")
            .create_async()
            .await;

        let scraper = Scraper::new(ScraperOptions::default()).unwrap();
        let err = scraper
            .scrape(&format!("{}/plain", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Extract(ExtractError::NoMarkup)));
    }

    #[tokio::test]
    async fn refused_connection_is_unreachable() {
        let scraper = Scraper::new(ScraperOptions::default()).unwrap();
        let err = scraper.scrape("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, ScrapeError::Unreachable(_)), "{err:?}");
    }
}
