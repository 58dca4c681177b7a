use anyhow::Context;
use blog_scraper_cli::{
    ai::{AIAnalyzer, DEFAULT_MODEL, DEFAULT_TARGET_LANGUAGE},
    scraper::{Scraper, ScraperOptions, DEFAULT_USER_AGENT},
    utils, SummaryLength, SummaryRequest,
};
use clap::Parser;
use dotenv::dotenv;
use std::{env, path::PathBuf, time::Duration};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Blog post URL to scrape
    #[arg(short, long)]
    url: String,

    /// Summary length: short, medium or long
    #[arg(short = 'l', long, default_value = "medium")]
    summary_length: SummaryLength,

    /// Skip AI summarization
    #[arg(short, long)]
    skip_ai: bool,

    /// Also translate the summary
    #[arg(short, long)]
    translate: bool,

    /// Target language for --translate
    #[arg(long, default_value = DEFAULT_TARGET_LANGUAGE)]
    language: String,

    /// Gemini model name
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Fetch timeout in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Directory for result.json and summary files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let scraper = Scraper::new(ScraperOptions {
        timeout: Duration::from_secs(args.timeout),
        user_agent: DEFAULT_USER_AGENT.to_string(),
    })?;
    let doc = scraper
        .scrape(&args.url)
        .await
        .with_context(|| format!("failed to scrape {}", args.url))?;

    info!(title = doc.title(), words = doc.word_count(), "page extracted");
    utils::save_json(&doc, &args.output_dir, "result.json")?;

    if args.skip_ai {
        return Ok(());
    }
    if doc.body_text().is_empty() {
        warn!("page has no readable text, skipping summary");
        return Ok(());
    }

    let api_key = env::var("GEMINI_API_KEY").context("GEMINI_API_KEY environment variable not set")?;
    let analyzer = AIAnalyzer::new(api_key)?.with_model(args.model);

    let summary = analyzer
        .summarize(&SummaryRequest::from(&doc), args.summary_length)
        .await?;
    let report = format!("{}\n\nKey points:\n{}\n", summary.text, summary.key_points);
    utils::save_text(&report, &args.output_dir, "summary.txt")?;

    if args.translate {
        let translated = analyzer.translate(&report, &args.language).await?;
        utils::save_text(&translated, &args.output_dir, "summary.translated.txt")?;
    }

    Ok(())
}
