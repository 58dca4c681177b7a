mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod routes;
mod state;
mod store;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::get,
    Json, Router,
};
use blog_scraper_cli::{
    ai::AIAnalyzer,
    scraper::{Scraper, ScraperOptions},
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use middleware::request_log::request_log;
use routes::api::api_routes;
use state::AppState;
use store::MySqlStore;

const JOB_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
        .layer(from_fn(request_log))
        .layer(cors)
        .with_state(state)
}

fn cors_for(client_url: &str) -> anyhow::Result<CorsLayer> {
    let origin = client_url
        .parse::<HeaderValue>()
        .with_context(|| format!("CLIENT_URL is not a valid origin: {client_url}"))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;

    let pool = db::init_db(&config.database_url)
        .await
        .context("failed to connect to the database")?;

    let scraper = Scraper::new(ScraperOptions {
        timeout: config.fetch_timeout,
        ..ScraperOptions::default()
    })?;
    let ai = match &config.gemini_api_key {
        Some(key) => Some(AIAnalyzer::new(key.clone())?.with_model(config.gemini_model.clone())),
        None => {
            warn!("GEMINI_API_KEY is not set; AI endpoints will fail");
            None
        }
    };

    let state = AppState::new(
        Arc::new(MySqlStore::new(pool)),
        scraper,
        ai,
        config.translate_language.clone(),
    )
    .with_job_ttl(config.job_ttl);

    let sweeper = state.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(JOB_SWEEP_INTERVAL);
        loop {
            tick.tick().await;
            let removed = sweeper.sweep_jobs();
            if removed > 0 {
                debug!(removed, "expired jobs swept");
            }
        }
    });
    let router = app(state, cors_for(&config.client_url)?);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, router).await?;
    Ok(())
}
