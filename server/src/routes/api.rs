use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers::ai_handlers::{summarize, summarize_usage, translate};
use crate::handlers::blog_handlers::{create_blog, delete_blog, list_blogs};
use crate::handlers::scrape_handlers::{
    scrape, scrape_and_summarize, scrape_and_summarize_usage, scrape_usage,
};
use crate::handlers::service_handler::{create_job, poll_job};
use crate::handlers::user_handlers::{create_user, list_users};
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/scrape", post(scrape).get(scrape_usage))
        .route("/summarize", post(summarize).get(summarize_usage))
        .route(
            "/scrape-and-summarize",
            post(scrape_and_summarize).get(scrape_and_summarize_usage),
        )
        .route("/translate", post(translate))
        .route("/jobs", post(create_job))
        .route("/jobs/{id}", get(poll_job))
        .route("/blog", get(list_blogs).post(create_blog))
        .route("/blog/{id}", delete(delete_blog))
        .route("/user", get(list_users).post(create_user))
}
