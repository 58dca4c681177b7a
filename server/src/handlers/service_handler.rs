use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use blog_scraper_cli::scraper::parse_url;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::scrape_handlers::{run_scrape_and_summarize, ScrapeUrlPayload};
use super::{api_error, error_message, require_ai, required, scrape_error, ApiError};
use crate::state::{AppState, JobStatus, ScrapeSummary};

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JobCreated {
    pub job_id: Uuid,
}

#[derive(Serialize, Debug)]
pub struct JobPollResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ScrapeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /api/jobs: accept a URL and scrape-and-summarize it in the background.
pub async fn create_job(
    State(state): State<AppState>,
    Json(payload): Json<ScrapeUrlPayload>,
) -> Result<(StatusCode, Json<JobCreated>), ApiError> {
    let url = required(payload.url.as_deref())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "URL is required."))?
        .to_string();
    require_ai(&state)?;
    parse_url(&url).map_err(|e| scrape_error(&e))?;

    let job_id = state.start_job();
    info!(%job_id, %url, "job accepted");

    let length = payload.summary_length;
    tokio::spawn(async move {
        let status = match run_scrape_and_summarize(&state, &url, length).await {
            Ok(result) => JobStatus::Done { result },
            Err(err) => {
                let error = error_message(&err);
                warn!(%job_id, %error, "job failed");
                JobStatus::Failed { error }
            }
        };
        state.finish_job(job_id, status);
    });

    Ok((StatusCode::ACCEPTED, Json(JobCreated { job_id })))
}

/// GET /api/jobs/{id}
pub async fn poll_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobPollResponse>, ApiError> {
    let status = state
        .job_status(&id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Job not found"))?;

    let resp = match status {
        JobStatus::Pending => JobPollResponse {
            status: "pending",
            result: None,
            error: None,
        },
        JobStatus::Done { result } => JobPollResponse {
            status: "done",
            result: Some(result),
            error: None,
        },
        JobStatus::Failed { error } => JobPollResponse {
            status: "failed",
            result: None,
            error: Some(error),
        },
    };
    Ok(Json(resp))
}
