use blog_scraper_cli::{ai::AIAnalyzer, scraper::Scraper, ExtractedDocument, Summary};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::store::BlogStore;

/// Output of one scrape-and-summarize run.
#[derive(Clone, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeSummary {
    pub scraped_data: ExtractedDocument,
    pub summary: Summary,
}

/// How long a finished job stays pollable.
pub const DEFAULT_JOB_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Clone, Debug)]
pub enum JobStatus {
    Pending,
    Done { result: ScrapeSummary },
    Failed { error: String },
}

#[derive(Clone, Debug)]
pub struct JobEntry {
    pub status: JobStatus,
    /// Set once the job leaves `Pending`.
    finished_at: Option<Instant>,
}

/// Everything a handler needs, built once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BlogStore>,
    pub scraper: Scraper,
    /// `None` when no Gemini API key is configured.
    pub ai: Option<AIAnalyzer>,
    pub translate_language: String,
    pub jobs: Arc<DashMap<Uuid, JobEntry>>,
    pub job_ttl: Duration,
}

impl AppState {
    pub fn new(
        store: Arc<dyn BlogStore>,
        scraper: Scraper,
        ai: Option<AIAnalyzer>,
        translate_language: String,
    ) -> Self {
        AppState {
            store,
            scraper,
            ai,
            translate_language,
            jobs: Arc::new(DashMap::new()),
            job_ttl: DEFAULT_JOB_TTL,
        }
    }

    pub fn with_job_ttl(mut self, ttl: Duration) -> Self {
        self.job_ttl = ttl;
        self
    }

    /// Register a new pending job, dropping expired ones first.
    pub fn start_job(&self) -> Uuid {
        self.sweep_jobs();
        let id = Uuid::new_v4();
        self.jobs.insert(
            id,
            JobEntry {
                status: JobStatus::Pending,
                finished_at: None,
            },
        );
        id
    }

    pub fn finish_job(&self, id: Uuid, status: JobStatus) {
        self.jobs.insert(
            id,
            JobEntry {
                status,
                finished_at: Some(Instant::now()),
            },
        );
    }

    pub fn job_status(&self, id: &Uuid) -> Option<JobStatus> {
        let entry = self.jobs.get(id)?;
        match entry.finished_at {
            Some(at) if at.elapsed() >= self.job_ttl => None,
            _ => Some(entry.status.clone()),
        }
    }

    /// Remove finished jobs older than the TTL; returns how many went.
    pub fn sweep_jobs(&self) -> usize {
        let before = self.jobs.len();
        self.jobs
            .retain(|_, entry| entry.finished_at.map_or(true, |at| at.elapsed() < self.job_ttl));
        before - self.jobs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::state;

    #[test]
    fn finished_jobs_expire_after_ttl() {
        let app = state(None).with_job_ttl(Duration::ZERO);
        let pending = app.start_job();
        let finished = app.start_job();
        app.finish_job(
            finished,
            JobStatus::Failed {
                error: "boom".into(),
            },
        );

        assert!(app.job_status(&finished).is_none());
        assert_eq!(app.sweep_jobs(), 1);
        assert!(matches!(app.job_status(&pending), Some(JobStatus::Pending)));
        assert_eq!(app.jobs.len(), 1);
    }

    #[test]
    fn finished_jobs_stay_pollable_within_ttl() {
        let app = state(None);
        let id = app.start_job();
        app.finish_job(id, JobStatus::Failed { error: "boom".into() });

        assert_eq!(app.sweep_jobs(), 0);
        assert!(matches!(app.job_status(&id), Some(JobStatus::Failed { .. })));
    }
}
