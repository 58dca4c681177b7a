use std::net::SocketAddr;
use std::time::Duration;

use blog_scraper_cli::ai::{DEFAULT_MODEL, DEFAULT_TARGET_LANGUAGE};
use thiserror::Error;

use crate::state::DEFAULT_JOB_TTL;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub client_url: String,
    pub bind_addr: SocketAddr,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub fetch_timeout: Duration,
    pub translate_language: String,
    pub job_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let bind_addr = match get("BIND_ADDR") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "BIND_ADDR",
                value: raw,
            })?,
            None => SocketAddr::from(([127, 0, 0, 1], 3000)),
        };

        let fetch_timeout = match get("FETCH_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "FETCH_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
            None => Duration::from_secs(10),
        };

        let job_ttl = match get("JOB_TTL_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "JOB_TTL_SECS",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_JOB_TTL,
        };

        Ok(Self {
            database_url: require("DATABASE_URL")?,
            client_url: require("CLIENT_URL")?,
            bind_addr,
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            fetch_timeout,
            translate_language: get("TRANSLATE_LANGUAGE")
                .unwrap_or_else(|| DEFAULT_TARGET_LANGUAGE.to_string()),
            job_ttl,
        })
    }
}
