use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

use crate::design::chain::RetryPolicy;
use crate::design::orchestrator::DEFAULT_CANDIDATE_COUNT;
use crate::design::template_cache::DEFAULT_TTL_SECS;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Remote template endpoint. Curated templates only when unset.
    pub template_source_url: Option<String>,
    pub template_cache_ttl_secs: i64,
    pub candidate_count: usize,
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
    pub pipeline_deadline_secs: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            template_source_url: optional_env("TEMPLATE_SOURCE_URL"),
            template_cache_ttl_secs: parse_env_or("TEMPLATE_CACHE_TTL_SECS", DEFAULT_TTL_SECS)?,
            candidate_count: parse_env_or("DESIGN_CANDIDATE_COUNT", DEFAULT_CANDIDATE_COUNT)?,
            max_attempts: parse_env_or("DESIGN_MAX_ATTEMPTS", 3)?,
            retry_backoff_ms: parse_env_or("DESIGN_RETRY_BACKOFF_MS", 2000)?,
            pipeline_deadline_secs: optional_env("DESIGN_PIPELINE_DEADLINE_SECS")
                .map(|v| {
                    v.parse::<u64>()
                        .context("DESIGN_PIPELINE_DEADLINE_SECS must be a whole number of seconds")
                })
                .transpose()?,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.max_attempts, Duration::from_millis(self.retry_backoff_ms))
    }

    pub fn pipeline_deadline(&self) -> Option<Duration> {
        self.pipeline_deadline_secs.map(Duration::from_secs)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Fixed config for handler tests. Never touches the process environment.
    pub fn for_tests() -> Self {
        Config {
            anthropic_api_key: "test-key".to_string(),
            port: 0,
            rust_log: "info".to_string(),
            template_source_url: None,
            template_cache_ttl_secs: DEFAULT_TTL_SECS,
            candidate_count: DEFAULT_CANDIDATE_COUNT,
            max_attempts: 3,
            retry_backoff_ms: 0,
            pipeline_deadline_secs: None,
        }
    }
}
