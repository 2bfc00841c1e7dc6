//! TTL cache over the remote template source.
//!
//! Contract: `get_or_refresh()` never fails. A fresh entry is served as-is; a
//! missing or expired entry triggers exactly one fetch by the calling task.
//! Concurrent callers that see the same expiry may each fetch; no refresh
//! deduplication is attempted.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::design::contrast::is_six_digit_hex;
use crate::design::templates::DesignTemplate;

pub const DEFAULT_TTL_SECS: i64 = 300;

#[derive(Debug, Error)]
pub enum TemplateSourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("template source returned status {0}")]
    Status(u16),
}

/// Time source, injected so expiry can be tested without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Where extra templates come from. Failures are non-fatal by contract.
#[async_trait]
pub trait RemoteTemplateSource: Send + Sync {
    async fn fetch_templates(&self) -> Result<Vec<DesignTemplate>, TemplateSourceError>;
}

/// Used when no remote source is configured.
pub struct NoRemoteTemplates;

#[async_trait]
impl RemoteTemplateSource for NoRemoteTemplates {
    async fn fetch_templates(&self) -> Result<Vec<DesignTemplate>, TemplateSourceError> {
        Ok(Vec::new())
    }
}

/// Fetches a JSON array of templates from a fixed URL.
pub struct HttpTemplateSource {
    client: Client,
    url: String,
}

impl HttpTemplateSource {
    pub fn new(url: String) -> Result<Self, TemplateSourceError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl RemoteTemplateSource for HttpTemplateSource {
    async fn fetch_templates(&self) -> Result<Vec<DesignTemplate>, TemplateSourceError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TemplateSourceError::Status(status.as_u16()));
        }
        Ok(response.json::<Vec<DesignTemplate>>().await?)
    }
}

struct CacheEntry {
    templates: Vec<DesignTemplate>,
    fetched_at: DateTime<Utc>,
}

pub struct TemplateCache {
    source: Arc<dyn RemoteTemplateSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entry: RwLock<Option<CacheEntry>>,
}

impl TemplateCache {
    pub fn new(source: Arc<dyn RemoteTemplateSource>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            source,
            clock,
            ttl,
            entry: RwLock::new(None),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.fetched_at < self.ttl
    }

    /// Serves the cached remote templates, refetching when missing or expired.
    /// On fetch failure: the previous entry if still within TTL, else empty.
    pub async fn get_or_refresh(&self) -> Vec<DesignTemplate> {
        let now = self.clock.now();
        if let Some(entry) = self.entry.read().await.as_ref() {
            if self.is_fresh(entry, now) {
                debug!("Remote templates served from cache");
                return entry.templates.clone();
            }
        }

        match self.source.fetch_templates().await {
            Ok(fetched) => {
                let templates = retain_valid(fetched);
                info!(count = templates.len(), "Remote templates refreshed");
                *self.entry.write().await = Some(CacheEntry {
                    templates: templates.clone(),
                    fetched_at: now,
                });
                templates
            }
            Err(e) => {
                warn!("Remote template fetch failed: {e}");
                let now = self.clock.now();
                match self.entry.read().await.as_ref() {
                    Some(entry) if self.is_fresh(entry, now) => entry.templates.clone(),
                    _ => Vec::new(),
                }
            }
        }
    }

    /// Drops the cached entry; the next `get_or_refresh` fetches.
    pub async fn invalidate(&self) {
        *self.entry.write().await = None;
    }
}

/// Keeps the accent-colour invariant for templates we do not control.
fn retain_valid(templates: Vec<DesignTemplate>) -> Vec<DesignTemplate> {
    templates
        .into_iter()
        .filter(|t| {
            let ok = is_six_digit_hex(&t.accent_color) && !t.name.trim().is_empty();
            if !ok {
                warn!(
                    name = %t.name,
                    accent = %t.accent_color,
                    "Dropping remote template with invalid name or accent colour"
                );
            }
            ok
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::design::templates::TemplateStyle;

    pub struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self {
                now: Mutex::new(Utc::now()),
            }
        }
    }

    impl ManualClock {
        pub fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now = *now + by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    /// Serves a fixed list, or fails while `failing` is set.
    pub struct StubSource {
        templates: Vec<DesignTemplate>,
        failing: Mutex<bool>,
        calls: AtomicU32,
    }

    impl StubSource {
        pub fn ok(templates: Vec<DesignTemplate>) -> Self {
            Self {
                templates,
                failing: Mutex::new(false),
                calls: AtomicU32::new(0),
            }
        }

        pub fn set_failing(&self, failing: bool) {
            *self.failing.lock().unwrap() = failing;
        }

        pub fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RemoteTemplateSource for StubSource {
        async fn fetch_templates(&self) -> Result<Vec<DesignTemplate>, TemplateSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if *self.failing.lock().unwrap() {
                Err(TemplateSourceError::Status(503))
            } else {
                Ok(self.templates.clone())
            }
        }
    }

    pub fn remote_template(name: &str, accent: &str) -> DesignTemplate {
        DesignTemplate {
            name: name.to_string(),
            style: TemplateStyle::Modern,
            layout: "single-column".to_string(),
            sidebar: "none".to_string(),
            gradient: "none".to_string(),
            accent_color: accent.to_string(),
            fonts: ["Inter".to_string(), "Inter".to_string()],
            description: "remote".to_string(),
        }
    }

    fn setup(templates: Vec<DesignTemplate>) -> (Arc<StubSource>, Arc<ManualClock>, TemplateCache) {
        let source = Arc::new(StubSource::ok(templates));
        let clock = Arc::new(ManualClock::default());
        let cache = TemplateCache::new(
            source.clone(),
            clock.clone(),
            Duration::seconds(DEFAULT_TTL_SECS),
        );
        (source, clock, cache)
    }

    #[tokio::test]
    async fn test_fresh_entry_is_not_refetched() {
        let (source, clock, cache) = setup(vec![remote_template("Aurora", "#0369a1")]);
        assert_eq!(cache.get_or_refresh().await.len(), 1);
        clock.advance(Duration::seconds(299));
        assert_eq!(cache.get_or_refresh().await.len(), 1);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let (source, clock, cache) = setup(vec![remote_template("Aurora", "#0369a1")]);
        cache.get_or_refresh().await;
        clock.advance(Duration::seconds(300));
        cache.get_or_refresh().await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_after_expiry_degrades_to_empty() {
        let (source, clock, cache) = setup(vec![remote_template("Aurora", "#0369a1")]);
        assert_eq!(cache.get_or_refresh().await.len(), 1);
        clock.advance(Duration::minutes(6));
        source.set_failing(true);
        assert!(cache.get_or_refresh().await.is_empty());
    }

    #[tokio::test]
    async fn test_failure_on_cold_cache_is_empty_not_error() {
        let (source, _clock, cache) = setup(vec![remote_template("Aurora", "#0369a1")]);
        source.set_failing(true);
        assert!(cache.get_or_refresh().await.is_empty());
        source.set_failing(false);
        assert_eq!(cache.get_or_refresh().await.len(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let (source, _clock, cache) = setup(vec![remote_template("Aurora", "#0369a1")]);
        cache.get_or_refresh().await;
        cache.invalidate().await;
        cache.get_or_refresh().await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalid_remote_templates_are_dropped() {
        let (_source, _clock, cache) = setup(vec![
            remote_template("Aurora", "#0369a1"),
            remote_template("Broken", "blue"),
            remote_template("Short", "#abc"),
            remote_template("  ", "#123456"),
        ]);
        let templates = cache.get_or_refresh().await;
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "Aurora");
    }

    #[tokio::test]
    async fn test_no_remote_templates_source_is_empty() {
        let cache = TemplateCache::new(
            Arc::new(NoRemoteTemplates),
            Arc::new(SystemClock),
            Duration::seconds(DEFAULT_TTL_SECS),
        );
        assert!(cache.get_or_refresh().await.is_empty());
    }
}
