//! Scrape orchestrator.
//!
//! One call to [`Scraper::scrape_and_encode`] is one scrape: reset the gauge
//! families, fetch assets and programs, fan out three calls per program,
//! aggregate, publish, encode. The registry's write lock is held for the whole
//! sequence, so overlapping pulls queue up instead of interleaving.

use crate::application::scrape_result::ScrapeResult;
use crate::domain::errors::{ApiError, ScrapeError};
use crate::domain::ports::BountyPlatform;
use crate::infrastructure::observability::Metrics;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// Inputs the scraper treats as immutable for the process lifetime
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    pub organization_id: String,
    /// Deadline for one whole scrape
    pub timeout: Duration,
    /// Max distinct weakness series per scrape, 0 = unbounded
    pub weakness_label_limit: usize,
}

/// What a single scrape did, for logs and callers that care
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeSummary {
    pub programs: usize,
    pub errors: u32,
    pub deadline_exceeded: bool,
    pub elapsed: Duration,
}

pub struct Scraper {
    platform: Arc<dyn BountyPlatform>,
    metrics: RwLock<Metrics>,
    settings: ScrapeSettings,
}

impl Scraper {
    pub fn new(
        platform: Arc<dyn BountyPlatform>,
        metrics: Metrics,
        settings: ScrapeSettings,
    ) -> Self {
        Self {
            platform,
            metrics: RwLock::new(metrics),
            settings,
        }
    }

    /// Run a scrape and serialize the registry inside the same critical section.
    pub async fn scrape_and_encode(&self) -> Result<String, ScrapeError> {
        let metrics = self.metrics.write().await;
        self.run(&metrics).await;
        Ok(metrics.encode()?)
    }

    /// Run a scrape without encoding.
    pub async fn scrape(&self) -> ScrapeSummary {
        let metrics = self.metrics.write().await;
        self.run(&metrics).await
    }

    /// Handle on the registry; cloned metrics share the underlying series.
    pub async fn metrics(&self) -> Metrics {
        self.metrics.read().await.clone()
    }

    async fn run(&self, metrics: &Metrics) -> ScrapeSummary {
        metrics.reset();
        let started = Instant::now();
        // Observes into the histogram on drop, including when the pull is cancelled
        let _timer = metrics.start_scrape_timer();

        let org = self.settings.organization_id.as_str();
        let mut pass = ScrapePass {
            metrics,
            deadline: tokio::time::Instant::now() + self.settings.timeout,
            errors: 0,
            deadline_exceeded: false,
        };
        let mut result = ScrapeResult::new(self.settings.weakness_label_limit);

        info!("Scraper: Starting HackerOne metrics scrape");

        if let Some(assets) = pass.call("assets", None, self.platform.fetch_assets(org)).await {
            result.asset_count = Some(assets.len() as u64);
        }

        let programs = pass
            .call("programs", None, self.platform.fetch_programs())
            .await
            .unwrap_or_default();

        for program in &programs {
            if pass.deadline_exceeded {
                break;
            }
            result.record_program(&program.handle);

            let handle = Some(program.handle.as_str());
            if let Some(reports) = pass
                .call("reports", handle, self.platform.fetch_reports(&program.handle))
                .await
            {
                result.record_reports(&reports);
            }
            if let Some(hackers) = pass
                .call(
                    "invited_hackers",
                    handle,
                    self.platform.fetch_invited_hackers(&program.id),
                )
                .await
            {
                result.record_invited_hackers(&hackers);
            }
            if let Some(weaknesses) = pass
                .call("weaknesses", handle, self.platform.fetch_weaknesses(&program.id))
                .await
            {
                result.record_weaknesses(&weaknesses);
            }
        }

        if !result.dropped_weaknesses.is_empty() {
            warn!(
                limit = self.settings.weakness_label_limit,
                dropped = result.dropped_weaknesses.len(),
                "Scraper: Weakness label limit reached, extra series dropped"
            );
        }

        result.apply(metrics, org);
        metrics.mark_scrape_completed(unix_now(), pass.errors == 0);

        let summary = ScrapeSummary {
            programs: result.programs.len(),
            errors: pass.errors,
            deadline_exceeded: pass.deadline_exceeded,
            elapsed: started.elapsed(),
        };
        info!(
            programs = summary.programs,
            errors = summary.errors,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Scraper: HackerOne metrics scrape completed"
        );
        summary
    }
}

/// Error accounting and deadline enforcement for one scrape
struct ScrapePass<'a> {
    metrics: &'a Metrics,
    deadline: tokio::time::Instant,
    errors: u32,
    deadline_exceeded: bool,
}

impl ScrapePass<'_> {
    /// Await one upstream call. Failures are counted and logged, never returned.
    async fn call<T, F>(&mut self, resource: &str, program: Option<&str>, fut: F) -> Option<T>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        if self.deadline_exceeded {
            return None;
        }

        match tokio::time::timeout_at(self.deadline, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                self.errors += 1;
                self.metrics.inc_scrape_errors();
                error!(
                    resource,
                    program = program.unwrap_or("-"),
                    endpoint = e.endpoint(),
                    kind = e.kind(),
                    "Scraper: Failed getting {}: {}",
                    resource,
                    e
                );
                None
            }
            Err(_) => {
                self.errors += 1;
                self.deadline_exceeded = true;
                self.metrics.inc_scrape_errors();
                warn!(
                    resource,
                    program = program.unwrap_or("-"),
                    "Scraper: Scrape deadline exceeded, remaining calls skipped"
                );
                None
            }
        }
    }
}

fn unix_now() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
