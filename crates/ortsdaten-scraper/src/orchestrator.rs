//! Scrape orchestration: job enumeration, batched concurrency, and
//! progress reporting.
//!
//! Cities are processed in concurrent batches of `batch_size`;
//! within one city task the categories run sequentially, separated by
//! the configured pacing delay, so a single caller never hammers one
//! upstream. Per-job failures are absorbed by the adapters — only
//! misconfiguration aborts a run, and it does so before any network
//! activity starts.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Mutex;
use tokio::time::Instant;

use ortsdaten_core::{catalog, AppConfig};

use crate::cancel::CancelFlag;
use crate::error::ScrapeError;
use crate::rate_limit::SourceRateLimiter;
use crate::source::SourceAdapter;
use crate::types::{PlaceRecord, ScrapeJob, UsageStats};

/// How a run ended. Per-job failures never prevent `Completed`;
/// `Cancelled` means the cooperative cancel flag stopped issuance
/// early, leaving the records collected so far intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Cancelled,
}

/// Result of a scrape run.
#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub records: Vec<PlaceRecord>,
    pub cities_processed: usize,
    pub jobs_attempted: usize,
    pub elapsed: Duration,
    /// Final usage counters; only meaningful in commercial mode.
    pub usage: UsageStats,
}

pub struct ScrapeOrchestrator {
    adapter: SourceAdapter,
    cities: Vec<String>,
    categories: Vec<String>,
    batch_size: usize,
    request_delay: Duration,
    commercial: bool,
    usage: Arc<Mutex<UsageStats>>,
    cancel: CancelFlag,
}

impl ScrapeOrchestrator {
    /// Builds an orchestrator from configuration: full catalog city
    /// list, configured categories, and the adapter selected by
    /// `config.use_google_places`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Config`] for commercial mode without an
    /// API key, or [`ScrapeError::Http`] if an HTTP client cannot be
    /// constructed. Either way the run is aborted before any network
    /// activity.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScrapeError> {
        let limiter = Arc::new(SourceRateLimiter::new());
        let usage = Arc::new(Mutex::new(UsageStats::default()));
        let adapter = SourceAdapter::from_config(config, limiter, Arc::clone(&usage))?;

        Ok(Self {
            commercial: config.use_google_places,
            adapter,
            cities: catalog::all_cities().map(str::to_owned).collect(),
            categories: config.categories.clone(),
            batch_size: config.batch_size.max(1),
            request_delay: Duration::from_millis(config.request_delay_ms),
            usage,
            cancel: CancelFlag::new(),
        })
    }

    /// Replaces the catalog city list (tests, partial runs).
    #[must_use]
    pub fn with_cities(mut self, cities: Vec<String>) -> Self {
        self.cities = cities;
        self
    }

    /// Handle for cooperative cancellation (e.g. wired to Ctrl-C).
    #[must_use]
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Total number of (city × category) jobs this run would issue.
    #[must_use]
    pub fn planned_jobs(&self) -> usize {
        self.cities.len() * self.categories.len()
    }

    /// Runs the full scrape: every city × category job, in batches.
    ///
    /// Returns `Completed` once all batches finish regardless of
    /// per-job failures, or `Cancelled` when the cancel flag stopped
    /// the run early. Either way the collected records are returned
    /// and safe to aggregate.
    pub async fn run(&self) -> RunReport {
        let started = Instant::now();
        tracing::info!(
            cities = self.cities.len(),
            categories = self.categories.len(),
            batch_size = self.batch_size,
            commercial = self.commercial,
            "starting scrape run"
        );

        let collected: Mutex<Vec<PlaceRecord>> = Mutex::new(Vec::new());
        let jobs_attempted = Mutex::new(0usize);
        let mut cities_processed = 0usize;

        for batch in self.cities.chunks(self.batch_size) {
            if self.cancel.is_cancelled() {
                break;
            }

            let tasks = batch
                .iter()
                .map(|city| self.scrape_city(city, &collected, &jobs_attempted));
            let completions = join_all(tasks).await;
            cities_processed += completions.iter().filter(|done| **done).count();

            let places_so_far = collected.lock().await.len();
            tracing::info!(
                cities_processed,
                total_cities = self.cities.len(),
                places_so_far,
                "batch complete"
            );
            if self.commercial {
                let usage = *self.usage.lock().await;
                tracing::info!(
                    searches = usage.searches_performed,
                    details = usage.details_fetched,
                    estimated_cost_usd = usage.estimated_cost_usd(),
                    free_tier_remaining_usd = usage.free_tier_remaining_usd(),
                    "commercial API usage"
                );
            }
        }

        let outcome = if self.cancel.is_cancelled() {
            RunOutcome::Cancelled
        } else {
            RunOutcome::Completed
        };
        let records = collected.into_inner();
        let elapsed = started.elapsed();
        tracing::info!(
            ?outcome,
            cities_processed,
            places = records.len(),
            elapsed_secs = elapsed.as_secs(),
            "scrape run finished"
        );

        RunReport {
            outcome,
            records,
            cities_processed,
            jobs_attempted: jobs_attempted.into_inner(),
            elapsed,
            usage: *self.usage.lock().await,
        }
    }

    /// Scrapes every category for one city, sequentially with pacing.
    /// Returns whether the city task ran to completion (false when
    /// cancelled part-way).
    async fn scrape_city(
        &self,
        city: &str,
        collected: &Mutex<Vec<PlaceRecord>>,
        jobs_attempted: &Mutex<usize>,
    ) -> bool {
        for category in &self.categories {
            if self.cancel.is_cancelled() {
                return false;
            }

            let job = ScrapeJob {
                city: city.to_owned(),
                category: category.clone(),
            };
            *jobs_attempted.lock().await += 1;

            let records = self.adapter.fetch(&job).await;
            if !records.is_empty() {
                tracing::debug!(city, category = %category, count = records.len(), "job yielded records");
                collected.lock().await.extend(records);
            }

            tokio::time::sleep(self.request_delay).await;
        }
        true
    }
}
