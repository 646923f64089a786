use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::time::Instant;

use crate::config::SchedulerConfig;
use crate::extractor::extract_window;
use crate::fetcher::PageFetcher;
use crate::models::{Settings, StockStatus, Watch};
use crate::notifier::{Notifier, NotifyOutcome, format_message};
use crate::resolver::StatusResolver;
use crate::store::WatchStore;
use crate::tracker::reconcile;
use crate::utils::error::{AppError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CheckStage {
    Fetch,
    Resolve,
    Store,
    Notify,
}

impl fmt::Display for CheckStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckStage::Fetch => "fetch",
            CheckStage::Resolve => "resolve",
            CheckStage::Store => "store",
            CheckStage::Notify => "notify",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchOutcome {
    pub watch_id: i64,
    pub model: String,
    pub status: StockStatus,
    pub count: Option<i64>,
    pub changed: bool,
    pub notified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchFailure {
    pub watch_id: i64,
    pub model: String,
    pub stage: CheckStage,
    pub error: String,
    /// The check result reached the store before the failure.
    pub state_recorded: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CycleReport {
    pub checked: usize,
    pub changed: usize,
    pub notified: usize,
    pub skipped: usize,
    pub outcomes: Vec<WatchOutcome>,
    pub failures: Vec<WatchFailure>,
    pub duration_ms: u64,
}

impl CycleReport {
    fn record(&mut self, result: std::result::Result<Option<WatchOutcome>, WatchFailure>) {
        match result {
            Ok(Some(outcome)) => {
                self.checked += 1;
                if outcome.changed {
                    self.changed += 1;
                }
                if outcome.notified {
                    self.notified += 1;
                }
                self.outcomes.push(outcome);
            }
            Ok(None) => self.skipped += 1,
            Err(failure) => {
                if failure.state_recorded {
                    self.checked += 1;
                }
                self.failures.push(failure);
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drives the fixed-interval check loop over all enabled watches.
///
/// Watches are processed one at a time. A failure in one watch is logged
/// and recorded in the cycle report; it never stops the remaining watches
/// or the loop itself.
pub struct StockScheduler {
    store: Arc<dyn WatchStore>,
    fetcher: Arc<dyn PageFetcher>,
    notifier: Arc<dyn Notifier>,
    config: SchedulerConfig,
}

impl StockScheduler {
    pub fn new(
        store: Arc<dyn WatchStore>,
        fetcher: Arc<dyn PageFetcher>,
        notifier: Arc<dyn Notifier>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            store,
            fetcher,
            notifier,
            config,
        }
    }

    /// Run cycles forever. The sleep starts when a cycle ends, so the
    /// effective period is interval plus cycle duration.
    pub async fn run_forever(&self) {
        tracing::info!(
            "Stock scheduler started, interval = {} seconds, always_notify = {}",
            self.config.interval_seconds,
            self.config.always_notify
        );

        loop {
            match self.run_cycle().await {
                Ok(report) => log_report(&report),
                Err(e) => tracing::error!("Check cycle aborted: {}", e),
            }

            tokio::time::sleep(self.config.interval()).await;
        }
    }

    /// One pass over the enabled watches.
    ///
    /// Only a failure to load the settings/watch snapshot is returned as an
    /// error; everything per watch ends up in the report.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let start_time = Instant::now();

        let settings = self.store.load_settings().await?;
        let watches = self.store.enabled_watches().await?;
        tracing::debug!("Loaded {} enabled watches", watches.len());

        let mut report = CycleReport::default();
        for watch in &watches {
            let result = self.check_watch(&settings, watch).await;
            if let Err(failure) = &result {
                tracing::warn!(
                    "Watch {} ({}) failed at {}: {}",
                    failure.watch_id,
                    failure.model,
                    failure.stage,
                    failure.error
                );
            }
            report.record(result);
        }

        report.duration_ms = start_time.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// Fetch, resolve, reconcile, persist and maybe notify for one watch.
    ///
    /// `Ok(None)` means the watch vanished from the store after the snapshot
    /// was taken.
    pub async fn check_watch(
        &self,
        settings: &Settings,
        watch: &Watch,
    ) -> std::result::Result<Option<WatchOutcome>, WatchFailure> {
        let fail = |stage: CheckStage, state_recorded: bool| {
            move |e: AppError| WatchFailure {
                watch_id: watch.id,
                model: watch.model.clone(),
                stage,
                error: e.to_string(),
                state_recorded,
            }
        };

        let body = self
            .fetcher
            .fetch(&watch.url)
            .await
            .map_err(fail(CheckStage::Fetch, false))?;

        let fragment = extract_window(&body, &watch.model, watch.window_size());
        let resolution = StatusResolver::for_watch(watch)
            .map_err(fail(CheckStage::Resolve, false))?
            .resolve(fragment);

        tracing::debug!(
            "Watch {} ({}) resolved to {} {:?}",
            watch.id,
            watch.model,
            resolution.status,
            resolution.count
        );

        // Compare against the row as it is now, not as it was in the snapshot.
        let Some(current) = self
            .store
            .get_watch(watch.id)
            .await
            .map_err(fail(CheckStage::Store, false))?
        else {
            tracing::debug!("Watch {} disappeared during the cycle, skipping", watch.id);
            return Ok(None);
        };

        let now = Utc::now().timestamp();
        let reconciliation = reconcile(&current, resolution, now);

        self.store
            .record_check(current.id, &reconciliation.state)
            .await
            .map_err(fail(CheckStage::Store, false))?;

        let mut notified = false;
        if self.config.always_notify || reconciliation.changed {
            let text = format_message(&current.model, &current.url, &resolution);
            let outcome = self
                .notifier
                .notify(settings, &text)
                .await
                .map_err(fail(CheckStage::Notify, true))?;

            if outcome == NotifyOutcome::Sent {
                self.store
                    .record_notified(current.id, now)
                    .await
                    .map_err(fail(CheckStage::Store, true))?;
                notified = true;
            }
        }

        Ok(Some(WatchOutcome {
            watch_id: current.id,
            model: current.model,
            status: resolution.status,
            count: resolution.count,
            changed: reconciliation.changed,
            notified,
        }))
    }
}

fn log_report(report: &CycleReport) {
    if report.is_clean() {
        tracing::info!(
            "Check cycle finished in {}ms: {} checked, {} changed, {} notified",
            report.duration_ms,
            report.checked,
            report.changed,
            report.notified
        );
    } else {
        tracing::warn!(
            "Check cycle finished in {}ms: {} checked, {} changed, {} notified, {} failed",
            report.duration_ms,
            report.checked,
            report.changed,
            report.notified,
            report.failures.len()
        );
    }
}
