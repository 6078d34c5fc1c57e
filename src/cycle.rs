// One monitoring pass: collect -> persist -> evaluate & alert -> prune.
// Only a store failure while persisting samples aborts; everything else is recorded and the
// cycle moves on.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::collector::MetricCollector;
use crate::config::{AppConfig, ThresholdConfig};
use crate::error::{CollectionError, CycleError};
use crate::evaluator;
use crate::metric_store::{ALERT_RETENTION_DAYS, MS_PER_DAY, MetricStore, now_ms};
use crate::models::{SampleBatch, SampleKind};
use crate::notify::AlertSink;

/// Settings the cycle needs, resolved once from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct CycleConfig {
    pub monitored_paths: Vec<String>,
    pub thresholds: ThresholdConfig,
    pub retention_days: u32,
    /// Upper bound for every single collector call.
    pub collector_timeout: Duration,
}

impl From<&AppConfig> for CycleConfig {
    fn from(c: &AppConfig) -> Self {
        Self {
            monitored_paths: c.monitoring.monitored_paths.clone(),
            thresholds: c.thresholds,
            retention_days: c.database.retention_days,
            collector_timeout: Duration::from_secs(c.monitoring.collector_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// All phases ran; `errors` may still hold partial failures.
    Completed,
    /// Sample persistence failed; evaluate and prune were skipped.
    Aborted { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleResult {
    pub samples_written: usize,
    pub alerts_raised: usize,
    pub errors: Vec<CycleError>,
    pub outcome: CycleOutcome,
}

impl CycleResult {
    pub fn is_aborted(&self) -> bool {
        matches!(self.outcome, CycleOutcome::Aborted { .. })
    }
}

pub struct MonitoringCycle<C, S> {
    store: Arc<MetricStore>,
    collector: C,
    sink: S,
    config: CycleConfig,
}

impl<C, S> MonitoringCycle<C, S>
where
    C: MetricCollector + Sync,
    S: AlertSink + Sync,
{
    pub fn new(store: Arc<MetricStore>, collector: C, sink: S, config: CycleConfig) -> Self {
        Self {
            store,
            collector,
            sink,
            config,
        }
    }

    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    /// Run one cycle now. `&mut self` keeps a single cycle from overlapping itself.
    pub async fn run(&mut self) -> CycleResult {
        self.run_at(now_ms()).await
    }

    /// Run one cycle as if the clock read `now` (write stamp and prune cutoffs).
    #[instrument(skip(self), fields(operation = "run_cycle", paths = self.config.monitored_paths.len()))]
    pub async fn run_at(&mut self, now: i64) -> CycleResult {
        let mut errors = Vec::new();

        let batch = self.collect(&mut errors).await;
        debug!(
            collected = batch.len(),
            failures = errors.len(),
            "collect phase done"
        );

        let samples_written = match self.store.insert_samples_at(&batch, now).await {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, operation = "insert_samples", "persist failed; cycle aborted");
                return CycleResult {
                    samples_written: 0,
                    alerts_raised: 0,
                    errors,
                    outcome: CycleOutcome::Aborted {
                        message: e.to_string(),
                    },
                };
            }
        };

        let alerts_raised = self.evaluate_and_alert(&batch, now, &mut errors).await;
        self.prune(now, &mut errors).await;

        info!(
            samples_written,
            alerts_raised,
            partial_failures = errors.len(),
            "cycle completed"
        );
        CycleResult {
            samples_written,
            alerts_raised,
            errors,
            outcome: CycleOutcome::Completed,
        }
    }

    async fn collect(&self, errors: &mut Vec<CycleError>) -> SampleBatch {
        let mut batch = SampleBatch::default();
        for path in &self.config.monitored_paths {
            let path = path.as_str();
            match self
                .bounded(SampleKind::DiskUsage, Some(path), self.collector.collect_disk_usage(path))
                .await
            {
                Ok(s) => batch.disk_usage.push(s),
                Err(e) => record_collection(errors, &e),
            }
            match self
                .bounded(SampleKind::InodeUsage, Some(path), self.collector.collect_inode_usage(path))
                .await
            {
                Ok(s) => batch.inode_usage.push(s),
                Err(e) => record_collection(errors, &e),
            }
            match self
                .bounded(
                    SampleKind::FilesystemHealth,
                    Some(path),
                    self.collector.collect_filesystem_health(path),
                )
                .await
            {
                Ok(s) => batch.filesystem_health.push(s),
                Err(e) => record_collection(errors, &e),
            }
        }
        match self
            .bounded(SampleKind::SystemHealth, None, self.collector.collect_system_health())
            .await
        {
            Ok(s) => batch.system_health.push(s),
            Err(e) => record_collection(errors, &e),
        }
        batch
    }

    async fn bounded<T>(
        &self,
        kind: SampleKind,
        path: Option<&str>,
        call: impl Future<Output = Result<T, CollectionError>>,
    ) -> Result<T, CollectionError> {
        let timeout = self.config.collector_timeout;
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CollectionError::TimedOut {
                kind,
                path: path.map(str::to_owned),
                timeout,
            }),
        }
    }

    /// Evaluate the fresh batch, persist drafts, then hand them to the sink. Returns the number
    /// of alerts raised.
    async fn evaluate_and_alert(
        &self,
        batch: &SampleBatch,
        now: i64,
        errors: &mut Vec<CycleError>,
    ) -> usize {
        let drafts = evaluator::evaluate(&batch.disk_usage, &batch.inode_usage, &self.config.thresholds);
        if drafts.is_empty() {
            return 0;
        }
        if let Err(e) = self.store.insert_alerts_at(&drafts, now).await {
            warn!(error = %e, operation = "insert_alerts", alerts = drafts.len(), "alert persistence failed");
            errors.push(CycleError::AlertPersistence {
                message: e.to_string(),
            });
        }
        if let Err(e) = self.sink.deliver(&drafts).await {
            warn!(error = %e, operation = "deliver_alerts", "alert delivery failed");
        }
        drafts.len()
    }

    async fn prune(&self, now: i64, errors: &mut Vec<CycleError>) {
        let cutoff = now - i64::from(self.config.retention_days) * MS_PER_DAY;
        for kind in SampleKind::ALL {
            match self.store.prune_older_than(kind, cutoff).await {
                Ok(0) => {}
                Ok(n) => debug!(%kind, deleted = n, "pruned"),
                Err(e) => {
                    warn!(%kind, error = %e, operation = "prune_older_than", "prune failed");
                    errors.push(CycleError::Prune {
                        kind: Some(kind),
                        message: e.to_string(),
                    });
                }
            }
        }
        let alert_cutoff = now - ALERT_RETENTION_DAYS * MS_PER_DAY;
        match self.store.prune_alerts_older_than(alert_cutoff).await {
            Ok(0) => {}
            Ok(n) => debug!(deleted = n, "pruned alerts"),
            Err(e) => {
                warn!(error = %e, operation = "prune_alerts_older_than", "alert prune failed");
                errors.push(CycleError::Prune {
                    kind: None,
                    message: e.to_string(),
                });
            }
        }
    }
}

fn record_collection(errors: &mut Vec<CycleError>, e: &CollectionError) {
    warn!(
        kind = %e.kind(),
        path = e.path().unwrap_or("host"),
        error = %e,
        "collection failed; skipping"
    );
    errors.push(CycleError::from(e));
}
