// Daemon-mode driver: runs the monitoring cycle on a fixed interval, logs cumulative stats,
// and VACUUMs the store on a cron schedule (local time) or a fixed interval.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::interval;
use tracing::{Instrument, debug, info, warn};

use crate::collector::MetricCollector;
use crate::config::AppConfig;
use crate::cycle::MonitoringCycle;
use crate::metric_store::MetricStore;
use crate::notify::AlertSink;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub check_interval_secs: u64,
    pub stats_log_interval_secs: u64,
    /// Cron expression for VACUUM, e.g. "0 0 3 * * *" (03:00 daily).
    pub vacuum_schedule: Option<String>,
    /// VACUUM every N seconds when `vacuum_schedule` is unset.
    pub vacuum_interval_secs: u64,
}

impl From<&AppConfig> for SchedulerConfig {
    fn from(c: &AppConfig) -> Self {
        Self {
            check_interval_secs: c.monitoring.check_interval_secs,
            stats_log_interval_secs: c.monitoring.stats_log_interval_secs,
            vacuum_schedule: c.database.vacuum_schedule.clone(),
            vacuum_interval_secs: c.database.vacuum_interval_secs,
        }
    }
}

/// Running totals since the scheduler started.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub cycles: u64,
    pub cycles_aborted: u64,
    pub samples_written: u64,
    pub alerts_raised: u64,
    pub partial_failures: u64,
    pub vacuums: u64,
}

/// Spawn the scheduler. The first cycle runs immediately. Sending on (or dropping) the
/// shutdown sender stops the loop after the current cycle; the handle yields the totals.
pub fn spawn<C, S>(
    mut cycle: MonitoringCycle<C, S>,
    store: Arc<MetricStore>,
    config: SchedulerConfig,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<SchedulerStats>
where
    C: MetricCollector + Send + Sync + 'static,
    S: AlertSink + Send + Sync + 'static,
{
    let span = tracing::info_span!("scheduler", check_interval_secs = config.check_interval_secs);
    tokio::spawn(
        async move {
            let mut check_tick = interval(Duration::from_secs(config.check_interval_secs));
            check_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut stats_log_tick = interval(Duration::from_secs(config.stats_log_interval_secs));
            stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first stats tick fires immediately; nothing to report yet.
            stats_log_tick.tick().await;

            let (vacuum_tx, mut vacuum_rx) = mpsc::channel::<()>(1);
            let vacuum_task = tokio::spawn(vacuum_scheduler(config.clone(), vacuum_tx));

            let mut stats = SchedulerStats::default();

            loop {
                tokio::select! {
                    _ = check_tick.tick() => {
                        let result = cycle.run().await;
                        stats.cycles += 1;
                        stats.samples_written += result.samples_written as u64;
                        stats.alerts_raised += result.alerts_raised as u64;
                        stats.partial_failures += result.errors.len() as u64;
                        if result.is_aborted() {
                            stats.cycles_aborted += 1;
                        }
                    }
                    Some(()) = vacuum_rx.recv() => {
                        if let Err(e) = store.vacuum().await {
                            warn!(error = %e, operation = "vacuum", "vacuum failed");
                        } else {
                            stats.vacuums += 1;
                            info!("vacuum complete");
                        }
                    }
                    _ = stats_log_tick.tick() => {
                        info!(
                            cycles = stats.cycles,
                            cycles_aborted = stats.cycles_aborted,
                            samples_written = stats.samples_written,
                            alerts_raised = stats.alerts_raised,
                            partial_failures = stats.partial_failures,
                            vacuums = stats.vacuums,
                            "monitor stats"
                        );
                    }
                    _ = &mut shutdown_rx => {
                        debug!("scheduler shutting down");
                        break;
                    }
                }
            }
            vacuum_task.abort();
            stats
        }
        .instrument(span),
    )
}

/// Time until the next cron fire after `now`, `None` when the schedule never fires again.
pub fn next_cron_delay(
    schedule: &cron::Schedule,
    now: chrono::DateTime<chrono::Local>,
) -> Option<Duration> {
    let next = schedule.after(&now).next()?;
    Some((next - now).to_std().unwrap_or(Duration::from_secs(1)))
}

/// Sends on `tx` at every VACUUM time.
///
/// Cycle pruning only deletes rows; SQLite keeps the freed pages. VACUUM rewrites the whole file
/// and holds the write lock while it does, so it runs rarely and on its own clock (ideally off
/// hours) instead of after every prune.
async fn vacuum_scheduler(config: SchedulerConfig, tx: mpsc::Sender<()>) {
    let schedule = match config.vacuum_schedule.as_deref().map(cron::Schedule::from_str) {
        None => None,
        Some(Ok(schedule)) => Some(schedule),
        Some(Err(e)) => {
            warn!(error = %e, "invalid vacuum_schedule; VACUUM will not run");
            return;
        }
    };
    let every = Duration::from_secs(config.vacuum_interval_secs);
    loop {
        let delay = match &schedule {
            Some(schedule) => match next_cron_delay(schedule, chrono::Local::now()) {
                Some(delay) => delay,
                None => {
                    debug!("vacuum_schedule has no future fire time");
                    return;
                }
            },
            None => every,
        };
        tokio::time::sleep(delay).await;
        if tx.send(()).await.is_err() {
            break;
        }
    }
}
