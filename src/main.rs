use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use hostwatch::collector::HostCollector;
use hostwatch::config::AppConfig;
use hostwatch::cycle::{CycleConfig, MonitoringCycle};
use hostwatch::metric_store::MetricStore;
use hostwatch::notify::LogAlertSink;
use hostwatch::report::{ReportAssembler, ReportGranularity};
use hostwatch::{scheduler, version};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

enum Mode {
    Run,
    Daemon,
    Report(ReportGranularity),
}

fn parse_mode(args: &[String]) -> Result<Mode> {
    match args.first().map(String::as_str) {
        None | Some("run") => Ok(Mode::Run),
        Some("daemon") => Ok(Mode::Daemon),
        Some("report") => {
            let g = args.get(1).map(String::as_str).unwrap_or("daily");
            let g = g.parse::<ReportGranularity>().map_err(anyhow::Error::msg)?;
            Ok(Mode::Report(g))
        }
        Some(other) => anyhow::bail!(
            "unknown command {other:?}; usage: {} [run | daemon | report <daily|weekly|monthly>]",
            version::NAME
        ),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = parse_mode(&args)?;
    let app_config = AppConfig::load();
    tracing::info!(version = %version::banner(), db = %app_config.database.path, "starting");

    let store = Arc::new(
        MetricStore::connect(&app_config.database.path)
            .await
            .with_context(|| format!("open metric store {}", app_config.database.path))?,
    );

    match mode {
        Mode::Run => {
            let mut cycle = build_cycle(&app_config, store);
            let result = cycle.run().await;
            if result.is_aborted() {
                tracing::error!(outcome = ?result.outcome, "monitoring cycle aborted");
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
        Mode::Daemon => {
            let cycle = build_cycle(&app_config, store.clone());
            let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
            let handle = scheduler::spawn(
                cycle,
                store,
                scheduler::SchedulerConfig::from(&app_config),
                shutdown_rx,
            );
            shutdown_signal().await;
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
            let stats = handle.await.context("scheduler task")?;
            tracing::info!(cycles = stats.cycles, cycles_aborted = stats.cycles_aborted, "stopped");
            Ok(ExitCode::SUCCESS)
        }
        Mode::Report(granularity) => {
            let payload = ReportAssembler::new(&store).build(granularity).await?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_cycle(
    app_config: &AppConfig,
    store: Arc<MetricStore>,
) -> MonitoringCycle<HostCollector, LogAlertSink> {
    let config = CycleConfig::from(app_config);
    // External commands must finish inside the per-call bound.
    let command_timeout = config
        .collector_timeout
        .saturating_sub(Duration::from_secs(1))
        .max(Duration::from_secs(1));
    MonitoringCycle::new(store, HostCollector::new(command_timeout), LogAlertSink, config)
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
