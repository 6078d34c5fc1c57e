// Report payloads for daily, weekly and monthly summaries. Output is data only; rendering
// (text, charts) happens elsewhere.

pub mod recommendations;
pub mod stats;

pub use stats::{AlertSummary, HealthAggregate, PeriodStatistics};

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::instrument;

use crate::analysis::cleanup::rollup;
use crate::analysis::{
    CleanupEffectivenessAnalyzer, CleanupRollup, PathEffectiveness, TrendAnalyzer, TrendReport,
};
use crate::error::StoreError;
use crate::metric_store::{MS_PER_DAY, MetricStore, TimeRange, now_ms};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportGranularity {
    Daily,
    Weekly,
    Monthly,
}

impl ReportGranularity {
    /// Length of the primary window (cleanup, alerts, statistics).
    pub fn window_days(self) -> u32 {
        match self {
            ReportGranularity::Daily => 1,
            ReportGranularity::Weekly => 7,
            ReportGranularity::Monthly => 30,
        }
    }

    /// Length of the longer window trends are computed over.
    pub fn trend_days(self) -> u32 {
        match self {
            ReportGranularity::Daily => 7,
            ReportGranularity::Weekly => 30,
            ReportGranularity::Monthly => 90,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportGranularity::Daily => "daily",
            ReportGranularity::Weekly => "weekly",
            ReportGranularity::Monthly => "monthly",
        }
    }
}

impl fmt::Display for ReportGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportGranularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(ReportGranularity::Daily),
            "weekly" => Ok(ReportGranularity::Weekly),
            "monthly" => Ok(ReportGranularity::Monthly),
            other => Err(format!("unknown report granularity: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportPayload {
    pub granularity: ReportGranularity,
    pub generated_at: i64,
    pub window: TimeRange,
    pub trend_window: TimeRange,
    pub cleanup: BTreeMap<String, PathEffectiveness>,
    pub cleanup_rollup: Option<CleanupRollup>,
    pub trends: TrendReport,
    pub alerts: AlertSummary,
    /// Monthly reports only.
    pub statistics: Option<PeriodStatistics>,
    pub recommendations: Vec<String>,
}

pub struct ReportAssembler<'a> {
    store: &'a MetricStore,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(store: &'a MetricStore) -> Self {
        Self { store }
    }

    /// Report over the default window for `granularity`, ending now.
    pub async fn build(&self, granularity: ReportGranularity) -> Result<ReportPayload, StoreError> {
        let now = now_ms();
        self.build_report(
            TimeRange::since(now - i64::from(granularity.window_days()) * MS_PER_DAY),
            granularity,
        )
        .await
    }

    /// Report over `window`. Trends use the granularity's longer context window ending where
    /// `window` ends.
    #[instrument(skip(self), fields(operation = "build_report"))]
    pub async fn build_report(
        &self,
        window: TimeRange,
        granularity: ReportGranularity,
    ) -> Result<ReportPayload, StoreError> {
        let generated_at = now_ms();
        let end = window.until.unwrap_or(generated_at);
        let trend_window = TimeRange {
            since: end - i64::from(granularity.trend_days()) * MS_PER_DAY,
            until: window.until,
        };

        let cleanup = CleanupEffectivenessAnalyzer::new(self.store)
            .analyze(window)
            .await?;
        let trends = TrendAnalyzer::new(self.store).analyze(trend_window).await?;
        let alert_rows = self.store.alerts_range(window).await?;
        let alerts = stats::summarize_alerts(&alert_rows);

        let (statistics, recommendations) = match granularity {
            ReportGranularity::Monthly => {
                let health = self.store.system_health_range(window).await?;
                (
                    Some(stats::period_statistics(&health, alerts.total)),
                    recommendations::monthly(&cleanup, &trends, &alerts),
                )
            }
            ReportGranularity::Daily | ReportGranularity::Weekly => {
                (None, recommendations::general(&trends, &alerts))
            }
        };

        tracing::info!(
            %granularity,
            paths = cleanup.len(),
            alerts = alerts.total,
            "report assembled"
        );
        Ok(ReportPayload {
            granularity,
            generated_at,
            window,
            trend_window,
            cleanup_rollup: rollup(&cleanup),
            cleanup,
            trends,
            alerts,
            statistics,
            recommendations,
        })
    }
}
