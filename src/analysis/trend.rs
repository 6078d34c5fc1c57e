// Trend analysis: recent mean, window min/max, and direction from mean successive change.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::instrument;

use super::{group_by_path, mean, mean_first_difference, min_max};
use crate::error::StoreError;
use crate::metric_store::{MetricStore, TimeRange};
use crate::models::{DiskUsageSample, SystemHealthSample, round_to};

/// Mean change per sample inside (-band, band) counts as noise. Fixed, not configurable.
pub const TREND_NOISE_BAND: f64 = 0.1;
/// `current_avg` covers at most this many of the newest samples.
pub const RECENT_SAMPLE_COUNT: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn classify(mean_difference: f64) -> Self {
        if mean_difference > TREND_NOISE_BAND {
            Trend::Increasing
        } else if mean_difference < -TREND_NOISE_BAND {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }

    /// Direction of an ordered series; single values and empty series are stable.
    pub fn of_series(values: &[f64]) -> Self {
        Self::classify(mean_first_difference(values))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricTrend {
    pub current_avg: f64,
    pub trend: Trend,
    pub max_value: f64,
    pub min_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SeriesTrend {
    NoData,
    Available(MetricTrend),
}

impl SeriesTrend {
    pub fn metric(&self) -> Option<&MetricTrend> {
        match self {
            SeriesTrend::NoData => None,
            SeriesTrend::Available(m) => Some(m),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskPathTrend {
    pub current_usage: f64,
    pub trend: Trend,
    pub max_usage: f64,
    pub min_usage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub cpu: SeriesTrend,
    pub memory: SeriesTrend,
    pub load_average: SeriesTrend,
    pub disk_usage: BTreeMap<String, DiskPathTrend>,
}

/// Analyze one ordered metric series.
pub fn analyze_series(values: &[f64]) -> SeriesTrend {
    let Some((min, max)) = min_max(values) else {
        return SeriesTrend::NoData;
    };
    let recent = &values[values.len().saturating_sub(RECENT_SAMPLE_COUNT)..];
    SeriesTrend::Available(MetricTrend {
        current_avg: round_to(mean(recent), 2),
        trend: Trend::of_series(values),
        max_value: round_to(max, 2),
        min_value: round_to(min, 2),
    })
}

/// Per-path disk trends; each path is classified on its own subsequence. A path needs at
/// least two samples to get an entry.
pub fn disk_trends_by_path(samples: &[DiskUsageSample]) -> BTreeMap<String, DiskPathTrend> {
    group_by_path(samples)
        .into_iter()
        .filter(|(_, group)| group.len() >= 2)
        .filter_map(|(path, group)| {
            let usage: Vec<f64> = group.iter().map(|s| s.usage_percent).collect();
            let (min, max) = min_max(&usage)?;
            let current = *usage.last()?;
            Some((
                path.to_string(),
                DiskPathTrend {
                    current_usage: round_to(current, 2),
                    trend: Trend::of_series(&usage),
                    max_usage: round_to(max, 2),
                    min_usage: round_to(min, 2),
                },
            ))
        })
        .collect()
}

/// cpu / memory / 1-minute load trends from host health samples.
pub fn system_trends(samples: &[SystemHealthSample]) -> (SeriesTrend, SeriesTrend, SeriesTrend) {
    let cpu: Vec<f64> = samples.iter().map(|s| s.cpu_percent).collect();
    let memory: Vec<f64> = samples.iter().map(|s| s.memory_percent).collect();
    let load: Vec<f64> = samples.iter().map(|s| s.load_avg_1).collect();
    (
        analyze_series(&cpu),
        analyze_series(&memory),
        analyze_series(&load),
    )
}

pub struct TrendAnalyzer<'a> {
    store: &'a MetricStore,
}

impl<'a> TrendAnalyzer<'a> {
    pub fn new(store: &'a MetricStore) -> Self {
        Self { store }
    }

    #[instrument(skip(self), fields(analyzer = "trend", operation = "analyze"))]
    pub async fn analyze(&self, range: TimeRange) -> Result<TrendReport, StoreError> {
        let health = self.store.system_health_range(range).await?;
        let disk = self.store.disk_usage_range(None, range).await?;
        let (cpu, memory, load_average) = system_trends(&health);
        tracing::debug!(
            health_samples = health.len(),
            disk_samples = disk.len(),
            "trend analysis"
        );
        Ok(TrendReport {
            cpu,
            memory,
            load_average,
            disk_usage: disk_trends_by_path(&disk),
        })
    }

    /// Disk trend for one path, `None` when the path has fewer than two samples in `range`.
    pub async fn disk_path(
        &self,
        path: &str,
        range: TimeRange,
    ) -> Result<Option<DiskPathTrend>, StoreError> {
        let disk = self.store.disk_usage_range(Some(path), range).await?;
        Ok(disk_trends_by_path(&disk).remove(path))
    }
}
