// Windowed analysis over stored samples. Pure functions do the math; the analyzers are the
// only place report code reads the store through.

pub mod cleanup;
pub mod trend;

pub use cleanup::{
    CleanupEffectivenessAnalyzer, CleanupRollup, Effectiveness, OverallRating, PathEffectiveness,
};
pub use trend::{DiskPathTrend, MetricTrend, SeriesTrend, Trend, TrendAnalyzer, TrendReport};

use std::collections::BTreeMap;

use crate::models::DiskUsageSample;

/// Split disk samples by path, each group ascending by timestamp.
pub(crate) fn group_by_path(samples: &[DiskUsageSample]) -> BTreeMap<&str, Vec<&DiskUsageSample>> {
    let mut by_path: BTreeMap<&str, Vec<&DiskUsageSample>> = BTreeMap::new();
    for s in samples {
        by_path.entry(s.path.as_str()).or_default().push(s);
    }
    for group in by_path.values_mut() {
        group.sort_by_key(|s| s.timestamp);
    }
    by_path
}

pub(crate) fn mean(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    v.iter().sum::<f64>() / (v.len() as f64)
}

pub(crate) fn min_max(v: &[f64]) -> Option<(f64, f64)> {
    let first = *v.first()?;
    Some(
        v.iter()
            .fold((first, first), |(lo, hi), &x| (lo.min(x), hi.max(x))),
    )
}

/// Mean of successive first differences; 0 when there are fewer than two values.
pub(crate) fn mean_first_difference(v: &[f64]) -> f64 {
    if v.len() < 2 {
        return 0.0;
    }
    let diffs: Vec<f64> = v.windows(2).map(|w| w[1] - w[0]).collect();
    mean(&diffs)
}
