// Cleanup effectiveness per path: net usage change over the window, daily rate, and
// reclamation events (sample-to-sample drops of more than one point).

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::instrument;

use super::group_by_path;
use crate::error::StoreError;
use crate::metric_store::{MS_PER_DAY, MetricStore, TimeRange};
use crate::models::{DiskUsageSample, round_to};

/// A drop larger than this many percentage points between samples counts as a cleanup.
pub const CLEANUP_DROP_PERCENT: f64 = 1.0;
/// Net growth above this many points over the window rates as poor.
pub const POOR_GROWTH_PERCENT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Effectiveness {
    Good,
    Stable,
    Poor,
}

impl Effectiveness {
    pub fn classify(trend: f64) -> Self {
        if trend < 0.0 {
            Effectiveness::Good
        } else if trend > POOR_GROWTH_PERCENT {
            Effectiveness::Poor
        } else {
            Effectiveness::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathEffectiveness {
    pub initial_usage: f64,
    pub final_usage: f64,
    pub trend: f64,
    pub days_span: i64,
    pub avg_daily_change: f64,
    pub cleanup_events: usize,
    pub effectiveness: Effectiveness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OverallRating {
    Excellent,
    Good,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanupRollup {
    pub good_paths: usize,
    pub total_paths: usize,
    pub total_cleanup_events: usize,
    pub rating: OverallRating,
}

/// Whole days between first and last sample, never less than 1. Sub-day windows count as a
/// full day.
pub fn days_span(first_ts: i64, last_ts: i64) -> i64 {
    (last_ts - first_ts).div_euclid(MS_PER_DAY).max(1)
}

/// Effectiveness for one path's ascending samples; `None` with fewer than two samples.
pub fn analyze_path(samples: &[&DiskUsageSample]) -> Option<PathEffectiveness> {
    let [first, .., last] = samples else {
        return None;
    };
    let trend = last.usage_percent - first.usage_percent;
    let span = days_span(first.timestamp, last.timestamp);
    let cleanup_events = samples
        .windows(2)
        .filter(|w| w[1].usage_percent - w[0].usage_percent < -CLEANUP_DROP_PERCENT)
        .count();
    Some(PathEffectiveness {
        initial_usage: round_to(first.usage_percent, 2),
        final_usage: round_to(last.usage_percent, 2),
        trend: round_to(trend, 2),
        days_span: span,
        avg_daily_change: round_to(trend / span as f64, 3),
        cleanup_events,
        effectiveness: Effectiveness::classify(trend),
    })
}

/// Effectiveness for every path with at least two samples.
pub fn effectiveness_by_path(samples: &[DiskUsageSample]) -> BTreeMap<String, PathEffectiveness> {
    group_by_path(samples)
        .into_iter()
        .filter_map(|(path, group)| analyze_path(&group).map(|e| (path.to_string(), e)))
        .collect()
}

/// Cross-path rating; `None` when no path qualified.
pub fn rollup(by_path: &BTreeMap<String, PathEffectiveness>) -> Option<CleanupRollup> {
    let total_paths = by_path.len();
    if total_paths == 0 {
        return None;
    }
    let good_paths = by_path
        .values()
        .filter(|e| e.effectiveness == Effectiveness::Good)
        .count();
    let rating = if good_paths == total_paths {
        OverallRating::Excellent
    } else if good_paths * 2 > total_paths {
        OverallRating::Good
    } else {
        OverallRating::NeedsImprovement
    };
    Some(CleanupRollup {
        good_paths,
        total_paths,
        total_cleanup_events: by_path.values().map(|e| e.cleanup_events).sum(),
        rating,
    })
}

pub struct CleanupEffectivenessAnalyzer<'a> {
    store: &'a MetricStore,
}

impl<'a> CleanupEffectivenessAnalyzer<'a> {
    pub fn new(store: &'a MetricStore) -> Self {
        Self { store }
    }

    #[instrument(skip(self), fields(analyzer = "cleanup", operation = "analyze"))]
    pub async fn analyze(
        &self,
        range: TimeRange,
    ) -> Result<BTreeMap<String, PathEffectiveness>, StoreError> {
        let disk = self.store.disk_usage_range(None, range).await?;
        let out = effectiveness_by_path(&disk);
        tracing::debug!(
            disk_samples = disk.len(),
            paths = out.len(),
            "cleanup effectiveness"
        );
        Ok(out)
    }

    pub async fn analyze_one(
        &self,
        path: &str,
        range: TimeRange,
    ) -> Result<Option<PathEffectiveness>, StoreError> {
        let disk = self.store.disk_usage_range(Some(path), range).await?;
        Ok(effectiveness_by_path(&disk).remove(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(path: &str, day: i64, usage_percent: f64) -> DiskUsageSample {
        DiskUsageSample {
            timestamp: day * MS_PER_DAY,
            path: path.into(),
            total_gb: 100.0,
            used_gb: usage_percent,
            free_gb: 100.0 - usage_percent,
            usage_percent,
        }
    }

    #[test]
    fn var_cleanup_over_three_days() {
        let samples = vec![
            sample("/var", 0, 50.0),
            sample("/var", 1, 40.0),
            sample("/var", 2, 42.0),
            sample("/var", 3, 35.0),
        ];
        let map = effectiveness_by_path(&samples);
        let e = &map["/var"];
        assert_eq!(e.initial_usage, 50.0);
        assert_eq!(e.final_usage, 35.0);
        assert_eq!(e.trend, -15.0);
        assert_eq!(e.days_span, 3);
        assert_eq!(e.avg_daily_change, -5.0);
        assert_eq!(e.cleanup_events, 2);
        assert_eq!(e.effectiveness, Effectiveness::Good);
    }

    #[test]
    fn single_sample_path_is_skipped() {
        let samples = vec![sample("/tmp", 0, 10.0), sample("/", 0, 20.0), sample("/", 1, 21.0)];
        let map = effectiveness_by_path(&samples);
        assert!(!map.contains_key("/tmp"));
        assert!(map.contains_key("/"));
    }

    #[test]
    fn sub_day_span_floors_to_one() {
        assert_eq!(days_span(0, 20 * 60 * 60 * 1000), 1);
        assert_eq!(days_span(0, 0), 1);
        assert_eq!(days_span(0, 2 * MS_PER_DAY + 5), 2);
    }

    #[test]
    fn effectiveness_labels() {
        assert_eq!(Effectiveness::classify(-0.5), Effectiveness::Good);
        assert_eq!(Effectiveness::classify(0.0), Effectiveness::Stable);
        assert_eq!(Effectiveness::classify(5.0), Effectiveness::Stable);
        assert_eq!(Effectiveness::classify(5.5), Effectiveness::Poor);
    }

    #[test]
    fn drop_of_exactly_one_point_is_not_a_cleanup() {
        let samples = vec![sample("/", 0, 50.0), sample("/", 1, 49.0), sample("/", 2, 47.5)];
        let map = effectiveness_by_path(&samples);
        assert_eq!(map["/"].cleanup_events, 1);
    }

    #[test]
    fn rollup_ratings() {
        let mk = |trend: f64| PathEffectiveness {
            initial_usage: 50.0,
            final_usage: 50.0 + trend,
            trend,
            days_span: 1,
            avg_daily_change: trend,
            cleanup_events: 1,
            effectiveness: Effectiveness::classify(trend),
        };
        let all_good: BTreeMap<String, PathEffectiveness> =
            [("/".to_string(), mk(-1.0)), ("/var".to_string(), mk(-2.0))].into();
        let r = rollup(&all_good).unwrap();
        assert_eq!(r.rating, OverallRating::Excellent);
        assert_eq!(r.total_cleanup_events, 2);

        let mostly_good: BTreeMap<String, PathEffectiveness> = [
            ("/".to_string(), mk(-1.0)),
            ("/var".to_string(), mk(-2.0)),
            ("/tmp".to_string(), mk(6.0)),
        ]
        .into();
        assert_eq!(rollup(&mostly_good).unwrap().rating, OverallRating::Good);

        let half: BTreeMap<String, PathEffectiveness> =
            [("/".to_string(), mk(-1.0)), ("/var".to_string(), mk(1.0))].into();
        let r = rollup(&half).unwrap();
        assert_eq!(r.rating, OverallRating::NeedsImprovement);
        assert_eq!(r.good_paths, 1);
        assert_eq!(r.total_paths, 2);

        assert!(rollup(&BTreeMap::new()).is_none());
    }
}
