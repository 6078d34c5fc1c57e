// Plain-text advice derived from trends, cleanup results and alert counts.

use std::collections::BTreeMap;

use super::stats::AlertSummary;
use crate::analysis::{Effectiveness, PathEffectiveness, SeriesTrend, Trend, TrendReport};
use crate::models::Severity;

const CLEANUP_ADVICE_PERCENT: f64 = 80.0;
const CAPACITY_ADVICE_PERCENT: f64 = 75.0;
const RECURRING_ALERT_COUNT: usize = 3;
const CRITICAL_ALERT_BUDGET: usize = 10;
const CPU_UPGRADE_PERCENT: f64 = 70.0;
const MEMORY_UPGRADE_PERCENT: f64 = 80.0;

fn is_increasing(s: &SeriesTrend) -> bool {
    s.metric().is_some_and(|m| m.trend == Trend::Increasing)
}

fn recent_avg_above(s: &SeriesTrend, limit: f64) -> bool {
    s.metric().is_some_and(|m| m.current_avg > limit)
}

/// Short-horizon advice used by daily and weekly reports.
pub fn general(trends: &TrendReport, alerts: &AlertSummary) -> Vec<String> {
    let mut out = Vec::new();
    if is_increasing(&trends.cpu) {
        out.push("Monitor CPU usage - increasing trend detected".to_string());
    }
    if is_increasing(&trends.memory) {
        out.push("Monitor memory usage - increasing trend detected".to_string());
    }
    for (path, d) in &trends.disk_usage {
        if d.current_usage > CLEANUP_ADVICE_PERCENT {
            out.push(format!(
                "Consider cleanup for {path} - usage at {}%",
                d.current_usage
            ));
        } else if d.trend == Trend::Increasing {
            out.push(format!("Monitor {path} - disk usage increasing"));
        }
    }
    for (alert_type, &n) in &alerts.by_type {
        if n > RECURRING_ALERT_COUNT {
            out.push(format!(
                "Address recurring {alert_type} alerts ({n} occurrences)"
            ));
        }
    }
    if out.is_empty() {
        out.push("System appears healthy - continue regular monitoring".to_string());
    }
    out
}

/// Long-horizon advice used by monthly reports.
pub fn monthly(
    cleanup: &BTreeMap<String, PathEffectiveness>,
    trends: &TrendReport,
    alerts: &AlertSummary,
) -> Vec<String> {
    let mut out = Vec::new();
    let poor: Vec<&str> = cleanup
        .iter()
        .filter(|(_, e)| e.effectiveness == Effectiveness::Poor)
        .map(|(p, _)| p.as_str())
        .collect();
    if !poor.is_empty() {
        out.push(format!("Improve cleanup strategies for: {}", poor.join(", ")));
    }
    let crowded: Vec<&str> = trends
        .disk_usage
        .iter()
        .filter(|(_, d)| d.current_usage > CAPACITY_ADVICE_PERCENT)
        .map(|(p, _)| p.as_str())
        .collect();
    if !crowded.is_empty() {
        out.push(format!("Plan capacity expansion for: {}", crowded.join(", ")));
    }
    if alerts.count(Severity::Critical) > CRITICAL_ALERT_BUDGET {
        out.push("Review and tune alert thresholds - too many critical alerts".to_string());
    }
    if recent_avg_above(&trends.cpu, CPU_UPGRADE_PERCENT) {
        out.push("Consider CPU optimization or upgrade".to_string());
    }
    if recent_avg_above(&trends.memory, MEMORY_UPGRADE_PERCENT) {
        out.push("Consider memory upgrade or optimization".to_string());
    }
    if out.is_empty() {
        out.push("System performance is stable - maintain current practices".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{DiskPathTrend, MetricTrend};
    use crate::models::AlertType;

    fn quiet_trends() -> TrendReport {
        TrendReport {
            cpu: SeriesTrend::NoData,
            memory: SeriesTrend::NoData,
            load_average: SeriesTrend::NoData,
            disk_usage: BTreeMap::new(),
        }
    }

    fn empty_alerts() -> AlertSummary {
        AlertSummary {
            total: 0,
            by_severity: BTreeMap::new(),
            by_type: BTreeMap::new(),
            unresolved: 0,
            most_recent: Vec::new(),
        }
    }

    fn disk(current_usage: f64, trend: Trend) -> DiskPathTrend {
        DiskPathTrend {
            current_usage,
            trend,
            max_usage: current_usage,
            min_usage: current_usage,
        }
    }

    #[test]
    fn healthy_fallbacks() {
        assert_eq!(
            general(&quiet_trends(), &empty_alerts()),
            vec!["System appears healthy - continue regular monitoring"]
        );
        assert_eq!(
            monthly(&BTreeMap::new(), &quiet_trends(), &empty_alerts()),
            vec!["System performance is stable - maintain current practices"]
        );
    }

    #[test]
    fn general_advice_order() {
        let mut t = quiet_trends();
        t.cpu = SeriesTrend::Available(MetricTrend {
            current_avg: 40.0,
            trend: Trend::Increasing,
            max_value: 50.0,
            min_value: 10.0,
        });
        t.disk_usage.insert("/".into(), disk(82.5, Trend::Stable));
        t.disk_usage.insert("/var".into(), disk(60.0, Trend::Increasing));
        t.disk_usage.insert("/tmp".into(), disk(10.0, Trend::Stable));
        let mut a = empty_alerts();
        a.by_type.insert(AlertType::DiskUsage, 4);
        a.by_type.insert(AlertType::InodeUsage, 3);

        assert_eq!(
            general(&t, &a),
            vec![
                "Monitor CPU usage - increasing trend detected",
                "Consider cleanup for / - usage at 82.5%",
                "Monitor /var - disk usage increasing",
                "Address recurring disk_usage alerts (4 occurrences)",
            ]
        );
    }

    #[test]
    fn monthly_advice() {
        let mut t = quiet_trends();
        t.memory = SeriesTrend::Available(MetricTrend {
            current_avg: 85.0,
            trend: Trend::Stable,
            max_value: 90.0,
            min_value: 80.0,
        });
        t.disk_usage.insert("/home".into(), disk(76.0, Trend::Stable));
        let mut a = empty_alerts();
        a.by_severity.insert(Severity::Critical, 11);
        let cleanup: BTreeMap<String, PathEffectiveness> = [(
            "/var".to_string(),
            PathEffectiveness {
                initial_usage: 40.0,
                final_usage: 50.0,
                trend: 10.0,
                days_span: 30,
                avg_daily_change: 0.333,
                cleanup_events: 0,
                effectiveness: Effectiveness::Poor,
            },
        )]
        .into();

        assert_eq!(
            monthly(&cleanup, &t, &a),
            vec![
                "Improve cleanup strategies for: /var",
                "Plan capacity expansion for: /home",
                "Review and tune alert thresholds - too many critical alerts",
                "Consider memory upgrade or optimization",
            ]
        );
    }
}
