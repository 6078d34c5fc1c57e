// Alert and host-health aggregates for reports.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::analysis::{mean, min_max};
use crate::models::{Alert, AlertType, Severity, SystemHealthSample, round_to};

/// How many of the newest alerts a summary lists.
pub const RECENT_ALERT_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertSummary {
    pub total: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_type: BTreeMap<AlertType, usize>,
    pub unresolved: usize,
    /// Newest first.
    pub most_recent: Vec<Alert>,
}

impl AlertSummary {
    pub fn count(&self, severity: Severity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }
}

/// Summarize alerts given in ascending timestamp order.
pub fn summarize_alerts(alerts: &[Alert]) -> AlertSummary {
    let mut by_severity = BTreeMap::new();
    let mut by_type = BTreeMap::new();
    for a in alerts {
        *by_severity.entry(a.severity).or_insert(0) += 1;
        *by_type.entry(a.alert_type).or_insert(0) += 1;
    }
    AlertSummary {
        total: alerts.len(),
        by_severity,
        by_type,
        unresolved: alerts.iter().filter(|a| !a.resolved).count(),
        most_recent: alerts.iter().rev().take(RECENT_ALERT_COUNT).cloned().collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthAggregate {
    pub average: f64,
    pub peak: f64,
}

/// Host statistics over a report window. Aggregates are absent when no health samples exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodStatistics {
    pub data_points: usize,
    pub cpu: Option<HealthAggregate>,
    pub memory: Option<HealthAggregate>,
    pub load: Option<HealthAggregate>,
    pub total_alerts: usize,
}

fn aggregate(values: &[f64]) -> Option<HealthAggregate> {
    let (_, peak) = min_max(values)?;
    Some(HealthAggregate {
        average: round_to(mean(values), 2),
        peak: round_to(peak, 2),
    })
}

pub fn period_statistics(health: &[SystemHealthSample], total_alerts: usize) -> PeriodStatistics {
    let cpu: Vec<f64> = health.iter().map(|s| s.cpu_percent).collect();
    let memory: Vec<f64> = health.iter().map(|s| s.memory_percent).collect();
    let load: Vec<f64> = health.iter().map(|s| s.load_avg_1).collect();
    PeriodStatistics {
        data_points: health.len(),
        cpu: aggregate(&cpu),
        memory: aggregate(&memory),
        load: aggregate(&load),
        total_alerts,
    }
}
