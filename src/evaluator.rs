// Threshold rules: fresh disk/inode samples -> unresolved alert drafts.
// Stateless; every cycle re-raises while a path stays above its threshold.

use crate::config::ThresholdConfig;
use crate::models::{AlertDraft, AlertType, DiskUsageSample, InodeUsageSample, Severity};

/// Above this usage a breach is critical regardless of the configured threshold.
pub const CRITICAL_USAGE_PERCENT: f64 = 95.0;

pub fn severity_for(usage_percent: f64) -> Severity {
    if usage_percent > CRITICAL_USAGE_PERCENT {
        Severity::Critical
    } else {
        Severity::Warning
    }
}

/// One draft per sample strictly above its threshold; disk drafts first, then inode, each in
/// input order.
pub fn evaluate(
    disk: &[DiskUsageSample],
    inode: &[InodeUsageSample],
    thresholds: &ThresholdConfig,
) -> Vec<AlertDraft> {
    let disk_alerts = disk.iter().filter_map(|s| {
        breach(
            AlertType::DiskUsage,
            "Disk",
            &s.path,
            s.usage_percent,
            thresholds.disk_usage_percent,
        )
    });
    let inode_alerts = inode.iter().filter_map(|s| {
        breach(
            AlertType::InodeUsage,
            "Inode",
            &s.path,
            s.usage_percent,
            thresholds.inode_usage_percent,
        )
    });
    disk_alerts.chain(inode_alerts).collect()
}

fn breach(
    alert_type: AlertType,
    label: &str,
    path: &str,
    usage_percent: f64,
    threshold: f64,
) -> Option<AlertDraft> {
    if usage_percent <= threshold {
        return None;
    }
    Some(AlertDraft {
        alert_type,
        severity: severity_for(usage_percent),
        message: format!("{label} usage on {path} is {usage_percent}% (threshold: {threshold}%)"),
    })
}
