// Sample kinds and the per-cycle write batch

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DiskUsageSample, FilesystemHealthSample, InodeUsageSample, SystemHealthSample};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleKind {
    DiskUsage,
    InodeUsage,
    SystemHealth,
    FilesystemHealth,
}

impl SampleKind {
    pub const ALL: [SampleKind; 4] = [
        SampleKind::DiskUsage,
        SampleKind::InodeUsage,
        SampleKind::SystemHealth,
        SampleKind::FilesystemHealth,
    ];

    /// Backing table name; also the wire name of the kind.
    pub fn table(self) -> &'static str {
        match self {
            SampleKind::DiskUsage => "disk_usage",
            SampleKind::InodeUsage => "inode_usage",
            SampleKind::SystemHealth => "system_health",
            SampleKind::FilesystemHealth => "filesystem_health",
        }
    }

    /// Host-global kinds have no path column.
    pub fn has_path(self) -> bool {
        !matches!(self, SampleKind::SystemHealth)
    }
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// One stored observation of any kind, as returned by `MetricStore::query_range`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Sample {
    DiskUsage(DiskUsageSample),
    InodeUsage(InodeUsageSample),
    SystemHealth(SystemHealthSample),
    FilesystemHealth(FilesystemHealthSample),
}

impl Sample {
    pub fn kind(&self) -> SampleKind {
        match self {
            Sample::DiskUsage(_) => SampleKind::DiskUsage,
            Sample::InodeUsage(_) => SampleKind::InodeUsage,
            Sample::SystemHealth(_) => SampleKind::SystemHealth,
            Sample::FilesystemHealth(_) => SampleKind::FilesystemHealth,
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            Sample::DiskUsage(s) => s.timestamp,
            Sample::InodeUsage(s) => s.timestamp,
            Sample::SystemHealth(s) => s.timestamp,
            Sample::FilesystemHealth(s) => s.timestamp,
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            Sample::DiskUsage(s) => Some(&s.path),
            Sample::InodeUsage(s) => Some(&s.path),
            Sample::SystemHealth(_) => None,
            Sample::FilesystemHealth(s) => Some(&s.path),
        }
    }
}

/// Everything collected in one cycle; written in a single transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleBatch {
    pub disk_usage: Vec<DiskUsageSample>,
    pub inode_usage: Vec<InodeUsageSample>,
    pub system_health: Vec<SystemHealthSample>,
    pub filesystem_health: Vec<FilesystemHealthSample>,
}

impl SampleBatch {
    pub fn len(&self) -> usize {
        self.disk_usage.len()
            + self.inode_usage.len()
            + self.system_health.len()
            + self.filesystem_health.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&mut self, sample: Sample) {
        match sample {
            Sample::DiskUsage(s) => self.disk_usage.push(s),
            Sample::InodeUsage(s) => self.inode_usage.push(s),
            Sample::SystemHealth(s) => self.system_health.push(s),
            Sample::FilesystemHealth(s) => self.filesystem_health.push(s),
        }
    }
}
