// Disk and inode usage samples (per monitored path)

use serde::{Deserialize, Serialize};

use super::{percent_of, round_to};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;
/// Slack for `used + free <= total` after GB rounding.
const GB_ROUNDING_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskUsageSample {
    /// Unix epoch millis; assigned by the store at write time.
    pub timestamp: i64,
    pub path: String,
    pub total_gb: f64,
    pub used_gb: f64,
    pub free_gb: f64,
    pub usage_percent: f64,
}

impl DiskUsageSample {
    pub fn from_bytes(path: impl Into<String>, total: u64, used: u64, free: u64) -> Self {
        Self {
            timestamp: 0,
            path: path.into(),
            total_gb: round_to(total as f64 / BYTES_PER_GB, 2),
            used_gb: round_to(used as f64 / BYTES_PER_GB, 2),
            free_gb: round_to(free as f64 / BYTES_PER_GB, 2),
            usage_percent: percent_of(used as f64, total as f64),
        }
    }

    /// Zero-capacity filesystem: usage_percent was forced to 0. Filesystems under ~5 MiB
    /// round to 0.00 GB but still carry a real percentage, so both fields are checked.
    pub fn is_invalid(&self) -> bool {
        self.total_gb <= 0.0 && self.usage_percent == 0.0
    }

    pub fn is_consistent(&self) -> bool {
        self.used_gb + self.free_gb <= self.total_gb + GB_ROUNDING_TOLERANCE
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InodeUsageSample {
    pub timestamp: i64,
    pub path: String,
    pub total_inodes: i64,
    pub used_inodes: i64,
    pub free_inodes: i64,
    pub usage_percent: f64,
}

impl InodeUsageSample {
    pub fn from_counts(path: impl Into<String>, total: u64, used: u64, free: u64) -> Self {
        Self {
            timestamp: 0,
            path: path.into(),
            total_inodes: saturating_i64(total),
            used_inodes: saturating_i64(used),
            free_inodes: saturating_i64(free),
            usage_percent: percent_of(used as f64, total as f64),
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.total_inodes <= 0
    }

    pub fn is_consistent(&self) -> bool {
        self.used_inodes.saturating_add(self.free_inodes) <= self.total_inodes
    }
}

fn saturating_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}
