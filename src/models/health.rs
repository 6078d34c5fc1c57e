// Host-global system health and per-path filesystem health samples

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::clamp_percent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemHealthSample {
    pub timestamp: i64,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub load_avg_1: f64,
    pub load_avg_5: f64,
    pub load_avg_15: f64,
}

impl SystemHealthSample {
    pub fn new(cpu_percent: f64, memory_percent: f64, load_avg: [f64; 3]) -> Self {
        Self {
            timestamp: 0,
            cpu_percent: clamp_percent(cpu_percent),
            memory_percent: clamp_percent(memory_percent),
            load_avg_1: load_avg[0],
            load_avg_5: load_avg[1],
            load_avg_15: load_avg[2],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FsStatus {
    Healthy,
    ErrorsDetected,
    CheckFailed,
}

impl FsStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FsStatus::Healthy => "healthy",
            FsStatus::ErrorsDetected => "errors_detected",
            FsStatus::CheckFailed => "check_failed",
        }
    }
}

impl fmt::Display for FsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FsStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "healthy" => Ok(FsStatus::Healthy),
            "errors_detected" => Ok(FsStatus::ErrorsDetected),
            "check_failed" => Ok(FsStatus::CheckFailed),
            other => Err(format!("unknown filesystem status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilesystemHealthSample {
    pub timestamp: i64,
    pub path: String,
    pub filesystem: String,
    pub status: FsStatus,
    /// Error count; -1 when the check could not run.
    pub errors: i64,
}

impl FilesystemHealthSample {
    /// Build from a check result. `None` means the check itself failed.
    pub fn from_check(
        path: impl Into<String>,
        filesystem: impl Into<String>,
        errors: Option<u64>,
    ) -> Self {
        let (status, errors) = match errors {
            None => (FsStatus::CheckFailed, -1),
            Some(0) => (FsStatus::Healthy, 0),
            Some(n) => (
                FsStatus::ErrorsDetected,
                i64::try_from(n).unwrap_or(i64::MAX),
            ),
        };
        Self {
            timestamp: 0,
            path: path.into(),
            filesystem: filesystem.into(),
            status,
            errors,
        }
    }
}
