// Local host sampling via statvfs, sysinfo and tune2fs.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sysinfo::{Disks, System};
use tracing::instrument;

use super::MetricCollector;
use super::linux;
use crate::error::CollectionError;
use crate::models::{
    DiskUsageSample, FilesystemHealthSample, InodeUsageSample, SampleKind, SystemHealthSample,
};

/// Samples the local host.
///
/// statvfs runs on the blocking pool and cannot be cancelled. When the cycle times a call out,
/// the blocking thread keeps waiting on the mount (a hung NFS server, say). At most one such
/// call per path is in flight: later calls for that path fail fast until it returns.
pub struct HostCollector {
    sys: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
    statvfs_in_flight: InFlight,
    command_timeout: Duration,
}

impl HostCollector {
    /// `command_timeout` bounds external commands (tune2fs); keep it below the cycle's
    /// per-call timeout so the child is reaped rather than abandoned.
    pub fn new(command_timeout: Duration) -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_usage();
        Self {
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(Disks::new_with_refreshed_list())),
            statvfs_in_flight: InFlight::default(),
            command_timeout,
        }
    }

    async fn statvfs(&self, kind: SampleKind, path: &str) -> Result<linux::FsCounts, CollectionError> {
        ensure_exists(kind, path)?;
        let claim = self.statvfs_in_flight.claim(path).ok_or_else(|| {
            CollectionError::failed(kind, Some(path), "previous statvfs still pending")
        })?;
        let owned = path.to_string();
        tokio::task::spawn_blocking(move || {
            let counts = linux::statvfs(&owned);
            drop(claim);
            counts
        })
            .await
            .map_err(|e| CollectionError::failed(kind, Some(path), format!("task join: {e}")))?
            .map_err(|e| CollectionError::failed(kind, Some(path), format!("statvfs: {e}")))
    }

    /// (filesystem type, device) of the mount that contains `path` (longest mount prefix).
    async fn mount_for(&self, path: &str) -> anyhow::Result<Option<(String, PathBuf)>> {
        let disks = self.disks.clone();
        let target = PathBuf::from(path);
        tokio::task::spawn_blocking(move || {
            let mut disks = disks
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo disks lock poisoned: {}", e))?;
            disks.refresh(false);
            let best = disks
                .list()
                .iter()
                .filter(|d| target.starts_with(d.mount_point()))
                .max_by_key(|d| d.mount_point().components().count())
                .map(|d| {
                    (
                        d.file_system().to_string_lossy().into_owned(),
                        PathBuf::from(d.name()),
                    )
                });
            Ok::<_, anyhow::Error>(best)
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }
}

/// Paths with a blocking call running. A [`Claim`] releases its path on drop, which happens on
/// the blocking thread once the call returns, not when the awaiting future is dropped.
#[derive(Clone, Default)]
struct InFlight(Arc<Mutex<HashSet<String>>>);

struct Claim {
    set: Arc<Mutex<HashSet<String>>>,
    path: String,
}

impl InFlight {
    fn claim(&self, path: &str) -> Option<Claim> {
        let mut set = self.0.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(path.to_string()) {
            return None;
        }
        Some(Claim {
            set: self.0.clone(),
            path: path.to_string(),
        })
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        let mut set = self.set.lock().unwrap_or_else(|e| e.into_inner());
        set.remove(&self.path);
    }
}

fn ensure_exists(kind: SampleKind, path: &str) -> Result<(), CollectionError> {
    if Path::new(path).exists() {
        Ok(())
    } else {
        Err(CollectionError::failed(kind, Some(path), "path does not exist"))
    }
}

impl MetricCollector for HostCollector {
    #[instrument(skip(self), fields(collector = "host", operation = "collect_disk_usage"))]
    async fn collect_disk_usage(&self, path: &str) -> Result<DiskUsageSample, CollectionError> {
        let c = self.statvfs(SampleKind::DiskUsage, path).await?;
        Ok(DiskUsageSample::from_bytes(
            path,
            c.total_bytes,
            c.used_bytes,
            c.avail_bytes,
        ))
    }

    #[instrument(skip(self), fields(collector = "host", operation = "collect_inode_usage"))]
    async fn collect_inode_usage(&self, path: &str) -> Result<InodeUsageSample, CollectionError> {
        let c = self.statvfs(SampleKind::InodeUsage, path).await?;
        Ok(InodeUsageSample::from_counts(
            path,
            c.total_inodes,
            c.used_inodes,
            c.free_inodes,
        ))
    }

    #[instrument(skip(self), fields(collector = "host", operation = "collect_filesystem_health"))]
    async fn collect_filesystem_health(
        &self,
        path: &str,
    ) -> Result<FilesystemHealthSample, CollectionError> {
        let kind = SampleKind::FilesystemHealth;
        ensure_exists(kind, path)?;
        let (filesystem, device) = match self.mount_for(path).await {
            Ok(Some(found)) => found,
            Ok(None) => return Ok(FilesystemHealthSample::from_check(path, "unknown", None)),
            Err(e) => return Err(CollectionError::failed(kind, Some(path), e)),
        };
        if !linux::is_ext_family(&filesystem) {
            return Ok(FilesystemHealthSample::from_check(path, filesystem, Some(0)));
        }
        let errors = match linux::tune2fs_error_count(&device, self.command_timeout).await {
            Ok(n) => Some(n),
            Err(e) => {
                tracing::debug!(path = %path, device = %device.display(), error = %e, "tune2fs check failed");
                None
            }
        };
        Ok(FilesystemHealthSample::from_check(path, filesystem, errors))
    }

    #[instrument(skip(self), fields(collector = "host", operation = "collect_system_health"))]
    async fn collect_system_health(&self) -> Result<SystemHealthSample, CollectionError> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            // CPU usage is a delta between two refreshes.
            sys.refresh_cpu_usage();
            std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL.max(Duration::from_millis(500)));
            sys.refresh_cpu_usage();
            sys.refresh_memory();

            let total = sys.total_memory();
            let used = total.saturating_sub(sys.available_memory());
            let memory_percent = if total > 0 {
                (used as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            let load = System::load_average();
            Ok::<_, anyhow::Error>(SystemHealthSample::new(
                crate::models::round_to(f64::from(sys.global_cpu_usage()), 2),
                crate::models::round_to(memory_percent, 2),
                [
                    crate::models::round_to(load.one, 2),
                    crate::models::round_to(load.five, 2),
                    crate::models::round_to(load.fifteen, 2),
                ],
            ))
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))
        .and_then(|r| r)
        .map_err(|e| CollectionError::failed(SampleKind::SystemHealth, None, e))
    }
}
