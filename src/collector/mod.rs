// Sampling capability consumed by the monitoring cycle. How a number is obtained is the
// implementor's business; the cycle only sees a sample or a typed failure.

mod host;
mod linux;

pub use host::HostCollector;

use std::future::Future;

use crate::error::CollectionError;
use crate::models::{DiskUsageSample, FilesystemHealthSample, InodeUsageSample, SystemHealthSample};

pub trait MetricCollector {
    fn collect_disk_usage(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<DiskUsageSample, CollectionError>> + Send;

    fn collect_inode_usage(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<InodeUsageSample, CollectionError>> + Send;

    fn collect_filesystem_health(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<FilesystemHealthSample, CollectionError>> + Send;

    fn collect_system_health(
        &self,
    ) -> impl Future<Output = Result<SystemHealthSample, CollectionError>> + Send;
}
