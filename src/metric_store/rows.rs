// SqliteRow -> model decoding.

use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::error::StoreError;
use crate::models::{
    Alert, DiskUsageSample, FilesystemHealthSample, InodeUsageSample, SystemHealthSample,
};

pub(super) fn disk_usage(row: &SqliteRow) -> Result<DiskUsageSample, StoreError> {
    Ok(DiskUsageSample {
        timestamp: row.try_get("timestamp")?,
        path: row.try_get("path")?,
        total_gb: row.try_get("total_gb")?,
        used_gb: row.try_get("used_gb")?,
        free_gb: row.try_get("free_gb")?,
        usage_percent: row.try_get("usage_percent")?,
    })
}

pub(super) fn inode_usage(row: &SqliteRow) -> Result<InodeUsageSample, StoreError> {
    Ok(InodeUsageSample {
        timestamp: row.try_get("timestamp")?,
        path: row.try_get("path")?,
        total_inodes: row.try_get("total_inodes")?,
        used_inodes: row.try_get("used_inodes")?,
        free_inodes: row.try_get("free_inodes")?,
        usage_percent: row.try_get("usage_percent")?,
    })
}

pub(super) fn system_health(row: &SqliteRow) -> Result<SystemHealthSample, StoreError> {
    Ok(SystemHealthSample {
        timestamp: row.try_get("timestamp")?,
        cpu_percent: row.try_get("cpu_percent")?,
        memory_percent: row.try_get("memory_percent")?,
        load_avg_1: row.try_get("load_avg_1")?,
        load_avg_5: row.try_get("load_avg_5")?,
        load_avg_15: row.try_get("load_avg_15")?,
    })
}

pub(super) fn filesystem_health(row: &SqliteRow) -> Result<FilesystemHealthSample, StoreError> {
    let status: String = row.try_get("status")?;
    Ok(FilesystemHealthSample {
        timestamp: row.try_get("timestamp")?,
        path: row.try_get("path")?,
        filesystem: row.try_get("filesystem")?,
        status: status.parse().map_err(StoreError::InvalidRow)?,
        errors: row.try_get("errors")?,
    })
}

pub(super) fn alert(row: &SqliteRow) -> Result<Alert, StoreError> {
    let alert_type: String = row.try_get("alert_type")?;
    let severity: String = row.try_get("severity")?;
    Ok(Alert {
        id: row.try_get("id")?,
        timestamp: row.try_get("timestamp")?,
        alert_type: alert_type.parse().map_err(StoreError::InvalidRow)?,
        severity: severity.parse().map_err(StoreError::InvalidRow)?,
        message: row.try_get("message")?,
        resolved: row.try_get("resolved")?,
    })
}
