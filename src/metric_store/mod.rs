// SQLite metric store: append-only sample tables + alert log, with age-based retention.
// One batch = one transaction; WAL lets report readers run while a cycle writes and they
// only ever see whole batches.

mod rows;
mod schema;

use crate::error::StoreError;
use crate::models::{
    Alert, AlertDraft, DiskUsageSample, FilesystemHealthSample, InodeUsageSample, Sample,
    SampleBatch, SampleKind, SystemHealthSample,
};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::path::Path;
use std::str::FromStr;
use tokio::sync::Mutex;
use tracing::instrument;

pub const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
/// Alerts outlive samples; this horizon ignores `database.retention_days`.
pub const ALERT_RETENTION_DAYS: i64 = 90;

/// Current wall clock as Unix epoch millis.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Half-open time range `[since, until)`; open-ended when `until` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub since: i64,
    pub until: Option<i64>,
}

impl TimeRange {
    pub fn since(since: i64) -> Self {
        Self { since, until: None }
    }

    pub fn between(since: i64, until: i64) -> Self {
        Self {
            since,
            until: Some(until),
        }
    }

    /// The `days` days ending at `end` (exclusive).
    pub fn last_days(end: i64, days: u32) -> Self {
        Self::between(end - i64::from(days) * MS_PER_DAY, end)
    }

    /// Everything ever stored.
    pub fn all() -> Self {
        Self::since(i64::MIN)
    }
}

pub struct MetricStore {
    pool: SqlitePool,
    /// Last write timestamp; held for the whole write so stamps never go backwards.
    last_written: Mutex<i64>,
}

impl MetricStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub async fn connect(path: &str) -> Result<Self, StoreError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let unavailable = |source| StoreError::Unavailable {
            path: path.to_string(),
            source,
        };
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))
            .map_err(unavailable)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .connect_with(opts)
            .await
            .map_err(unavailable)?;
        let store = Self {
            pool,
            last_written: Mutex::new(0),
        };
        store.init().await?;
        Ok(store)
    }

    /// Create missing tables/indexes and reseed the write clock. Safe to call repeatedly.
    #[instrument(skip(self), fields(repo = "metric_store", operation = "init"))]
    pub async fn init(&self) -> Result<(), StoreError> {
        schema::ensure_schema(&self.pool).await?;
        let max_ts = schema::max_timestamp(&self.pool).await?;
        let mut last = self.last_written.lock().await;
        *last = (*last).max(max_ts);
        Ok(())
    }

    /// Append a batch stamped with the current time.
    pub async fn insert_samples(&self, batch: &SampleBatch) -> Result<usize, StoreError> {
        self.insert_samples_at(batch, now_ms()).await
    }

    /// Append a batch in one transaction, all rows stamped `max(at, last write)`.
    /// Nothing from the batch is visible unless every row is written.
    #[instrument(skip(self, batch), fields(repo = "metric_store", operation = "insert_samples", samples_count = batch.len()))]
    pub async fn insert_samples_at(&self, batch: &SampleBatch, at: i64) -> Result<usize, StoreError> {
        if batch.is_empty() {
            return Ok(0);
        }
        let mut last = self.last_written.lock().await;
        let ts = at.max(*last);
        let mut tx = self.pool.begin().await?;

        for s in &batch.disk_usage {
            sqlx::query(
                "INSERT INTO disk_usage (timestamp, path, total_gb, used_gb, free_gb, usage_percent) VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(ts)
            .bind(&s.path)
            .bind(s.total_gb)
            .bind(s.used_gb)
            .bind(s.free_gb)
            .bind(s.usage_percent)
            .execute(&mut *tx)
            .await?;
        }
        for s in &batch.inode_usage {
            sqlx::query(
                "INSERT INTO inode_usage (timestamp, path, total_inodes, used_inodes, free_inodes, usage_percent) VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(ts)
            .bind(&s.path)
            .bind(s.total_inodes)
            .bind(s.used_inodes)
            .bind(s.free_inodes)
            .bind(s.usage_percent)
            .execute(&mut *tx)
            .await?;
        }
        for s in &batch.system_health {
            sqlx::query(
                "INSERT INTO system_health (timestamp, cpu_percent, memory_percent, load_avg_1, load_avg_5, load_avg_15) VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(ts)
            .bind(s.cpu_percent)
            .bind(s.memory_percent)
            .bind(s.load_avg_1)
            .bind(s.load_avg_5)
            .bind(s.load_avg_15)
            .execute(&mut *tx)
            .await?;
        }
        for s in &batch.filesystem_health {
            sqlx::query(
                "INSERT INTO filesystem_health (timestamp, path, filesystem, status, errors) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(ts)
            .bind(&s.path)
            .bind(&s.filesystem)
            .bind(s.status.as_str())
            .bind(s.errors)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        *last = ts;
        Ok(batch.len())
    }

    /// Append alerts in one transaction; returns the stored rows.
    pub async fn insert_alerts(&self, alerts: &[AlertDraft]) -> Result<Vec<Alert>, StoreError> {
        self.insert_alerts_at(alerts, now_ms()).await
    }

    #[instrument(skip(self, alerts), fields(repo = "metric_store", operation = "insert_alerts", alerts_count = alerts.len()))]
    pub async fn insert_alerts_at(
        &self,
        alerts: &[AlertDraft],
        at: i64,
    ) -> Result<Vec<Alert>, StoreError> {
        if alerts.is_empty() {
            return Ok(Vec::new());
        }
        let mut last = self.last_written.lock().await;
        let ts = at.max(*last);
        let mut tx = self.pool.begin().await?;

        let mut out = Vec::with_capacity(alerts.len());
        for a in alerts {
            let r = sqlx::query(
                "INSERT INTO alerts (timestamp, alert_type, severity, message, resolved) VALUES ($1, $2, $3, $4, 0)",
            )
            .bind(ts)
            .bind(a.alert_type.as_str())
            .bind(a.severity.as_str())
            .bind(&a.message)
            .execute(&mut *tx)
            .await?;
            out.push(Alert {
                id: r.last_insert_rowid(),
                timestamp: ts,
                alert_type: a.alert_type,
                severity: a.severity,
                message: a.message.clone(),
                resolved: false,
            });
        }

        tx.commit().await?;
        *last = ts;
        Ok(out)
    }

    /// Samples of `kind` in `range`, ascending by timestamp. `path` is ignored for
    /// host-global kinds.
    pub async fn query_range(
        &self,
        kind: SampleKind,
        path: Option<&str>,
        range: TimeRange,
    ) -> Result<Vec<Sample>, StoreError> {
        Ok(match kind {
            SampleKind::DiskUsage => self
                .disk_usage_range(path, range)
                .await?
                .into_iter()
                .map(Sample::DiskUsage)
                .collect(),
            SampleKind::InodeUsage => self
                .inode_usage_range(path, range)
                .await?
                .into_iter()
                .map(Sample::InodeUsage)
                .collect(),
            SampleKind::SystemHealth => self
                .system_health_range(range)
                .await?
                .into_iter()
                .map(Sample::SystemHealth)
                .collect(),
            SampleKind::FilesystemHealth => self
                .filesystem_health_range(path, range)
                .await?
                .into_iter()
                .map(Sample::FilesystemHealth)
                .collect(),
        })
    }

    #[instrument(skip(self), fields(repo = "metric_store", operation = "disk_usage_range"))]
    pub async fn disk_usage_range(
        &self,
        path: Option<&str>,
        range: TimeRange,
    ) -> Result<Vec<DiskUsageSample>, StoreError> {
        let rows = self
            .fetch_range(
                "SELECT timestamp, path, total_gb, used_gb, free_gb, usage_percent FROM disk_usage",
                path,
                range,
            )
            .await?;
        rows.iter().map(rows::disk_usage).collect()
    }

    #[instrument(skip(self), fields(repo = "metric_store", operation = "inode_usage_range"))]
    pub async fn inode_usage_range(
        &self,
        path: Option<&str>,
        range: TimeRange,
    ) -> Result<Vec<InodeUsageSample>, StoreError> {
        let rows = self
            .fetch_range(
                "SELECT timestamp, path, total_inodes, used_inodes, free_inodes, usage_percent FROM inode_usage",
                path,
                range,
            )
            .await?;
        rows.iter().map(rows::inode_usage).collect()
    }

    #[instrument(skip(self), fields(repo = "metric_store", operation = "system_health_range"))]
    pub async fn system_health_range(
        &self,
        range: TimeRange,
    ) -> Result<Vec<SystemHealthSample>, StoreError> {
        let rows = self
            .fetch_range(
                "SELECT timestamp, cpu_percent, memory_percent, load_avg_1, load_avg_5, load_avg_15 FROM system_health",
                None,
                range,
            )
            .await?;
        rows.iter().map(rows::system_health).collect()
    }

    #[instrument(skip(self), fields(repo = "metric_store", operation = "filesystem_health_range"))]
    pub async fn filesystem_health_range(
        &self,
        path: Option<&str>,
        range: TimeRange,
    ) -> Result<Vec<FilesystemHealthSample>, StoreError> {
        let rows = self
            .fetch_range(
                "SELECT timestamp, path, filesystem, status, errors FROM filesystem_health",
                path,
                range,
            )
            .await?;
        rows.iter().map(rows::filesystem_health).collect()
    }

    /// Alerts in `range`, ascending by timestamp (then id).
    #[instrument(skip(self), fields(repo = "metric_store", operation = "alerts_range"))]
    pub async fn alerts_range(&self, range: TimeRange) -> Result<Vec<Alert>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, timestamp, alert_type, severity, message, resolved FROM alerts
             WHERE timestamp >= $1 AND ($2 IS NULL OR timestamp < $2)
             ORDER BY timestamp ASC, id ASC",
        )
        .bind(range.since)
        .bind(range.until)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(rows::alert).collect()
    }

    /// Mark one alert resolved. Returns false when no such alert exists.
    #[instrument(skip(self), fields(repo = "metric_store", operation = "resolve_alert"))]
    pub async fn resolve_alert(&self, id: i64) -> Result<bool, StoreError> {
        let r = sqlx::query("UPDATE alerts SET resolved = 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected() > 0)
    }

    /// Delete rows of `kind` with `timestamp < cutoff`; a row exactly at `cutoff` stays.
    #[instrument(skip(self), fields(repo = "metric_store", operation = "prune_older_than"))]
    pub async fn prune_older_than(&self, kind: SampleKind, cutoff: i64) -> Result<u64, StoreError> {
        self.delete_before(kind.table(), cutoff).await
    }

    #[instrument(skip(self), fields(repo = "metric_store", operation = "prune_alerts_older_than"))]
    pub async fn prune_alerts_older_than(&self, cutoff: i64) -> Result<u64, StoreError> {
        self.delete_before("alerts", cutoff).await
    }

    /// Reclaim space after deletes (run periodically after pruning).
    #[instrument(skip(self), fields(repo = "metric_store", operation = "vacuum"))]
    pub async fn vacuum(&self) -> Result<(), StoreError> {
        sqlx::query("VACUUM").execute(&self.pool).await?;
        Ok(())
    }

    async fn delete_before(&self, table: &'static str, cutoff: i64) -> Result<u64, StoreError> {
        let sql = format!("DELETE FROM {table} WHERE timestamp < $1");
        let r = sqlx::query(&sql)
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected())
    }

    /// `select` must name a table without a WHERE clause.
    async fn fetch_range(
        &self,
        select: &str,
        path: Option<&str>,
        range: TimeRange,
    ) -> Result<Vec<SqliteRow>, StoreError> {
        let rows = match path {
            Some(path) => {
                let sql = format!(
                    "{select} WHERE path = $1 AND timestamp >= $2 AND ($3 IS NULL OR timestamp < $3) ORDER BY timestamp ASC, id ASC"
                );
                sqlx::query(&sql)
                    .bind(path)
                    .bind(range.since)
                    .bind(range.until)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "{select} WHERE timestamp >= $1 AND ($2 IS NULL OR timestamp < $2) ORDER BY timestamp ASC, id ASC"
                );
                sqlx::query(&sql)
                    .bind(range.since)
                    .bind(range.until)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }
}
