// Shared test helpers: temp stores, sample builders, fake collector and sink.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hostwatch::collector::MetricCollector;
use hostwatch::config::ThresholdConfig;
use hostwatch::cycle::CycleConfig;
use hostwatch::error::{CollectionError, DeliveryError};
use hostwatch::metric_store::MetricStore;
use hostwatch::models::*;
use hostwatch::notify::AlertSink;
use tempfile::TempDir;

pub const DAY: i64 = 24 * 60 * 60 * 1000;

pub async fn temp_store() -> (TempDir, Arc<MetricStore>, String) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hostwatch.db");
    let path_str = path.to_str().unwrap().to_string();
    let store = MetricStore::connect(&path_str).await.unwrap();
    (dir, Arc::new(store), path_str)
}

/// Side connection for breaking the schema under a live store.
pub async fn drop_table(db_path: &str, table: &str) {
    let pool = sqlx::SqlitePool::connect(&format!("sqlite:{}", db_path))
        .await
        .unwrap();
    sqlx::query(&format!("DROP TABLE {table}"))
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;
}

pub fn disk(path: &str, usage_percent: f64) -> DiskUsageSample {
    DiskUsageSample {
        timestamp: 0,
        path: path.into(),
        total_gb: 100.0,
        used_gb: usage_percent,
        free_gb: 100.0 - usage_percent,
        usage_percent,
    }
}

pub fn inode(path: &str, usage_percent: f64) -> InodeUsageSample {
    let used = (usage_percent * 10.0) as i64;
    InodeUsageSample {
        timestamp: 0,
        path: path.into(),
        total_inodes: 1000,
        used_inodes: used,
        free_inodes: 1000 - used,
        usage_percent,
    }
}

pub fn health(cpu: f64, memory: f64, load: f64) -> SystemHealthSample {
    SystemHealthSample::new(cpu, memory, [load, load, load])
}

pub fn disk_batch(samples: &[(&str, f64)]) -> SampleBatch {
    SampleBatch {
        disk_usage: samples.iter().map(|(p, u)| disk(p, *u)).collect(),
        ..Default::default()
    }
}

pub fn draft(alert_type: AlertType, severity: Severity) -> AlertDraft {
    AlertDraft {
        alert_type,
        severity,
        message: format!("{alert_type} {severity}"),
    }
}

pub fn cycle_config(paths: &[&str]) -> CycleConfig {
    CycleConfig {
        monitored_paths: paths.iter().map(|p| p.to_string()).collect(),
        thresholds: ThresholdConfig::default(),
        retention_days: 30,
        collector_timeout: Duration::from_millis(200),
    }
}

/// Collector returning canned usage; individual (kind, path) pairs can fail or hang.
#[derive(Default)]
pub struct FakeCollector {
    pub disk_usage: HashMap<String, f64>,
    pub inode_usage: HashMap<String, f64>,
    pub failing: HashSet<(SampleKind, String)>,
    pub hanging: HashSet<(SampleKind, String)>,
    pub health_fails: bool,
}

impl FakeCollector {
    pub fn uniform(paths: &[&str], usage_percent: f64) -> Self {
        let mut c = Self::default();
        for p in paths {
            c.disk_usage.insert(p.to_string(), usage_percent);
            c.inode_usage.insert(p.to_string(), 10.0);
        }
        c
    }

    pub fn with_disk(mut self, path: &str, usage_percent: f64) -> Self {
        self.disk_usage.insert(path.to_string(), usage_percent);
        self
    }

    pub fn with_inode(mut self, path: &str, usage_percent: f64) -> Self {
        self.inode_usage.insert(path.to_string(), usage_percent);
        self
    }

    pub fn failing(mut self, kind: SampleKind, path: &str) -> Self {
        self.failing.insert((kind, path.to_string()));
        self
    }

    pub fn hanging(mut self, kind: SampleKind, path: &str) -> Self {
        self.hanging.insert((kind, path.to_string()));
        self
    }

    async fn gate(&self, kind: SampleKind, path: &str) -> Result<(), CollectionError> {
        let key = (kind, path.to_string());
        if self.hanging.contains(&key) {
            std::future::pending::<()>().await;
        }
        if self.failing.contains(&key) {
            return Err(CollectionError::failed(kind, Some(path), "injected failure"));
        }
        Ok(())
    }
}

impl MetricCollector for FakeCollector {
    async fn collect_disk_usage(&self, path: &str) -> Result<DiskUsageSample, CollectionError> {
        self.gate(SampleKind::DiskUsage, path).await?;
        let usage = self.disk_usage.get(path).copied().unwrap_or(0.0);
        Ok(disk(path, usage))
    }

    async fn collect_inode_usage(&self, path: &str) -> Result<InodeUsageSample, CollectionError> {
        self.gate(SampleKind::InodeUsage, path).await?;
        let usage = self.inode_usage.get(path).copied().unwrap_or(0.0);
        Ok(inode(path, usage))
    }

    async fn collect_filesystem_health(
        &self,
        path: &str,
    ) -> Result<FilesystemHealthSample, CollectionError> {
        self.gate(SampleKind::FilesystemHealth, path).await?;
        Ok(FilesystemHealthSample::from_check(path, "ext4", Some(0)))
    }

    async fn collect_system_health(&self) -> Result<SystemHealthSample, CollectionError> {
        if self.health_fails {
            return Err(CollectionError::failed(
                SampleKind::SystemHealth,
                None,
                "injected failure",
            ));
        }
        Ok(health(20.0, 40.0, 0.5))
    }
}

/// Sink that records every delivery; optionally fails after recording.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub delivered: Arc<Mutex<Vec<Vec<AlertDraft>>>>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn deliveries(&self) -> Vec<Vec<AlertDraft>> {
        self.delivered.lock().unwrap().clone()
    }
}

impl AlertSink for RecordingSink {
    async fn deliver(&self, alerts: &[AlertDraft]) -> Result<(), DeliveryError> {
        self.delivered.lock().unwrap().push(alerts.to_vec());
        if self.fail {
            return Err(DeliveryError::Sink("smtp down".into()));
        }
        Ok(())
    }
}
