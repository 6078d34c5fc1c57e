use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub monitoring: MonitoringConfig,
    pub thresholds: ThresholdConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    /// Age limit for samples. Alerts use their own fixed horizon.
    pub retention_days: u32,
    /// Cron expression (with seconds) for VACUUM in daemon mode, e.g. "0 0 3 * * *". Local time.
    pub vacuum_schedule: Option<String>,
    /// VACUUM period in seconds when no schedule is set.
    pub vacuum_interval_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/hostwatch.db".into(),
            retention_days: 30,
            vacuum_schedule: None,
            vacuum_interval_secs: 86_400,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub monitored_paths: Vec<String>,
    /// Seconds between cycles in daemon mode.
    pub check_interval_secs: u64,
    /// Upper bound for a single collector call.
    pub collector_timeout_secs: u64,
    /// How often daemon mode logs cumulative cycle stats at INFO level.
    pub stats_log_interval_secs: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            monitored_paths: ["/", "/home", "/var", "/tmp"]
                .into_iter()
                .map(String::from)
                .collect(),
            check_interval_secs: 300,
            collector_timeout_secs: 30,
            stats_log_interval_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub disk_usage_percent: f64,
    pub inode_usage_percent: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            disk_usage_percent: 85.0,
            inode_usage_percent: 85.0,
        }
    }
}

macro_rules! invalid_unless {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err(ConfigError::Invalid(format!($($arg)+)));
        }
    };
}

impl AppConfig {
    /// Load from `CONFIG_FILE` (default `config.toml`). Never fails: a missing file means
    /// defaults, an unreadable or invalid one is logged and replaced by defaults.
    pub fn load() -> Self {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        match Self::load_from_path(&path) {
            Ok(config) => config,
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::debug!(path = %path, "no config file, using defaults");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "config rejected, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        invalid_unless!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        invalid_unless!(
            self.database.retention_days > 0,
            "database.retention_days must be > 0, got {}",
            self.database.retention_days
        );
        invalid_unless!(
            self.database.vacuum_interval_secs > 0,
            "database.vacuum_interval_secs must be > 0, got {}",
            self.database.vacuum_interval_secs
        );
        invalid_unless!(
            !self.monitoring.monitored_paths.is_empty(),
            "monitoring.monitored_paths must list at least one path"
        );
        invalid_unless!(
            self.monitoring.monitored_paths.iter().all(|p| !p.is_empty()),
            "monitoring.monitored_paths must not contain empty paths"
        );
        invalid_unless!(
            self.monitoring.check_interval_secs > 0,
            "monitoring.check_interval_secs must be > 0, got {}",
            self.monitoring.check_interval_secs
        );
        invalid_unless!(
            self.monitoring.collector_timeout_secs > 0,
            "monitoring.collector_timeout_secs must be > 0, got {}",
            self.monitoring.collector_timeout_secs
        );
        invalid_unless!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        for (name, value) in [
            ("disk_usage_percent", self.thresholds.disk_usage_percent),
            ("inode_usage_percent", self.thresholds.inode_usage_percent),
        ] {
            invalid_unless!(
                value > 0.0 && value <= 100.0,
                "thresholds.{} must be in (0, 100], got {}",
                name,
                value
            );
        }
        Ok(())
    }
}
