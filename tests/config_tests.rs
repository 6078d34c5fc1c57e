// Config loading and validation tests

use hostwatch::config::AppConfig;

const VALID_CONFIG: &str = r#"
[database]
path = "data/monitor.db"
retention_days = 14
vacuum_schedule = "0 0 3 * * *"

[monitoring]
monitored_paths = ["/", "/srv"]
check_interval_secs = 60
collector_timeout_secs = 10
stats_log_interval_secs = 600

[thresholds]
disk_usage_percent = 80
inode_usage_percent = 90.5
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.database.path, "data/monitor.db");
    assert_eq!(config.database.retention_days, 14);
    assert_eq!(config.database.vacuum_schedule.as_deref(), Some("0 0 3 * * *"));
    assert_eq!(config.monitoring.monitored_paths, vec!["/", "/srv"]);
    assert_eq!(config.monitoring.check_interval_secs, 60);
    assert_eq!(config.monitoring.collector_timeout_secs, 10);
    assert_eq!(config.thresholds.disk_usage_percent, 80.0);
    assert_eq!(config.thresholds.inode_usage_percent, 90.5);
}

#[test]
fn test_config_defaults_when_empty() {
    let config = AppConfig::load_from_str("").expect("empty config is valid");
    assert_eq!(config.database.path, "data/hostwatch.db");
    assert_eq!(config.database.retention_days, 30);
    assert!(config.database.vacuum_schedule.is_none());
    assert_eq!(config.database.vacuum_interval_secs, 86_400);
    assert_eq!(
        config.monitoring.monitored_paths,
        vec!["/", "/home", "/var", "/tmp"]
    );
    assert_eq!(config.monitoring.check_interval_secs, 300);
    assert_eq!(config.monitoring.collector_timeout_secs, 30);
    assert_eq!(config.monitoring.stats_log_interval_secs, 3600);
    assert_eq!(config.thresholds.disk_usage_percent, 85.0);
    assert_eq!(config.thresholds.inode_usage_percent, 85.0);
}

#[test]
fn test_config_partial_section_keeps_other_defaults() {
    let config = AppConfig::load_from_str("[thresholds]\ndisk_usage_percent = 70\n").unwrap();
    assert_eq!(config.thresholds.disk_usage_percent, 70.0);
    assert_eq!(config.thresholds.inode_usage_percent, 85.0);
    assert_eq!(config.database.retention_days, 30);
}

#[test]
fn test_config_validation_rejects_empty_db_path() {
    let bad = VALID_CONFIG.replace("path = \"data/monitor.db\"", "path = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("database.path"));
}

#[test]
fn test_config_validation_rejects_retention_zero() {
    let bad = VALID_CONFIG.replace("retention_days = 14", "retention_days = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("retention_days"));
}

#[test]
fn test_config_validation_rejects_empty_path_list() {
    let bad = VALID_CONFIG.replace("monitored_paths = [\"/\", \"/srv\"]", "monitored_paths = []");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("monitored_paths"));
}

#[test]
fn test_config_validation_rejects_empty_path_entry() {
    let bad = VALID_CONFIG.replace("\"/srv\"", "\"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("empty paths"));
}

#[test]
fn test_config_validation_rejects_check_interval_zero() {
    let bad = VALID_CONFIG.replace("check_interval_secs = 60", "check_interval_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("check_interval_secs"));
}

#[test]
fn test_config_validation_rejects_collector_timeout_zero() {
    let bad = VALID_CONFIG.replace("collector_timeout_secs = 10", "collector_timeout_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("collector_timeout_secs"));
}

#[test]
fn test_config_validation_rejects_stats_log_interval_zero() {
    let bad = VALID_CONFIG.replace(
        "stats_log_interval_secs = 600",
        "stats_log_interval_secs = 0",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("stats_log_interval_secs"));
}

#[test]
fn test_config_validation_rejects_threshold_out_of_range() {
    let bad = VALID_CONFIG.replace("disk_usage_percent = 80", "disk_usage_percent = 120");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("disk_usage_percent"));

    let bad = VALID_CONFIG.replace("inode_usage_percent = 90.5", "inode_usage_percent = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("inode_usage_percent"));
}

#[test]
fn test_config_validation_rejects_invalid_toml() {
    let err = AppConfig::load_from_str("not valid toml [[[").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_config_load_from_path() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, VALID_CONFIG).unwrap();
    let config = AppConfig::load_from_path(path.to_str().unwrap()).unwrap();
    assert_eq!(config.database.retention_days, 14);
}

// load() reads CONFIG_FILE; kept in one test so parallel tests never race on the env var.
#[test]
fn test_config_load_via_env_never_fails() {
    let dir = tempfile::TempDir::new().unwrap();

    let good = dir.path().join("good.toml");
    std::fs::write(&good, VALID_CONFIG).unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", good.to_str().unwrap()) };
    assert_eq!(AppConfig::load().database.path, "data/monitor.db");

    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "[thresholds]\ndisk_usage_percent = -5\n").unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", bad.to_str().unwrap()) };
    assert_eq!(AppConfig::load().thresholds.disk_usage_percent, 85.0);

    let missing = dir.path().join("missing.toml");
    unsafe { std::env::set_var("CONFIG_FILE", missing.to_str().unwrap()) };
    assert_eq!(AppConfig::load().database.path, "data/hostwatch.db");

    unsafe { std::env::remove_var("CONFIG_FILE") };
}
