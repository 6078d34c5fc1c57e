// DDL for the four sample tables and the alert log. Column sets are part of the external
// contract; `timestamp` (Unix epoch millis) is the ordering key everywhere.

use sqlx::SqlitePool;

const TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS disk_usage (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp INTEGER NOT NULL,
        path TEXT NOT NULL,
        total_gb REAL NOT NULL,
        used_gb REAL NOT NULL,
        free_gb REAL NOT NULL,
        usage_percent REAL NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inode_usage (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp INTEGER NOT NULL,
        path TEXT NOT NULL,
        total_inodes INTEGER NOT NULL,
        used_inodes INTEGER NOT NULL,
        free_inodes INTEGER NOT NULL,
        usage_percent REAL NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS system_health (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp INTEGER NOT NULL,
        cpu_percent REAL NOT NULL,
        memory_percent REAL NOT NULL,
        load_avg_1 REAL NOT NULL,
        load_avg_5 REAL NOT NULL,
        load_avg_15 REAL NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS filesystem_health (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp INTEGER NOT NULL,
        path TEXT NOT NULL,
        filesystem TEXT NOT NULL,
        status TEXT NOT NULL,
        errors INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS alerts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp INTEGER NOT NULL,
        alert_type TEXT NOT NULL,
        severity TEXT NOT NULL,
        message TEXT NOT NULL,
        resolved INTEGER NOT NULL DEFAULT 0
    )
    "#,
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_disk_usage_timestamp ON disk_usage(timestamp)",
    "CREATE INDEX IF NOT EXISTS idx_inode_usage_timestamp ON inode_usage(timestamp)",
    "CREATE INDEX IF NOT EXISTS idx_system_health_timestamp ON system_health(timestamp)",
    "CREATE INDEX IF NOT EXISTS idx_filesystem_health_timestamp ON filesystem_health(timestamp)",
    "CREATE INDEX IF NOT EXISTS idx_alerts_timestamp ON alerts(timestamp)",
];

/// Idempotent: every statement is IF NOT EXISTS, existing rows are untouched.
pub(super) async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for ddl in TABLES.iter().chain(INDEXES) {
        sqlx::query(*ddl).execute(&mut *tx).await?;
    }
    tx.commit().await
}

/// Highest timestamp across all tables, 0 for an empty store.
pub(super) async fn max_timestamp(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, Option<i64>>(
        "SELECT MAX(ts) FROM (
            SELECT MAX(timestamp) AS ts FROM disk_usage
            UNION ALL SELECT MAX(timestamp) FROM inode_usage
            UNION ALL SELECT MAX(timestamp) FROM system_health
            UNION ALL SELECT MAX(timestamp) FROM filesystem_health
            UNION ALL SELECT MAX(timestamp) FROM alerts
        )",
    )
    .fetch_one(pool)
    .await
    .map(|ts| ts.unwrap_or(0))
}
