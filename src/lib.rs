// Host metrics monitor: periodic disk/inode/health sampling into SQLite, threshold alerts,
// and windowed trend and cleanup reports.

pub mod analysis;
pub mod collector;
pub mod config;
pub mod cycle;
pub mod error;
pub mod evaluator;
pub mod metric_store;
pub mod models;
pub mod notify;
pub mod report;
pub mod scheduler;
pub mod version;
