// Error taxonomy: collection, store, config, delivery, and per-cycle failure records.

use serde::Serialize;
use std::time::Duration;

use crate::models::SampleKind;

/// One source could not be sampled. Contained per path/kind by the cycle.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CollectionError {
    #[error("{kind} collection failed for {}: {reason}", .path.as_deref().unwrap_or("host"))]
    Failed {
        kind: SampleKind,
        path: Option<String>,
        reason: String,
    },
    #[error("{kind} collection timed out after {timeout:?} for {}", .path.as_deref().unwrap_or("host"))]
    TimedOut {
        kind: SampleKind,
        path: Option<String>,
        timeout: Duration,
    },
}

impl CollectionError {
    pub fn failed(kind: SampleKind, path: Option<&str>, reason: impl ToString) -> Self {
        CollectionError::Failed {
            kind,
            path: path.map(str::to_owned),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> SampleKind {
        match self {
            CollectionError::Failed { kind, .. } | CollectionError::TimedOut { kind, .. } => *kind,
        }
    }

    pub fn path(&self) -> Option<&str> {
        match self {
            CollectionError::Failed { path, .. } | CollectionError::TimedOut { path, .. } => {
                path.as_deref()
            }
        }
    }
}

/// Persistence layer failure. The cycle treats every variant as "store unavailable".
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("metric store unavailable at {path}: {source}")]
    Unavailable {
        path: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("metric store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("metric store query: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("invalid row: {0}")]
    InvalidRow(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("alert sink failed: {0}")]
    Sink(String),
}

/// Phase of a monitoring cycle, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Collect,
    Persist,
    Evaluate,
    Prune,
}

/// Non-fatal failure recorded in a cycle result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum CycleError {
    Collection {
        kind: SampleKind,
        path: Option<String>,
        message: String,
    },
    AlertPersistence {
        message: String,
    },
    Prune {
        /// `None` = alert table.
        kind: Option<SampleKind>,
        message: String,
    },
}

impl CycleError {
    pub fn phase(&self) -> Phase {
        match self {
            CycleError::Collection { .. } => Phase::Collect,
            CycleError::AlertPersistence { .. } => Phase::Evaluate,
            CycleError::Prune { .. } => Phase::Prune,
        }
    }
}

impl From<&CollectionError> for CycleError {
    fn from(e: &CollectionError) -> Self {
        CycleError::Collection {
            kind: e.kind(),
            path: e.path().map(str::to_owned),
            message: e.to_string(),
        }
    }
}
