// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while aggregating result files and rendering charts.
///
/// Absence of optional inputs is not represented here: discovery and loading
/// return empty results for missing directories and files. Everything below is
/// fatal for the aggregation pass or chart that produced it.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("input not found: {}", path.display())]
    MissingInput { path: PathBuf },

    #[error("schema mismatch in {}: {reason}", path.display())]
    SchemaMismatch { path: PathBuf, reason: String },

    #[error("malformed record in {} at line {line}: {reason}", path.display())]
    MalformedRecord {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("failed to parse CSV {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render {}: {message}", path.display())]
    Render { path: PathBuf, message: String },

    #[error("invalid file pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("invalid chart request: {0}")]
    InvalidChart(String),
}

impl AggregationError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    pub fn schema(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AggregationError>;
