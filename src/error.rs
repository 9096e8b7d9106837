//! Error taxonomy for the report pipeline.
//!
//! Every variant is terminal for a run; the binary turns them into a
//! non-zero exit code.

use crate::models::ColumnType;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by the loader, the aggregator and the reporter.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Input file is missing, unreadable, malformed or empty.
    #[error("failed to load data from {}: {reason}", path.display())]
    DataLoad { path: PathBuf, reason: String },

    /// An aggregation named a column that is not in the table.
    #[error("column '{column}' not found (available: {})", available.join(", "))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    /// An aggregation named a column of the wrong type.
    #[error("column '{column}' has type {found}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: ColumnType,
        found: ColumnType,
    },

    /// The report (or one of its side artifacts) could not be written.
    #[error("failed to write report to {}: {reason}", path.display())]
    ReportWrite { path: PathBuf, reason: String },
}

impl ReportError {
    pub fn data_load(path: &Path, reason: impl Into<String>) -> Self {
        ReportError::DataLoad {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn report_write(path: &Path, reason: impl ToString) -> Self {
        ReportError::ReportWrite {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
