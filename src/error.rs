//! Error types for the statement auditor.

use crate::layout::DateError;
use thiserror::Error;

/// Result type alias for auditor operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Errors that abort an audit run.
///
/// Business-rule mismatches (FAIL checks, INVALID structures, duplicate
/// counts and so on) are never errors: they are the product's output and
/// travel as report rows. Only conditions that make the scan itself
/// impossible to finish end up here.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A detail record carried a posting date the engine cannot classify
    #[error("line {line}: {source}")]
    Format { line: u64, source: DateError },

    /// Failed to write a report as CSV
    #[error("report error: {0}")]
    Csv(#[from] csv::Error),

    /// The run was cancelled between records
    #[error("cancelled after {processed} lines")]
    Cancelled { processed: u64 },
}
