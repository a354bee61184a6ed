//! Error types for querying and exporting.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while configuring or evaluating a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The user-supplied bounds are inverted.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// The sort key names a field that is not a sortable column.
    #[error("Unknown sort key '{0}'")]
    UnknownSortKey(String),

    /// A date-range field is missing from the schema or is not a date column.
    #[error("Field '{0}' is not a date column")]
    NotADateField(String),

    /// Two columns share the same field.
    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),
}

/// Errors raised while writing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV flush failed: {0}")]
    Flush(String),

    #[error("Export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
