//! CLI error type.

use agentdesk_core::{ConfigError, DraftError, FetchError};
use agentdesk_query::{ExportError, QueryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Booking rejected: {0}")]
    Draft(#[from] DraftError),

    #[error("No data directory: pass --data-dir or set [data] dir in the config file")]
    NoDataDir,

    #[error("IO error: {0}")]
    Io(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}
