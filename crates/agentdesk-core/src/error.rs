//! Error types shared across AgentDesk crates.

use thiserror::Error;

/// Errors from the fetch boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport failed (unreachable backend, unreadable source).
    #[error("Network error: {0}")]
    Network(String),

    /// The response does not match the record shape.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config directory found.
    #[error("Config directory not found")]
    NoConfigDir,

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Reasons a booking draft is rejected before submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Client name is required")]
    MissingClientName,

    #[error("Destination is required")]
    MissingDestination,

    #[error("Start date is required")]
    MissingStartDate,

    #[error("End date is required")]
    MissingEndDate,

    #[error("Invalid {field}: '{value}' is not a YYYY-MM-DD date")]
    InvalidDate { field: &'static str, value: String },

    #[error("Please enter a valid amount")]
    InvalidAmount,

    #[error("End date cannot be before start date")]
    EndBeforeStart,
}
