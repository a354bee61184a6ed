//! Core types for AgentDesk.
//!
//! This crate contains shared data structures used across all AgentDesk crates:
//! - Record and RecordId types for fetched resources
//! - Resource kinds
//! - Session credentials
//! - Booking draft validation
//! - Configuration types
//! - Error types

mod booking;
mod config;
mod credentials;
mod error;
mod record;
mod resource;

pub use booking::{BookingDraft, ValidatedBooking};
pub use config::{config_dir, config_path, AppConfig, DataConfig, ExportConfig, SessionConfig};
pub use credentials::Credentials;
pub use error::{ConfigError, DraftError, FetchError};
pub use record::{parse_amount, parse_calendar_date, Record, RecordId};
pub use resource::ResourceKind;
