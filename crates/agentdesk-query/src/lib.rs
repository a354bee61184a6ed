//! List query engine for AgentDesk.
//!
//! This crate provides:
//! - `ResourceSchema` / `ColumnSpec` - per-resource column tables
//! - `QuerySpec` - search text, date range and sort key
//! - `QueryEngine` - pure evaluation of a Query Spec against a record snapshot
//! - `ExportFormatter` - CSV reports of a derived view

pub mod engine;
pub mod error;
pub mod export;
pub mod schema;
pub mod spec;

// Re-export commonly used types
pub use engine::QueryEngine;
pub use error::{ExportError, QueryError};
pub use export::{ExportFile, ExportFormatter, CSV_MIME_TYPE};
pub use schema::{ColumnSpec, FieldKind, ResourceSchema};
pub use spec::{DateRange, QuerySpec, SortDirection, SortKey};
