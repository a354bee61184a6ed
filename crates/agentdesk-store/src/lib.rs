//! Record Store and fetch boundary for AgentDesk.
//!
//! This crate provides:
//! - `RecordSource` - async fetch/create boundary, with `JsonDirSource` for local files
//! - `RecordStore` - observable snapshot of one resource, guarded by fetch tickets
//! - `ResourceTab` - engine + store + Query Spec for one dashboard tab

pub mod source;
pub mod store;
pub mod tab;

// Re-export commonly used types
pub use source::{decode_records, JsonDirSource, RecordSource};
pub use store::{FetchTicket, RecordStore, StoreSnapshot, StoreStatus};
pub use tab::{DerivedView, ResourceTab, ViewStatus};
