//! Record Store with automatic change notifications.
//!
//! Mutation = notification: every snapshot replacement is broadcast, and the
//! snapshot is swapped whole so readers see either the old or the new state.

use std::sync::Arc;

use agentdesk_core::{FetchError, Record, ResourceKind};
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;

// =============================================================================
// Snapshot Types
// =============================================================================

/// Outcome of the most recently applied fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreStatus {
    /// No fetch has completed yet.
    NotLoaded,
    Ready,
    /// Transport failed; the store was emptied.
    NetworkFailed(String),
    /// The response was malformed; the previous records were kept.
    DecodeFailed(String),
}

/// Immutable view of the store at one point in time.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    /// Ticket of the fetch that produced this snapshot, 0 before any.
    pub seq: u64,
    pub records: Arc<Vec<Arc<Record>>>,
    pub status: StoreStatus,
}

impl StoreSnapshot {
    fn empty() -> Self {
        Self {
            seq: 0,
            records: Arc::new(Vec::new()),
            status: StoreStatus::NotLoaded,
        }
    }
}

/// Sequence number handed out when a fetch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

// =============================================================================
// RecordStore
// =============================================================================

/// All records of one resource, replaced wholesale on each fetch.
///
/// ## Overlapping fetches
///
/// Each fetch takes a ticket from `begin_fetch`. A completion is applied only
/// if its ticket is newer than the one behind the current snapshot, so a slow
/// older response can never overwrite a newer one.
///
/// ## Thread Safety
///
/// `parking_lot::RwLock` holds the snapshot and `tokio::sync::watch`
/// carries broadcasts. Readers clone the snapshot's `Arc`s and never block
/// a completion for longer than the swap.
pub struct RecordStore {
    resource: ResourceKind,
    inner: RwLock<StoreSnapshot>,
    next_ticket: Mutex<u64>,
    tx: watch::Sender<StoreSnapshot>,
    rx: watch::Receiver<StoreSnapshot>,
}

impl RecordStore {
    /// Create an empty, not-yet-loaded store.
    pub fn new(resource: ResourceKind) -> Self {
        let (tx, rx) = watch::channel(StoreSnapshot::empty());
        Self {
            resource,
            inner: RwLock::new(StoreSnapshot::empty()),
            next_ticket: Mutex::new(0),
            tx,
            rx,
        }
    }

    pub fn resource(&self) -> ResourceKind {
        self.resource
    }

    // =========================================================================
    // Fetch Lifecycle
    // =========================================================================

    /// Start a fetch. Tickets increase monotonically.
    pub fn begin_fetch(&self) -> FetchTicket {
        let mut next = self.next_ticket.lock();
        *next += 1;
        tracing::debug!("Fetch #{} started for {}", *next, self.resource);
        FetchTicket(*next)
    }

    /// Apply a fetch result.
    ///
    /// Returns `false` and leaves the store untouched when a newer ticket
    /// has already been applied. Broadcasts the new snapshot otherwise.
    pub fn complete(
        &self,
        ticket: FetchTicket,
        result: Result<Vec<Record>, FetchError>,
    ) -> bool {
        let snapshot = {
            let mut inner = self.inner.write();
            if ticket.0 <= inner.seq {
                tracing::warn!(
                    "Dropping stale fetch #{} for {} (#{} already applied)",
                    ticket.0,
                    self.resource,
                    inner.seq
                );
                return false;
            }

            let next = match result {
                Ok(records) => {
                    tracing::debug!(
                        "Fetch #{} for {} ready with {} records",
                        ticket.0,
                        self.resource,
                        records.len()
                    );
                    StoreSnapshot {
                        seq: ticket.0,
                        records: Arc::new(records.into_iter().map(Arc::new).collect()),
                        status: StoreStatus::Ready,
                    }
                }
                Err(FetchError::Network(msg)) => {
                    tracing::warn!("Fetch #{} for {} failed: {}", ticket.0, self.resource, msg);
                    StoreSnapshot {
                        seq: ticket.0,
                        records: Arc::new(Vec::new()),
                        status: StoreStatus::NetworkFailed(msg),
                    }
                }
                Err(FetchError::Decode(msg)) => {
                    tracing::warn!(
                        "Fetch #{} for {} returned malformed data, keeping {} records: {}",
                        ticket.0,
                        self.resource,
                        inner.records.len(),
                        msg
                    );
                    StoreSnapshot {
                        seq: ticket.0,
                        records: inner.records.clone(),
                        status: StoreStatus::DecodeFailed(msg),
                    }
                }
            };

            *inner = next.clone();
            next
        };
        let _ = self.tx.send(snapshot);
        true
    }

    // =========================================================================
    // Read Methods
    // =========================================================================

    /// The current snapshot.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.inner.read().clone()
    }

    pub fn status(&self) -> StoreStatus {
        self.inner.read().status.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribe to snapshot replacements.
    ///
    /// The receiver sees the current snapshot immediately and every later one.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.rx.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
