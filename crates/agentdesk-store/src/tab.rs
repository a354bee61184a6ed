//! One dashboard tab: a resource's engine, store and current Query Spec.
//!
//! The tab never caches a view. `view()` evaluates against whatever snapshot
//! the store holds right now, so a completed refetch shows up on the next
//! call without any bookkeeping here.

use std::sync::Arc;

use agentdesk_core::{Credentials, FetchError, Record, ResourceKind};
use agentdesk_query::{
    ExportError, ExportFile, ExportFormatter, QueryEngine, QueryError, QuerySpec, SortDirection,
};
use chrono::NaiveDate;
use serde_json::Value;
use tokio::sync::watch;

use crate::source::RecordSource;
use crate::store::{RecordStore, StoreSnapshot, StoreStatus};

// =============================================================================
// Derived View
// =============================================================================

/// Why a view looks the way it does.
///
/// An empty view with `Ready` means nothing matched; the other variants tell
/// a failed or pending fetch apart from a true empty result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus {
    Ready,
    NotLoaded,
    NetworkFailed(String),
    DecodeFailed(String),
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    /// Evaluation failed for a reason other than the date range.
    QueryFailed(QueryError),
}

impl From<&StoreStatus> for ViewStatus {
    fn from(status: &StoreStatus) -> Self {
        match status {
            StoreStatus::NotLoaded => Self::NotLoaded,
            StoreStatus::Ready => Self::Ready,
            StoreStatus::NetworkFailed(msg) => Self::NetworkFailed(msg.clone()),
            StoreStatus::DecodeFailed(msg) => Self::DecodeFailed(msg.clone()),
        }
    }
}

/// The filtered, sorted records currently shown.
#[derive(Debug, Clone)]
pub struct DerivedView {
    pub records: Vec<Arc<Record>>,
    pub status: ViewStatus,
    /// Snapshot the view was computed from.
    pub store_seq: u64,
}

impl DerivedView {
    /// Build the view for an evaluation of `snapshot`.
    ///
    /// A failed evaluation yields no records and a status naming the
    /// failure, never the store's own status.
    pub fn from_evaluation(
        result: Result<Vec<Arc<Record>>, QueryError>,
        snapshot: &StoreSnapshot,
    ) -> Self {
        let (records, status) = match result {
            Ok(records) => (records, ViewStatus::from(&snapshot.status)),
            Err(QueryError::InvalidDateRange { start, end }) => {
                (Vec::new(), ViewStatus::InvalidDateRange { start, end })
            }
            Err(e) => (Vec::new(), ViewStatus::QueryFailed(e)),
        };
        Self {
            records,
            status,
            store_seq: snapshot.seq,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// =============================================================================
// ResourceTab
// =============================================================================

pub struct ResourceTab {
    engine: QueryEngine,
    store: Arc<RecordStore>,
    spec: QuerySpec,
}

impl ResourceTab {
    /// Tab for a built-in resource with a fresh store.
    pub fn new(resource: ResourceKind) -> Result<Self, QueryError> {
        Ok(Self::with_store(
            QueryEngine::for_resource(resource)?,
            Arc::new(RecordStore::new(resource)),
        ))
    }

    pub fn with_store(engine: QueryEngine, store: Arc<RecordStore>) -> Self {
        Self {
            engine,
            store,
            spec: QuerySpec::new(),
        }
    }

    pub fn resource(&self) -> ResourceKind {
        self.store.resource()
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    /// Subscribe to store replacements, e.g. to re-render on refetch.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.store.subscribe()
    }

    // =========================================================================
    // Query Spec
    // =========================================================================

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.spec.search_text = text.into();
    }

    pub fn set_date_start(&mut self, start: Option<NaiveDate>) {
        self.spec.date_range.start = start;
    }

    pub fn set_date_end(&mut self, end: Option<NaiveDate>) {
        self.spec.date_range.end = end;
    }

    pub fn clear_date_range(&mut self) {
        self.spec.date_range = Default::default();
    }

    /// Sort by a column. Fails for fields that are not sortable.
    pub fn set_sort(
        &mut self,
        field: &str,
        direction: Option<SortDirection>,
    ) -> Result<(), QueryError> {
        self.spec.sort_key = Some(self.engine.sort_key(field, direction)?);
        Ok(())
    }

    /// Go back to the resource's default sort.
    pub fn clear_sort(&mut self) {
        self.spec.sort_key = None;
    }

    // =========================================================================
    // View
    // =========================================================================

    /// Evaluate the current Query Spec against the current snapshot.
    pub fn view(&self) -> DerivedView {
        let snapshot = self.store.snapshot();
        let result = self.engine.evaluate(&snapshot.records, &self.spec);
        match &result {
            Ok(_) | Err(QueryError::InvalidDateRange { .. }) => {}
            Err(e) => tracing::error!("Evaluating {} failed: {}", self.resource(), e),
        }
        DerivedView::from_evaluation(result, &snapshot)
    }

    /// CSV report of the current view.
    pub fn export(&self) -> Result<ExportFile, ExportError> {
        let view = self.view();
        ExportFormatter::export(self.resource(), &view.records, &self.engine.schema().columns)
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Fetch the resource and replace the store.
    ///
    /// Returns `false` if a newer fetch had already been applied.
    pub async fn refetch(&self, source: &dyn RecordSource, credentials: &Credentials) -> bool {
        let ticket = self.store.begin_fetch();
        let result = source.fetch_all(self.resource(), credentials).await;
        self.store.complete(ticket, result)
    }

    /// Create a record, then refetch.
    ///
    /// The created record is not inserted locally; it appears in the view
    /// once the backend returns it from the refetch.
    pub async fn create(
        &self,
        source: &dyn RecordSource,
        credentials: &Credentials,
        payload: Value,
    ) -> Result<Record, FetchError> {
        let created = source.create(self.resource(), credentials, payload).await?;
        self.refetch(source, credentials).await;
        Ok(created)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockRecordSource;
    use mockall::Sequence;
    use serde_json::json;
    use std::time::Duration;

    fn booking(id: &str, name: &str, amount: i64, start: &str, end: &str) -> Record {
        Record::from_value(json!({
            "_id": id,
            "name": name,
            "amt_earned": amount,
            "start_date": start,
            "end_date": end,
        }))
        .unwrap()
    }

    fn bookings() -> Vec<Record> {
        vec![
            booking("b1", "Ravi", 500, "2024-01-10", "2024-01-14"),
            booking("b2", "Sunita", 900, "2024-02-05", "2024-02-09"),
        ]
    }

    fn ids(view: &DerivedView) -> Vec<String> {
        view.records
            .iter()
            .filter_map(|r| r.id())
            .map(|id| id.0)
            .collect()
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_view_before_fetch() {
        let tab = ResourceTab::new(ResourceKind::Bookings).unwrap();
        let view = tab.view();
        assert!(view.is_empty());
        assert_eq!(view.status, ViewStatus::NotLoaded);
        assert_eq!(view.store_seq, 0);
    }

    #[tokio::test]
    async fn test_failed_evaluation_is_not_an_empty_match() {
        let mut source = MockRecordSource::new();
        source
            .expect_fetch_all()
            .returning(|_, _| Box::pin(async { Ok(bookings()) }));

        let tab = ResourceTab::new(ResourceKind::Bookings).unwrap();
        tab.refetch(&source, &Credentials::anonymous()).await;
        let snapshot = tab.store().snapshot();
        assert_eq!(snapshot.status, StoreStatus::Ready);

        let err = QueryError::UnknownSortKey("voucherLink".to_string());
        let view = DerivedView::from_evaluation(Err(err.clone()), &snapshot);
        assert!(view.is_empty());
        assert_eq!(view.status, ViewStatus::QueryFailed(err));
        assert_eq!(view.store_seq, 1);

        let ok = DerivedView::from_evaluation(Ok(snapshot.records.to_vec()), &snapshot);
        assert_eq!(ok.status, ViewStatus::Ready);
        assert_eq!(ok.len(), 2);
    }

    #[tokio::test]
    async fn test_refetch_then_view() {
        let mut source = MockRecordSource::new();
        source
            .expect_fetch_all()
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(bookings()) }));

        let mut tab = ResourceTab::new(ResourceKind::Bookings).unwrap();
        assert!(tab.refetch(&source, &Credentials::anonymous()).await);

        let view = tab.view();
        assert_eq!(view.status, ViewStatus::Ready);
        assert_eq!(ids(&view), vec!["b2", "b1"]);

        tab.set_search("RAVI");
        assert_eq!(ids(&tab.view()), vec!["b1"]);

        tab.set_search("nobody");
        let view = tab.view();
        assert!(view.is_empty());
        assert_eq!(view.status, ViewStatus::Ready);
    }

    #[tokio::test]
    async fn test_date_bounds_and_inverted_range() {
        let mut source = MockRecordSource::new();
        source
            .expect_fetch_all()
            .returning(|_, _| Box::pin(async { Ok(bookings()) }));

        let mut tab = ResourceTab::new(ResourceKind::Bookings).unwrap();
        tab.refetch(&source, &Credentials::anonymous()).await;

        tab.set_date_start(date(2024, 2, 1));
        tab.set_date_end(date(2024, 2, 28));
        assert_eq!(ids(&tab.view()), vec!["b2"]);

        tab.set_date_end(date(2024, 1, 1));
        let view = tab.view();
        assert!(view.is_empty());
        assert_eq!(
            view.status,
            ViewStatus::InvalidDateRange {
                start: date(2024, 2, 1).unwrap(),
                end: date(2024, 1, 1).unwrap(),
            }
        );

        tab.clear_date_range();
        assert_eq!(tab.view().len(), 2);
    }

    #[tokio::test]
    async fn test_set_sort_validates() {
        let mut source = MockRecordSource::new();
        source
            .expect_fetch_all()
            .returning(|_, _| Box::pin(async { Ok(bookings()) }));

        let mut tab = ResourceTab::new(ResourceKind::Bookings).unwrap();
        tab.refetch(&source, &Credentials::anonymous()).await;

        assert_eq!(
            tab.set_sort("name", None),
            Err(QueryError::UnknownSortKey("name".to_string()))
        );
        assert!(tab.spec().sort_key.is_none());

        tab.set_sort("start_date", Some(SortDirection::Descending))
            .unwrap();
        assert_eq!(ids(&tab.view()), vec!["b2", "b1"]);

        tab.set_sort("amt_earned", Some(SortDirection::Ascending))
            .unwrap();
        assert_eq!(ids(&tab.view()), vec!["b1", "b2"]);

        tab.clear_sort();
        assert_eq!(ids(&tab.view()), vec!["b2", "b1"]);
    }

    #[tokio::test]
    async fn test_network_failure_is_distinguishable() {
        let mut source = MockRecordSource::new();
        source
            .expect_fetch_all()
            .returning(|_, _| Box::pin(async { Err(FetchError::Network("down".into())) }));

        let tab = ResourceTab::new(ResourceKind::Vouchers).unwrap();
        tab.refetch(&source, &Credentials::anonymous()).await;

        let view = tab.view();
        assert!(view.is_empty());
        assert_eq!(view.status, ViewStatus::NetworkFailed("down".into()));
    }

    #[tokio::test]
    async fn test_decode_failure_keeps_previous_view() {
        let mut seq = Sequence::new();
        let mut source = MockRecordSource::new();
        source
            .expect_fetch_all()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Box::pin(async { Ok(bookings()) }));
        source
            .expect_fetch_all()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Box::pin(async { Err(FetchError::Decode("garbled".into())) }));

        let tab = ResourceTab::new(ResourceKind::Bookings).unwrap();
        let creds = Credentials::anonymous();
        tab.refetch(&source, &creds).await;
        tab.refetch(&source, &creds).await;

        let view = tab.view();
        assert_eq!(ids(&view), vec!["b2", "b1"]);
        assert_eq!(view.status, ViewStatus::DecodeFailed("garbled".into()));
        assert_eq!(view.store_seq, 2);
    }

    #[tokio::test]
    async fn test_slow_older_fetch_does_not_overwrite_newer() {
        let mut seq = Sequence::new();
        let mut source = MockRecordSource::new();
        source
            .expect_fetch_all()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Box::pin(async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(vec![booking("old", "Old", 1, "2024-01-01", "2024-01-02")])
                })
            });
        source
            .expect_fetch_all()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Box::pin(async { Ok(bookings()) }));

        let tab = ResourceTab::new(ResourceKind::Bookings).unwrap();
        let creds = Credentials::anonymous();
        let (first, second) = tokio::join!(
            tab.refetch(&source, &creds),
            tab.refetch(&source, &creds)
        );

        assert!(second);
        assert!(!first);
        let view = tab.view();
        assert_eq!(ids(&view), vec!["b2", "b1"]);
        assert_eq!(view.store_seq, 2);
    }

    #[tokio::test]
    async fn test_create_refetches_instead_of_splicing() {
        let mut source = MockRecordSource::new();
        source.expect_create().times(1).returning(|_, creds, payload| {
            assert_eq!(creds.agent_id, "agent-7");
            let mut record = payload.clone();
            record["_id"] = json!("b3");
            Box::pin(async move { Ok(Record::from_value(record).unwrap()) })
        });
        // The backend's list is the source of truth after a create.
        source
            .expect_fetch_all()
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(bookings()) }));

        let tab = ResourceTab::new(ResourceKind::Bookings).unwrap();
        let creds = Credentials::new("agent-7", "token");
        let created = tab
            .create(&source, &creds, json!({"name": "Meera", "amt_earned": 300}))
            .await
            .unwrap();

        assert_eq!(created.id().unwrap().0, "b3");
        assert_eq!(ids(&tab.view()), vec!["b2", "b1"]);
    }

    #[tokio::test]
    async fn test_failed_create_skips_refetch() {
        let mut source = MockRecordSource::new();
        source
            .expect_create()
            .returning(|_, _, _| Box::pin(async { Err(FetchError::Network("down".into())) }));
        source.expect_fetch_all().never();

        let tab = ResourceTab::new(ResourceKind::Bookings).unwrap();
        let result = tab
            .create(&source, &Credentials::anonymous(), json!({}))
            .await;

        assert_eq!(result, Err(FetchError::Network("down".into())));
        assert_eq!(tab.view().status, ViewStatus::NotLoaded);
    }

    #[tokio::test]
    async fn test_export_follows_view() {
        let mut source = MockRecordSource::new();
        source
            .expect_fetch_all()
            .returning(|_, _| Box::pin(async { Ok(bookings()) }));

        let mut tab = ResourceTab::new(ResourceKind::Bookings).unwrap();
        tab.refetch(&source, &Credentials::anonymous()).await;
        tab.set_search("sunita");

        let file = tab.export().unwrap();
        assert_eq!(file.file_name, "bookings-report.csv");
        assert_eq!(
            file.contents,
            "Booking ID,Client Name,Start Date,End Date,Amount Earned\n\
             b2,Sunita,2024-02-05,2024-02-09,900\n"
        );
    }
}
