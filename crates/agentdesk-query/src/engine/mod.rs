//! Query Engine
//!
//! The QueryEngine turns a Record Store snapshot and a Query Spec into the
//! Derived View shown by a dashboard tab.
//!
//! ## Evaluation Flow
//!
//! ```text
//! records + Query Spec
//!        │
//!        ▼
//! ┌────────────────────┐
//! │ Validate date range │──── inverted ──▶ Err(InvalidDateRange)
//! └─────────┬──────────┘
//!           ▼
//!   Search predicate
//!   (any searchable column
//!    contains the text)
//!           │
//!           ▼
//!   Range predicates
//!   (start ≤ start field,
//!    end field ≤ end)
//!           │
//!           ▼
//!   Stable sort by key
//!   (unknown key ──▶ default)
//!           │
//!           ▼
//!     Derived View
//! ```
//!
//! The engine is configured once per resource and holds no mutable state,
//! so a single instance can be shared and evaluated from any thread.

use std::collections::HashSet;
use std::sync::Arc;

use agentdesk_core::{Record, ResourceKind};

use crate::error::QueryError;
use crate::schema::{FieldKind, ResourceSchema};
use crate::spec::{QuerySpec, SortDirection, SortKey};

mod filter;
mod sort;

use sort::ResolvedSort;

// =============================================================================
// Query Engine
// =============================================================================

/// Evaluates Query Specs against records of one resource.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    schema: ResourceSchema,
    default_sort: ResolvedSort,
}

impl QueryEngine {
    /// Create an engine for the given schema.
    ///
    /// Fails when the schema repeats a field, names a range field that is
    /// not a date column, or has a default sort on a non-sortable field.
    pub fn new(schema: ResourceSchema) -> Result<Self, QueryError> {
        let mut seen = HashSet::new();
        for column in &schema.columns {
            if !seen.insert(column.field.as_str()) {
                return Err(QueryError::DuplicateColumn(column.field.clone()));
            }
        }

        for field in [&schema.range_start_field, &schema.range_end_field] {
            match schema.column(field) {
                Some(column) if column.kind == FieldKind::Date => {}
                _ => return Err(QueryError::NotADateField(field.clone())),
            }
        }

        let default_sort = ResolvedSort::resolve(&schema, &schema.default_sort)
            .ok_or_else(|| QueryError::UnknownSortKey(schema.default_sort.field.clone()))?;

        tracing::debug!(
            "QueryEngine created for '{}' ({} columns, default sort {})",
            schema.name,
            schema.columns.len(),
            schema.default_sort
        );

        Ok(Self {
            schema,
            default_sort,
        })
    }

    /// Create an engine with the built-in schema for a resource.
    pub fn for_resource(kind: ResourceKind) -> Result<Self, QueryError> {
        Self::new(ResourceSchema::for_resource(kind))
    }

    /// The schema this engine was configured with.
    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    /// Build a sort key, rejecting fields that are not sortable columns.
    ///
    /// This is the gate user-selected sort options go through before they
    /// reach a Query Spec.
    pub fn sort_key(
        &self,
        field: &str,
        direction: Option<SortDirection>,
    ) -> Result<SortKey, QueryError> {
        match self.schema.column(field) {
            Some(column) if column.sortable => Ok(SortKey {
                field: field.to_string(),
                direction,
            }),
            _ => Err(QueryError::UnknownSortKey(field.to_string())),
        }
    }

    /// Validate an already-built sort key against this engine's schema.
    pub fn check_sort_key(&self, key: &SortKey) -> Result<(), QueryError> {
        self.sort_key(&key.field, key.direction).map(|_| ())
    }

    /// Compute the Derived View.
    ///
    /// Returns the records that pass the search and date-range predicates,
    /// stably sorted by the Query Spec's sort key. The returned `Arc`s are the
    /// input's own; nothing is copied or mutated.
    ///
    /// Fails only with `InvalidDateRange` when the start bound is after the
    /// end bound. A sort key the schema cannot compare is logged and replaced
    /// by the default sort.
    pub fn evaluate(
        &self,
        records: &[Arc<Record>],
        spec: &QuerySpec,
    ) -> Result<Vec<Arc<Record>>, QueryError> {
        spec.date_range.validate()?;

        let needle = spec.normalized_search();
        let searchable: Vec<&str> = self
            .schema
            .searchable_columns()
            .map(|c| c.field.as_str())
            .collect();

        let mut view: Vec<Arc<Record>> = records
            .iter()
            .filter(|r| filter::matches_search(r, &searchable, needle.as_deref()))
            .filter(|r| {
                spec.date_range.is_unbounded()
                    || filter::within_range(
                        r,
                        &self.schema.range_start_field,
                        &self.schema.range_end_field,
                        &spec.date_range,
                    )
            })
            .cloned()
            .collect();

        let sort = self.resolve_sort(spec.sort_key.as_ref());
        sort::stable_sort(&mut view, &sort);

        tracing::debug!(
            "Evaluated '{}': {} of {} records, sorted by {} {:?}",
            self.schema.name,
            view.len(),
            records.len(),
            sort.field,
            sort.direction
        );

        Ok(view)
    }

    /// Resolve the Query Spec's sort key, falling back to the default.
    fn resolve_sort(&self, key: Option<&SortKey>) -> ResolvedSort {
        let Some(key) = key else {
            return self.default_sort.clone();
        };
        match ResolvedSort::resolve(&self.schema, key) {
            Some(sort) => sort,
            None => {
                tracing::warn!(
                    "Unknown sort key '{}' for '{}', using default sort",
                    key.field,
                    self.schema.name
                );
                self.default_sort.clone()
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
