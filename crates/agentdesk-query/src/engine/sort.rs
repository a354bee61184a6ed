//! Stable sorting of a view by one column.

use std::cmp::Ordering;
use std::sync::Arc;

use agentdesk_core::Record;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::schema::{FieldKind, ResourceSchema};
use crate::spec::{SortDirection, SortKey};

/// A sort key checked against the schema, with its direction filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedSort {
    pub field: String,
    pub kind: FieldKind,
    pub direction: SortDirection,
}

impl ResolvedSort {
    /// Returns `None` if the field is not a sortable column.
    pub fn resolve(schema: &ResourceSchema, key: &SortKey) -> Option<Self> {
        let column = schema.column(&key.field).filter(|c| c.sortable)?;
        Some(Self {
            field: column.field.clone(),
            kind: column.kind,
            direction: key.direction.unwrap_or(column.kind.natural_direction()),
        })
    }

    fn value(&self, record: &Record) -> Option<SortValue> {
        match self.kind {
            FieldKind::Amount => record.amount(&self.field).map(SortValue::Amount),
            FieldKind::Date => record.date(&self.field).map(SortValue::Date),
            FieldKind::Text => record
                .text(&self.field)
                .map(|s| SortValue::Text(s.to_lowercase())),
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue {
    Amount(Decimal),
    Date(NaiveDate),
    Text(String),
}

/// Sort in place. Equal keys keep their input order, and records without a
/// usable value go after all others regardless of direction.
pub(super) fn stable_sort(view: &mut Vec<Arc<Record>>, sort: &ResolvedSort) {
    let mut keyed: Vec<(Option<SortValue>, Arc<Record>)> = view
        .drain(..)
        .map(|record| (sort.value(&record), record))
        .collect();

    // slice::sort_by is stable
    keyed.sort_by(|(a, _), (b, _)| compare(a.as_ref(), b.as_ref(), sort.direction));

    view.extend(keyed.into_iter().map(|(_, record)| record));
}

fn compare(a: Option<&SortValue>, b: Option<&SortValue>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match direction {
            SortDirection::Ascending => a.cmp(b),
            SortDirection::Descending => b.cmp(a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_missing_last() {
        let one = SortValue::Amount(Decimal::ONE);
        for dir in [SortDirection::Ascending, SortDirection::Descending] {
            assert_eq!(compare(Some(&one), None, dir), Ordering::Less);
            assert_eq!(compare(None, Some(&one), dir), Ordering::Greater);
            assert_eq!(compare(None, None, dir), Ordering::Equal);
        }
    }

    #[test]
    fn test_compare_direction() {
        let a = SortValue::Amount(Decimal::ONE);
        let b = SortValue::Amount(Decimal::new(2, 0));
        assert_eq!(compare(Some(&a), Some(&b), SortDirection::Ascending), Ordering::Less);
        assert_eq!(compare(Some(&a), Some(&b), SortDirection::Descending), Ordering::Greater);
    }
}
