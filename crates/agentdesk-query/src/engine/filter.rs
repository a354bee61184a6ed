//! Search and date-range predicates.

use agentdesk_core::Record;

use crate::spec::DateRange;

/// Check whether any searchable field contains the (already lowercased) needle.
///
/// No needle matches everything.
pub(super) fn matches_search(record: &Record, searchable: &[&str], needle: Option<&str>) -> bool {
    let Some(needle) = needle else {
        return true;
    };
    searchable.iter().any(|field| {
        record
            .text(field)
            .is_some_and(|value| value.to_lowercase().contains(needle))
    })
}

/// Check the record against the inclusive range bounds.
///
/// A bound that is set excludes records whose corresponding date is
/// missing or unparseable.
pub(super) fn within_range(
    record: &Record,
    start_field: &str,
    end_field: &str,
    range: &DateRange,
) -> bool {
    if let Some(start) = range.start {
        if !record.date(start_field).is_some_and(|d| d >= start) {
            return false;
        }
    }
    if let Some(end) = range.end {
        if !record.date(end_field).is_some_and(|d| d <= end) {
            return false;
        }
    }
    true
}
