//! Query Spec: the search/filter/sort configuration behind a view.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(format!("unknown sort direction '{}'", other)),
        }
    }
}

/// Field and direction to sort by.
///
/// `direction: None` uses the column's natural direction: highest first for
/// amounts, earliest first for dates, A-Z for text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
}

impl SortKey {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: None,
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new(field).with_direction(SortDirection::Ascending)
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self::new(field).with_direction(SortDirection::Descending)
    }

    pub fn with_direction(mut self, direction: SortDirection) -> Self {
        self.direction = Some(direction);
        self
    }
}

/// Parses `field` or `field:asc` / `field:desc`.
impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(':') {
            Some((field, dir)) => (field.trim(), Some(dir.parse::<SortDirection>()?)),
            None => (s.trim(), None),
        };
        if field.is_empty() {
            return Err("empty sort field".to_string());
        }
        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Some(SortDirection::Ascending) => write!(f, "{}:asc", self.field),
            Some(SortDirection::Descending) => write!(f, "{}:desc", self.field),
            None => f.write_str(&self.field),
        }
    }
}

/// Inclusive calendar-date bounds. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Reject inverted bounds. Equal bounds select a single day.
    pub fn validate(&self) -> Result<(), QueryError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => {
                Err(QueryError::InvalidDateRange { start, end })
            }
            _ => Ok(()),
        }
    }
}

/// Immutable description of the desired view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySpec {
    pub search_text: String,
    pub date_range: DateRange,
    /// `None` sorts by the resource's default key.
    pub sort_key: Option<SortKey>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn with_start(mut self, start: Option<NaiveDate>) -> Self {
        self.date_range.start = start;
        self
    }

    pub fn with_end(mut self, end: Option<NaiveDate>) -> Self {
        self.date_range.end = end;
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    pub fn with_sort(mut self, key: Option<SortKey>) -> Self {
        self.sort_key = key;
        self
    }

    /// Trimmed, lowercased search text, or `None` when there is nothing to match.
    pub fn normalized_search(&self) -> Option<String> {
        let trimmed = self.search_text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }
}
