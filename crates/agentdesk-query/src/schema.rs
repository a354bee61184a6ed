//! Per-resource column tables.
//!
//! A `ResourceSchema` is what makes the engine generic: it names the
//! columns a resource exposes, how each one is compared and rendered, which
//! participate in search and sort, and which date fields the range filter
//! reads.

use agentdesk_core::{Record, ResourceKind};
use serde::{Deserialize, Serialize};

use crate::spec::{SortDirection, SortKey};

/// How a column's values are compared and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Amount,
    Date,
}

impl FieldKind {
    /// Direction used when a sort key does not specify one.
    pub fn natural_direction(self) -> SortDirection {
        match self {
            Self::Amount => SortDirection::Descending,
            Self::Date | Self::Text => SortDirection::Ascending,
        }
    }
}

/// A field name plus its formatting rule and search/sort participation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Record field the column reads.
    pub field: String,
    /// Header text in tables and exports.
    pub header: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub searchable: bool,
    #[serde(default)]
    pub sortable: bool,
}

impl ColumnSpec {
    pub fn new(field: impl Into<String>, header: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            field: field.into(),
            header: header.into(),
            kind,
            searchable: false,
            sortable: false,
        }
    }

    pub fn text(field: impl Into<String>, header: impl Into<String>) -> Self {
        Self::new(field, header, FieldKind::Text)
    }

    pub fn amount(field: impl Into<String>, header: impl Into<String>) -> Self {
        Self::new(field, header, FieldKind::Amount)
    }

    pub fn date(field: impl Into<String>, header: impl Into<String>) -> Self {
        Self::new(field, header, FieldKind::Date)
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Display text for a record's value in this column.
    ///
    /// Dates render as `YYYY-MM-DD`, amounts as plain decimals. Values that
    /// do not parse as the column's kind fall back to their raw text, and
    /// missing values render as an empty string.
    pub fn render(&self, record: &Record) -> String {
        let rendered = match self.kind {
            FieldKind::Text => None,
            FieldKind::Amount => record.amount(&self.field).map(|a| a.to_string()),
            FieldKind::Date => record
                .date(&self.field)
                .map(|d| d.format("%Y-%m-%d").to_string()),
        };
        rendered
            .or_else(|| record.text(&self.field))
            .unwrap_or_default()
    }
}

/// Column table and query defaults for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSchema {
    /// Name used in logs.
    pub name: String,
    pub columns: Vec<ColumnSpec>,
    /// Date field compared against the range start.
    pub range_start_field: String,
    /// Date field compared against the range end.
    pub range_end_field: String,
    pub default_sort: SortKey,
}

impl ResourceSchema {
    /// Create a schema with inferred defaults.
    ///
    /// Both range fields default to the first date column and the default
    /// sort to the first amount column (highest first), falling back to the
    /// first sortable column.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSpec>) -> Self {
        let first_date = columns
            .iter()
            .find(|c| c.kind == FieldKind::Date)
            .map(|c| c.field.clone())
            .unwrap_or_default();

        let default_sort = columns
            .iter()
            .find(|c| c.kind == FieldKind::Amount && c.sortable)
            .or_else(|| columns.iter().find(|c| c.sortable))
            .map(|c| SortKey::new(c.field.clone()))
            .unwrap_or_else(|| SortKey::new(""));

        Self {
            name: name.into(),
            columns,
            range_start_field: first_date.clone(),
            range_end_field: first_date,
            default_sort,
        }
    }

    pub fn with_date_range_fields(
        mut self,
        start_field: impl Into<String>,
        end_field: impl Into<String>,
    ) -> Self {
        self.range_start_field = start_field.into();
        self.range_end_field = end_field.into();
        self
    }

    pub fn with_default_sort(mut self, key: SortKey) -> Self {
        self.default_sort = key;
        self
    }

    /// Built-in schema for a dashboard resource.
    pub fn for_resource(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Bookings => Self::new(
                kind.slug(),
                vec![
                    ColumnSpec::text("_id", "Booking ID").searchable(),
                    ColumnSpec::text("name", "Client Name").searchable(),
                    ColumnSpec::date("start_date", "Start Date").sortable(),
                    ColumnSpec::date("end_date", "End Date").sortable(),
                    ColumnSpec::amount("amt_earned", "Amount Earned")
                        .searchable()
                        .sortable(),
                ],
            )
            .with_date_range_fields("start_date", "end_date")
            .with_default_sort(SortKey::descending("amt_earned")),

            ResourceKind::Vouchers => Self::new(
                kind.slug(),
                vec![
                    ColumnSpec::text("_id", "Voucher ID").searchable(),
                    ColumnSpec::text("client_name", "Client Name").searchable(),
                    ColumnSpec::text("destination", "Destination").searchable(),
                    ColumnSpec::date("travel_date", "Travel Date").sortable(),
                    ColumnSpec::amount("amount", "Amount").searchable().sortable(),
                ],
            )
            .with_default_sort(SortKey::descending("amount")),

            ResourceKind::ForexOrders => Self::new(
                kind.slug(),
                vec![
                    ColumnSpec::text("_id", "Order ID").searchable(),
                    ColumnSpec::text("client_name", "Client Name").searchable(),
                    ColumnSpec::text("currency", "Currency").searchable(),
                    ColumnSpec::date("order_date", "Order Date").sortable(),
                    ColumnSpec::amount("amount", "Amount").searchable().sortable(),
                ],
            )
            .with_default_sort(SortKey::descending("amount")),
        }
    }

    /// Look up a column by field name.
    pub fn column(&self, field: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.field == field)
    }

    pub fn searchable_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| c.searchable)
    }
}
