//! CSV export of a Derived View.
//!
//! Header row first, then one row per record with every cell rendered
//! through its column's formatter. Cells containing the delimiter, a quote
//! or a line break are quoted per RFC 4180.

use std::sync::Arc;

use agentdesk_core::{Record, ResourceKind};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::ExportError;
use crate::schema::ColumnSpec;

/// MIME type of exported reports.
pub const CSV_MIME_TYPE: &str = "text/csv";

/// A downloadable report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// `<resource>-report.csv`
    pub file_name: String,
    pub mime_type: &'static str,
    pub contents: String,
}

pub struct ExportFormatter;

impl ExportFormatter {
    /// Render the view as CSV text.
    ///
    /// An empty view yields the header line only.
    pub fn format(view: &[Arc<Record>], columns: &[ColumnSpec]) -> Result<String, ExportError> {
        let mut wrt = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .quote_style(QuoteStyle::Necessary)
            .from_writer(Vec::new());

        wrt.write_record(columns.iter().map(|c| c.header.as_str()))?;
        for record in view {
            wrt.write_record(columns.iter().map(|c| c.render(record)))?;
        }

        let bytes = wrt
            .into_inner()
            .map_err(|e| ExportError::Flush(e.to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Render the view as a named report file for a resource.
    pub fn export(
        resource: ResourceKind,
        view: &[Arc<Record>],
        columns: &[ColumnSpec],
    ) -> Result<ExportFile, ExportError> {
        let contents = Self::format(view, columns)?;
        tracing::debug!(
            "Exported {} {} rows ({} bytes)",
            view.len(),
            resource,
            contents.len()
        );
        Ok(ExportFile {
            file_name: resource.report_file_name(),
            mime_type: CSV_MIME_TYPE,
            contents,
        })
    }
}
