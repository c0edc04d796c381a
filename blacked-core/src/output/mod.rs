//! Export sinks for record batches
//!
//! # Formats
//!
//! - **JSON** - every field, pretty-printed array, always written
//! - **CSV** - subset of columns, written only on request
//! - **Table** - terminal rendering through the caller's reporter
//!
//! All sinks read the same batch and never modify it.
//!
//! # Examples
//!
//! ```no_run
//! use blacked_core::console::TerminalReporter;
//! use blacked_core::output::{export, ExportOptions};
//!
//! let mut reporter = TerminalReporter::default();
//! export(&[], &ExportOptions::default(), &mut reporter).unwrap();
//! ```

pub mod common;
pub mod csv;
pub mod json;
pub mod table;

pub use self::csv::CsvSink;
pub use common::OutputWriter;
pub use json::JsonSink;
pub use table::TableSink;

use crate::console::Reporter;
use crate::error::Result;
use crate::types::Record;
use std::path::PathBuf;

/// Where and what to export
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub json_path: PathBuf,
    /// `Some` enables the CSV sink
    pub csv_path: Option<PathBuf>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            json_path: PathBuf::from(json::DEFAULT_JSON_PATH),
            csv_path: None,
        }
    }
}

/// What [`export`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub records: usize,
    pub json: Option<PathBuf>,
    pub csv: Option<PathBuf>,
}

/// Runs every enabled sink over `batch`
///
/// An empty batch writes nothing and reports "No results found.".
pub fn export(
    batch: &[Record],
    options: &ExportOptions,
    reporter: &mut dyn Reporter,
) -> Result<ExportSummary> {
    if batch.is_empty() {
        reporter.error("No results found.");
        return Ok(ExportSummary::default());
    }

    let mut summary = ExportSummary {
        records: batch.len(),
        ..ExportSummary::default()
    };

    let path = JsonSink::new(&options.json_path).write(batch)?;
    tracing::debug!(path = %path.display(), records = batch.len(), "wrote JSON export");
    summary.json = Some(path);

    if let Some(csv_path) = &options.csv_path {
        let path = CsvSink::new(csv_path).write(batch)?;
        tracing::debug!(path = %path.display(), records = batch.len(), "wrote CSV export");
        summary.csv = Some(path);
    }

    reporter.emit(&TableSink::default().render(batch));

    let mut saved = vec![summary_path(&summary.json)];
    if summary.csv.is_some() {
        saved.push(summary_path(&summary.csv));
    }
    reporter.success(&format!(
        "Saved {} record(s) to {}",
        batch.len(),
        saved.join(" and ")
    ));

    Ok(summary)
}

fn summary_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}
