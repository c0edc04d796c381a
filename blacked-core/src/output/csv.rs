//! CSV output format
//!
//! Columns are `ip, port, org, hostnames, location, domains, timestamp`; the
//! `data` field is not exported. List fields are joined with `;`, `location`
//! is written as compact JSON, a missing IP or port is an empty cell.

use crate::error::Result;
use crate::output::common::OutputWriter;
use crate::types::Record;
use chrono::SecondsFormat;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default CSV export path
pub const DEFAULT_CSV_PATH: &str = "sendata.csv";

/// Column header, in order
pub const CSV_HEADER: [&str; 7] = [
    "ip",
    "port",
    "org",
    "hostnames",
    "location",
    "domains",
    "timestamp",
];

/// Separator used inside list-valued cells
pub const LIST_DELIMITER: &str = ";";

/// Writes the batch as CSV with a header row
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl Default for CsvSink {
    fn default() -> Self {
        Self::new(DEFAULT_CSV_PATH)
    }
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the file content with `batch`
    pub fn write(&self, batch: &[Record]) -> Result<PathBuf> {
        let writer = OutputWriter::create(&self.path)?;
        let writer = write_csv(writer, batch)?;
        Ok(writer.finish()?)
    }
}

/// Writes header and one row per record, returning the inner writer
pub fn write_csv<W: Write>(writer: W, batch: &[Record]) -> Result<W> {
    let mut csv = ::csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;
    for record in batch {
        csv.write_record(row(record)?)?;
    }
    csv.into_inner()
        .map_err(|e| crate::error::Error::Io(e.into_error()))
}

fn row(record: &Record) -> Result<[String; 7]> {
    Ok([
        record.ip.clone().unwrap_or_default(),
        record.port.map(|p| p.to_string()).unwrap_or_default(),
        record.org.clone(),
        record.hostnames.join(LIST_DELIMITER),
        serde_json::to_string(&record.location)?,
        record.domains.join(LIST_DELIMITER),
        record.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
    ])
}
