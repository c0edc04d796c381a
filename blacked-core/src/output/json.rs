//! JSON output format

use crate::error::Result;
use crate::output::common::OutputWriter;
use crate::types::Record;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default JSON export path
pub const DEFAULT_JSON_PATH: &str = "sendata.json";

/// Writes the full batch as a pretty-printed JSON array
///
/// # Examples
///
/// ```no_run
/// use blacked_core::output::json::JsonSink;
///
/// let sink = JsonSink::new("sendata.json");
/// sink.write(&[]).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct JsonSink {
    path: PathBuf,
}

impl Default for JsonSink {
    fn default() -> Self {
        Self::new(DEFAULT_JSON_PATH)
    }
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the file content with `batch`
    pub fn write(&self, batch: &[Record]) -> Result<PathBuf> {
        let mut writer = OutputWriter::create(&self.path)?;
        write_json(&mut writer, batch)?;
        Ok(writer.finish()?)
    }
}

/// Serializes `batch` to any writer, 4-space indented
pub fn write_json<W: Write>(writer: W, batch: &[Record]) -> Result<()> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    serde::Serialize::serialize(batch, &mut serializer)?;
    let mut writer = serializer.into_inner();
    writer.write_all(b"\n")?;
    Ok(())
}
