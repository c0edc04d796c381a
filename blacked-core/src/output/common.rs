//! Common utilities for output formatting

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use unicode_width::UnicodeWidthStr;

/// Output file that is truncated on open
///
/// Every run replaces the previous export; nothing is appended.
pub struct OutputWriter {
    inner: BufWriter<File>,
    destination: PathBuf,
}

impl OutputWriter {
    /// Create (or truncate) the file at `path`
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path.as_ref())?;

        Ok(Self {
            inner: BufWriter::new(file),
            destination: path.as_ref().to_path_buf(),
        })
    }

    /// Flush buffered output to disk
    pub fn finish(mut self) -> io::Result<PathBuf> {
        self.inner.flush()?;
        Ok(self.destination)
    }
}

impl Write for OutputWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Terminal display width of `s`
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Pad a string with spaces on the left
pub fn pad_left(s: &str, width: usize) -> String {
    let w = display_width(s);
    if w >= width {
        s.to_string()
    } else {
        format!("{}{}", " ".repeat(width - w), s)
    }
}

/// Pad a string with spaces on the right
pub fn pad_right(s: &str, width: usize) -> String {
    let w = display_width(s);
    if w >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - w))
    }
}

/// Collapse control characters so a value stays on one table line
pub fn single_line(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
