//! Terminal table output

use crate::output::common::{display_width, pad_left, pad_right, single_line};
use crate::types::Record;

/// Default table title
pub const DEFAULT_TITLE: &str = "Shodan Results";

const HEADERS: [&str; 6] = ["#", "IP", "Port", "Org", "Hostnames", "Location"];

/// Renders a batch as a bordered, 1-indexed table
///
/// # Examples
///
/// ```
/// use blacked_core::output::table::TableSink;
///
/// let table = TableSink::default().render(&[]);
/// assert!(table.contains("Hostnames"));
/// ```
#[derive(Debug, Clone)]
pub struct TableSink {
    title: String,
}

impl Default for TableSink {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

impl TableSink {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Cell values for one record
    pub fn row(index: usize, record: &Record) -> [String; 6] {
        [
            index.to_string(),
            record.ip_display(),
            record.port_display(),
            single_line(&record.org),
            single_line(&record.hostnames.join(", ")),
            single_line(record.country()),
        ]
    }

    pub fn render(&self, batch: &[Record]) -> String {
        let rows: Vec<[String; 6]> = batch
            .iter()
            .enumerate()
            .map(|(i, record)| Self::row(i + 1, record))
            .collect();

        let mut widths = HEADERS.map(display_width);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(display_width(cell));
            }
        }

        let separator = format!(
            "+{}+",
            widths
                .iter()
                .map(|w| "-".repeat(w + 2))
                .collect::<Vec<_>>()
                .join("+")
        );
        let line = |cells: &[String]| {
            let padded: Vec<String> = cells
                .iter()
                .zip(widths.iter())
                .enumerate()
                // The index column is right-aligned.
                .map(|(col, (cell, w))| {
                    if col == 0 {
                        pad_left(cell, *w)
                    } else {
                        pad_right(cell, *w)
                    }
                })
                .collect();
            format!("| {} |", padded.join(" | "))
        };

        let total_width = display_width(&separator);
        let mut out = Vec::with_capacity(rows.len() * 2 + 4);
        out.push(centered(&self.title, total_width));
        out.push(separator.clone());
        out.push(line(&HEADERS.map(String::from)));
        out.push(separator.clone());
        for row in &rows {
            out.push(line(row));
            out.push(separator.clone());
        }
        out.join("\n")
    }
}

fn centered(text: &str, width: usize) -> String {
    let w = display_width(text);
    if w >= width {
        return text.to_string();
    }
    pad_left(text, w + (width - w) / 2).trim_end().to_string()
}
