//! Result formatting for the terminal

use crate::app::models::{ArtifactRecord, Metadata};
use crate::constants::output::MIN_COLUMN_WIDTH;

const HEADERS: [&str; 8] = [
    "BUCKET",
    "NAME",
    "VERSION",
    "NORMALIZED VERSION",
    "PATH",
    "FILE SIZE",
    "DOWNLOADS",
    "METADATA",
];

/// Format bytes in human-readable binary units
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: u64 = 1024;

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD as f64 && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD as f64;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Compact one-line form of a metadata map
pub fn format_metadata(metadata: &Metadata) -> String {
    if metadata.is_empty() {
        return "{}".to_string();
    }
    let pairs: Vec<String> = metadata
        .iter()
        .map(|(key, value)| format!("{}: '{}'", key, value))
        .collect();
    format!("{{ {} }}", pairs.join(", "))
}

fn record_cells(record: &ArtifactRecord) -> [String; 8] {
    [
        record.bucket.clone(),
        record.name.clone(),
        record.version.clone(),
        record.normalized_version.clone(),
        record.path.clone(),
        format_bytes(record.file_size),
        record.downloads.to_string(),
        format_metadata(&record.metadata),
    ]
}

fn format_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end()
        .to_string()
}

/// Render catalog records as an aligned text table
///
/// Every column is at least as wide as its header and never narrower than
/// the minimum column width. Rows are separated by newlines with no trailing
/// newline.
pub fn render_records(records: &[ArtifactRecord]) -> String {
    let rows: Vec<[String; 8]> = records.iter().map(record_cells).collect();

    let mut widths = HEADERS.map(|header| header.chars().count().max(MIN_COLUMN_WIDTH));
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format_line(HEADERS.iter().copied(), &widths));
    for row in &rows {
        lines.push(format_line(row.iter().map(String::as_str), &widths));
    }
    lines.join("\n")
}
