use unicode_width::UnicodeWidthStr;

use crate::format::pad_right;
use crate::sampler::{RenderedField, RenderedLine, Trend};

use super::theme::trend_marker;

/// Column label and width; the last column is left unpadded.
const START_COLUMN: (&str, usize) = ("StartTime", 21);
const FIELD_COLUMNS: [(&str, usize); 6] = [
    ("PhysicalMemoryUsage", 22),
    ("UserProcessorTime", 20),
    ("PrivilegedProcessorTime", 26),
    ("TotalProcessorTime", 22),
    ("PagedSystemMemorySize", 24),
    ("PagedMemorySize", 0),
];

pub fn header_line() -> String {
    let mut out = String::from(" ");
    out.push_str(&pad_right(START_COLUMN.0, START_COLUMN.1));
    for (label, width) in FIELD_COLUMNS {
        out.push_str(&pad_cell(label, width));
    }
    out
}

pub fn separator() -> String {
    "─".repeat(header_line().width())
}

pub fn rule() -> String {
    "─".repeat(67)
}

/// A table cell ready to print: padded text plus the trend that colours it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub trend: Option<Trend>,
}

/// `with_markers` appends the plain-text trend marker to tagged cells.
pub fn cells(line: &RenderedLine, with_markers: bool) -> Vec<Cell> {
    let mut out = Vec::with_capacity(FIELD_COLUMNS.len() + 1);
    out.push(Cell {
        text: format!(" {}", pad_right(&line.start_time, START_COLUMN.1)),
        trend: None,
    });
    for (field, (_, width)) in line.fields.iter().zip(FIELD_COLUMNS) {
        out.push(Cell {
            text: pad_cell(&cell_text(field, with_markers), width),
            trend: field.trend,
        });
    }
    out
}

fn cell_text(field: &RenderedField, with_markers: bool) -> String {
    let mut text = field.text.clone();
    if field.kind.is_bytes() {
        text.push_str(" kb");
    }
    if with_markers && let Some(trend) = field.trend {
        text.push(' ');
        text.push(trend_marker(trend));
    }
    text
}

fn pad_cell(text: &str, width: usize) -> String {
    if width == 0 {
        text.to_string()
    } else {
        pad_right(text, width)
    }
}

pub fn plain_row(line: &RenderedLine) -> String {
    cells(line, true).into_iter().map(|c| c.text).collect()
}
