//! Plain-text rendering of tables for the terminal.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::frame::{ColumnKind, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// Renders at most `limit` rows of `table`; numeric columns are right-aligned.
pub fn render_frame(table: &Table, limit: usize) -> String {
    let headers = table.column_names();
    let aligns = table
        .columns()
        .iter()
        .map(|column| match column.kind {
            ColumnKind::Number => Align::Right,
            _ => Align::Left,
        })
        .collect::<Vec<_>>();
    let mut rows = table.display_rows();
    rows.truncate(limit);
    render(&headers, &rows, &aligns)
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    render(headers, rows, &vec![Align::Left; headers.len()])
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn render(headers: &[String], rows: &[Vec<String>], aligns: &[Align]) -> String {
    let mut widths = headers
        .iter()
        .map(|h| display_width(h).max(3))
        .collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(&sanitize_cell(cell)));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths, aligns));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &widths, aligns));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, aligns));
    }
    output
}

fn format_row(values: &[String], widths: &[usize], aligns: &[Align]) -> String {
    let cells = values
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(idx, (value, width))| {
            let cell = sanitize_cell(value);
            let padding = " ".repeat(width.saturating_sub(display_width(&cell)));
            match aligns.get(idx).copied().unwrap_or(Align::Left) {
                Align::Left => format!("{cell}{padding}"),
                Align::Right => format!("{padding}{cell}"),
            }
        })
        .collect::<Vec<_>>();
    cells.join("  ").trim_end().to_string()
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
