//! Column type coercion.
//!
//! [`coerce_types`] is the generic pass every dataset goes through: columns
//! whose label mentions "date" become timestamps cell by cell, and text
//! columns become numeric only when every cell parses. The strict and lenient
//! helpers below are the per-column rules the dataset cleaners layer on top.

use log::debug;

use crate::{
    data::{Value, parse_number, parse_timestamp},
    error::{PipelineError, Result},
    frame::{Column, ColumnKind, Table},
};

pub fn coerce_types(mut table: Table) -> Table {
    for column in table.columns_mut() {
        if is_date_label(&column.name) {
            let failed = coerce_timestamps(column);
            if failed > 0 {
                debug!(
                    "Column '{}': {failed} value(s) could not be read as dates and were nulled",
                    column.name
                );
            }
        } else if column.kind == ColumnKind::Text && !try_numeric(column) {
            debug!("Column '{}' kept as text", column.name);
        }
    }
    table
}

pub fn is_date_label(name: &str) -> bool {
    name.to_lowercase().contains("date")
}

/// Converts every cell to a timestamp, nulling the ones that do not parse.
/// Returns how many non-null cells were lost.
fn coerce_timestamps(column: &mut Column) -> usize {
    let mut failed = 0;
    for cell in column.cells.iter_mut() {
        let Some(value) = cell.take() else {
            continue;
        };
        let converted = match value {
            Value::Timestamp(ts) => Some(ts),
            Value::Text(text) => parse_timestamp(&text),
            Value::Number(_) => None,
        };
        if converted.is_none() {
            failed += 1;
        }
        *cell = converted.map(Value::Timestamp);
    }
    column.kind = ColumnKind::Timestamp;
    failed
}

/// Numeric reading of one cell: `Ok(None)` for values that mean "empty",
/// `Err(())` when the cell is not a number.
fn numeric_cell(value: &Value) -> std::result::Result<Option<f64>, ()> {
    match value {
        Value::Number(n) => Ok(Some(*n)),
        Value::Text(text) if text.trim().is_empty() => Ok(None),
        Value::Text(text) => parse_number(text).map(Some).ok_or(()),
        Value::Timestamp(_) => Err(()),
    }
}

/// All-or-nothing numeric conversion; the column is untouched on any failure.
fn try_numeric(column: &mut Column) -> bool {
    let mut converted = Vec::with_capacity(column.cells.len());
    for cell in &column.cells {
        match cell {
            None => converted.push(None),
            Some(value) => match numeric_cell(value) {
                Ok(number) => converted.push(number.map(Value::Number)),
                Err(()) => return false,
            },
        }
    }
    column.cells = converted;
    column.kind = ColumnKind::Number;
    true
}

/// Forces a column to floating point, failing on the first value that is not
/// numeric. Nulls stay null.
pub fn coerce_numeric_strict(column: &mut Column) -> Result<()> {
    if column.kind == ColumnKind::Number {
        return Ok(());
    }
    let mut converted = Vec::with_capacity(column.cells.len());
    for (row, cell) in column.cells.iter().enumerate() {
        let number = match cell {
            None => None,
            Some(value) => match numeric_cell(value) {
                Ok(number) => number,
                Err(()) => {
                    return Err(PipelineError::Coercion {
                        column: column.name.clone(),
                        row: row + 1,
                        value: value.as_display(),
                    });
                }
            },
        };
        converted.push(number.map(Value::Number));
    }
    column.cells = converted;
    column.kind = ColumnKind::Number;
    Ok(())
}

/// Forces a column to numeric, writing zero wherever a value is missing or
/// does not parse. Returns the number of cells that were zero-filled.
pub fn coerce_numeric_lenient(column: &mut Column) -> usize {
    let mut zero_filled = 0;
    for cell in column.cells.iter_mut() {
        let number = cell
            .as_ref()
            .and_then(|value| numeric_cell(value).ok().flatten());
        if number.is_none() {
            zero_filled += 1;
        }
        *cell = Some(Value::Number(number.unwrap_or(0.0)));
    }
    column.kind = ColumnKind::Number;
    zero_filled
}
