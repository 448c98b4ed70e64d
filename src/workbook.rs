//! Tabular file readers and writers.
//!
//! Dispatch is by extension:
//!
//! - **Spreadsheets** (`.xlsx`, `.xlsm`, `.xls`, `.xlsb`, `.ods`): the first
//!   sheet is read through `calamine`, its first row supplying the headers.
//! - **Delimited text** (`.csv`, `.tsv`): read with the `csv` crate, comma or
//!   tab by extension.
//!
//! In both cases empty cells and the usual "not available" tokens (`NA`,
//! `N/A`, `null`, `none`, `NaN`) become nulls. Writers emit `.xlsx` through
//! `rust_xlsxwriter` or delimited text.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use calamine::{DataType, Reader, open_workbook_auto};
use csv::QuoteStyle;
use log::debug;
use rust_xlsxwriter::{Format, Workbook};

use crate::{
    data::{Value, format_number, format_timestamp, is_placeholder_token},
    error::{PipelineError, Result},
    frame::{Cell, Table},
};

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];
const TIMESTAMP_NUM_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Spreadsheet,
    Delimited(u8),
}

fn detect(path: &Path) -> Result<FileKind> {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => Ok(FileKind::Delimited(b',')),
        "tsv" => Ok(FileKind::Delimited(b'\t')),
        other if SPREADSHEET_EXTENSIONS.contains(&other) => Ok(FileKind::Spreadsheet),
        _ => Err(PipelineError::UnsupportedFormat(path.to_path_buf())),
    }
}

pub fn read_table(path: &Path) -> Result<Table> {
    if !path.exists() {
        return Err(PipelineError::MissingInput(path.to_path_buf()));
    }
    let table = match detect(path)? {
        FileKind::Spreadsheet => read_spreadsheet(path)?,
        FileKind::Delimited(delimiter) => read_delimited(path, delimiter)?,
    };
    debug!(
        "Read {:?}: {} row(s) x {} column(s)",
        path,
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

fn read_spreadsheet(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| PipelineError::InvalidWorkbook(format!("{path:?} has no worksheets")))??;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(first) => first.iter().map(header_text).collect::<Vec<_>>(),
        None => return Table::new(Vec::new()),
    };
    let body = rows
        .map(|row| row.iter().map(spreadsheet_cell).collect::<Vec<_>>())
        .collect();
    Table::from_rows(&headers, body)
}

fn header_text(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.clone(),
        DataType::Float(value) => format_number(*value),
        DataType::Int(value) => value.to_string(),
        DataType::Empty => String::new(),
        other => other.to_string(),
    }
}

fn spreadsheet_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Empty | DataType::Error(_) => None,
        DataType::Int(value) => Some(Value::Number(*value as f64)),
        DataType::Float(value) => Some(Value::Number(*value)),
        DataType::String(value) => text_cell(value),
        DataType::Bool(value) => Some(Value::Text(value.to_string())),
        DataType::DateTime(_) | DataType::DateTimeIso(_) => cell
            .as_datetime()
            .map(Value::Timestamp)
            .or_else(|| Some(Value::Text(cell.to_string()))),
        other => text_cell(&other.to_string()),
    }
}

fn text_cell(raw: &str) -> Cell {
    if raw.is_empty() || is_placeholder_token(raw) {
        None
    } else {
        Some(Value::Text(raw.to_string()))
    }
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(false)
        .from_reader(BufReader::new(File::open(path)?));
    let headers = reader
        .headers()?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let mut body = Vec::new();
    for record in reader.records() {
        let record = record?;
        body.push(record.iter().map(text_cell).collect::<Vec<_>>());
    }
    Table::from_rows(&headers, body)
}

pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    match detect(path)? {
        FileKind::Spreadsheet if is_xlsx(path) => write_xlsx(path, table),
        FileKind::Spreadsheet => Err(PipelineError::UnsupportedFormat(path.to_path_buf())),
        FileKind::Delimited(delimiter) => write_delimited(path, table, delimiter),
    }?;
    debug!("Wrote {} row(s) to {:?}", table.row_count(), path);
    Ok(())
}

fn is_xlsx(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"))
}

fn write_xlsx(path: &Path, table: &Table) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let timestamp_format = Format::new().set_num_format(TIMESTAMP_NUM_FORMAT);

    for (col_idx, column) in table.columns().iter().enumerate() {
        let col = col_idx as u16;
        worksheet.write_string(0, col, &column.name)?;
        for (row_idx, cell) in column.cells.iter().enumerate() {
            let row = (row_idx + 1) as u32;
            match cell {
                None => {}
                Some(Value::Number(n)) => {
                    worksheet.write_number(row, col, *n)?;
                }
                Some(Value::Timestamp(ts)) => {
                    worksheet.write_datetime_with_format(row, col, ts, &timestamp_format)?;
                }
                Some(Value::Text(text)) => {
                    worksheet.write_string(row, col, text)?;
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn write_delimited(path: &Path, table: &Table, delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(BufWriter::new(File::create(path)?));
    writer.write_record(table.column_names())?;
    for row in table.rows() {
        writer.write_record(row.into_iter().map(|cell| match cell {
            None => String::new(),
            Some(Value::Timestamp(ts)) => format_timestamp(ts),
            Some(other) => other.as_display(),
        }))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Column, ColumnKind};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    #[test]
    fn csv_placeholders_become_nulls() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        std::fs::write(&path, "Dept,Amount\nsales,10\nNA,\nops,N/A\n").unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.shape(), (3, 2));
        let dept = table.column("Dept").unwrap();
        assert_eq!(dept.cells[1], None);
        let amount = table.column("Amount").unwrap();
        assert_eq!(amount.null_count(), 2);
        assert_eq!(amount.kind, ColumnKind::Text);
    }

    #[test]
    fn xlsx_roundtrip_keeps_types() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cleaned.xlsx");
        let ts = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let table = Table::new(vec![
            Column::new(
                "TxnDate",
                ColumnKind::Timestamp,
                vec![Some(Value::Timestamp(ts)), None],
            ),
            Column::new(
                "Debit",
                ColumnKind::Number,
                vec![Some(Value::Number(12.5)), Some(Value::Number(3.0))],
            ),
            Column::new(
                "Dept",
                ColumnKind::Text,
                vec![Some("SALES".into()), Some("OPS".into())],
            ),
        ])
        .unwrap();

        write_table(&path, &table).unwrap();
        let back = read_table(&path).unwrap();

        assert_eq!(back.column_names(), table.column_names());
        assert_eq!(back.column("Debit").unwrap().kind, ColumnKind::Number);
        assert_eq!(back.column("TxnDate").unwrap().cells[0], Some(Value::Timestamp(ts)));
        assert_eq!(back.column("TxnDate").unwrap().cells[1], None);
        assert_eq!(back.display_rows(), table.display_rows());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(matches!(
            read_table(&path),
            Err(PipelineError::UnsupportedFormat(_))
        ));
        let missing = dir.path().join("absent.xlsx");
        assert!(matches!(
            read_table(&missing),
            Err(PipelineError::MissingInput(_))
        ));
    }
}
