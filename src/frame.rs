//! Column-major in-memory tables.
//!
//! A [`Table`] is an ordered list of named [`Column`]s of equal length. Every
//! column carries a [`ColumnKind`]; `Number` and `Timestamp` columns hold only
//! their own variant, while a `Text` column may hold any [`Value`] (a mixed
//! column, as spreadsheets produce when a column blends text and numbers).
//!
//! Cleaning stages take a table by value and hand back the transformed table,
//! so each run owns its intermediate data outright.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::{
    data::Value,
    error::{PipelineError, Result},
};

pub type Cell = Option<Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Number,
    Timestamp,
    Text,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Number => "number",
            ColumnKind::Timestamp => "timestamp",
            ColumnKind::Text => "text",
        }
    }

    /// Kind of a single value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Number(_) => ColumnKind::Number,
            Value::Timestamp(_) => ColumnKind::Timestamp,
            Value::Text(_) => ColumnKind::Text,
        }
    }

    /// Narrowest kind able to hold every non-null cell. All-null columns are text.
    pub fn infer(cells: &[Cell]) -> Self {
        let mut kinds = cells.iter().flatten().map(ColumnKind::of);
        match kinds.next() {
            None => ColumnKind::Text,
            Some(first) if kinds.all(|kind| kind == first) => first,
            Some(_) => ColumnKind::Text,
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            kind,
            cells,
        }
    }

    /// Builds a column whose kind is inferred from its cells.
    pub fn inferred(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        let kind = ColumnKind::infer(&cells);
        Self::new(name, kind, cells)
    }

    pub fn null_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_none()).count()
    }

    pub fn non_null(&self) -> impl Iterator<Item = &Value> {
        self.cells.iter().flatten()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let expected = first.cells.len();
            if let Some(bad) = columns.iter().find(|c| c.cells.len() != expected) {
                return Err(PipelineError::InvalidWorkbook(format!(
                    "column '{}' has {} cell(s) but '{}' has {}",
                    bad.name,
                    bad.cells.len(),
                    first.name,
                    expected
                )));
            }
        }
        Ok(Self { columns })
    }

    /// Assembles a table from row-major cells, inferring each column's kind.
    pub fn from_rows(headers: &[String], rows: Vec<Vec<Cell>>) -> Result<Self> {
        let mut columns: Vec<Vec<Cell>> = (0..headers.len())
            .map(|_| Vec::with_capacity(rows.len()))
            .collect();
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != headers.len() {
                return Err(PipelineError::RaggedRow {
                    row: row_idx + 1,
                    expected: headers.len(),
                    found: row.len(),
                });
            }
            for (column, cell) in columns.iter_mut().zip(row) {
                column.push(cell);
            }
        }
        let columns = headers
            .iter()
            .zip(columns)
            .map(|(name, cells)| Column::inferred(name.clone(), cells))
            .collect();
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }

    /// `(rows, columns)`, the shape logged before and after cleaning.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    pub fn row(&self, index: usize) -> Vec<&Cell> {
        self.columns.iter().map(|c| &c.cells[index]).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&Cell>> + '_ {
        (0..self.row_count()).map(|idx| self.row(idx))
    }

    /// Keeps the rows whose flag is set, preserving order.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        debug_assert_eq!(keep.len(), self.row_count());
        for column in &mut self.columns {
            let mut flags = keep.iter();
            column.cells.retain(|_| *flags.next().unwrap_or(&false));
        }
    }

    /// Display strings for every cell, nulls rendered empty.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows()
            .map(|row| {
                row.into_iter()
                    .map(|cell| cell.as_ref().map(Value::as_display).unwrap_or_default())
                    .collect()
            })
            .collect()
    }

    /// SHA-256 over column names, kinds, and every cell. Equal digests mean the
    /// tables are identical in content and layout.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for column in &self.columns {
            hasher.update(column.name.as_bytes());
            hasher.update([0x1f]);
            hasher.update(column.kind.as_str().as_bytes());
            hasher.update([0x1e]);
        }
        for row in self.rows() {
            for cell in row {
                match cell {
                    None => hasher.update([0x00]),
                    Some(value) => {
                        hasher.update([0x01]);
                        hasher.update(value.as_display().as_bytes());
                    }
                }
                hasher.update([0x1f]);
            }
            hasher.update([0x1e]);
        }
        format!("{:x}", hasher.finalize())
    }
}
