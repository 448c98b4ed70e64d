//! Missing-value resolution.
//!
//! [`MissingStrategy`] selects the policy; [`resolve_missing`] dispatches to
//! one handler per variant. Only `Drop` changes the row count.

use std::collections::HashMap;

use log::debug;

use crate::{
    data::Value,
    frame::{Column, ColumnKind, Table},
};

#[derive(Debug, Clone, PartialEq)]
pub enum MissingStrategy {
    /// Remove every row holding at least one null.
    Drop,
    /// Fill numeric columns with the mean of their non-null values.
    FillMean,
    /// Fill numeric columns with the median of their non-null values.
    FillMedian,
    /// Fill every column with its most frequent non-null value.
    FillMode,
    /// Fill every null cell with the given value.
    FillConstant(Value),
}

impl MissingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingStrategy::Drop => "drop",
            MissingStrategy::FillMean => "mean",
            MissingStrategy::FillMedian => "median",
            MissingStrategy::FillMode => "mode",
            MissingStrategy::FillConstant(_) => "constant",
        }
    }
}

pub fn resolve_missing(table: Table, strategy: &MissingStrategy) -> Table {
    debug!("Resolving missing values with strategy '{}'", strategy.as_str());
    match strategy {
        MissingStrategy::Drop => drop_incomplete_rows(table),
        MissingStrategy::FillMean => fill_numeric(table, mean),
        MissingStrategy::FillMedian => fill_numeric(table, median),
        MissingStrategy::FillMode => fill_mode(table),
        MissingStrategy::FillConstant(value) => fill_constant(table, value),
    }
}

fn drop_incomplete_rows(mut table: Table) -> Table {
    let keep = table
        .rows()
        .map(|row| row.iter().all(|cell| cell.is_some()))
        .collect::<Vec<_>>();
    table.retain_rows(&keep);
    table
}

fn fill_numeric(mut table: Table, statistic: fn(&[f64]) -> Option<f64>) -> Table {
    for column in table.columns_mut() {
        if column.kind != ColumnKind::Number {
            continue;
        }
        let values = column.non_null().filter_map(Value::as_number).collect::<Vec<_>>();
        if let Some(fill) = statistic(&values) {
            fill_nulls(column, &Value::Number(fill));
        }
    }
    table
}

fn fill_mode(mut table: Table) -> Table {
    for column in table.columns_mut() {
        if let Some(fill) = mode(column) {
            fill_nulls(column, &fill);
        }
    }
    table
}

fn fill_constant(mut table: Table, value: &Value) -> Table {
    for column in table.columns_mut() {
        if column.null_count() == 0 {
            continue;
        }
        if ColumnKind::of(value) != column.kind {
            column.kind = ColumnKind::Text;
        }
        fill_nulls(column, value);
    }
    table
}

fn fill_nulls(column: &mut Column, value: &Value) {
    for cell in column.cells.iter_mut().filter(|cell| cell.is_none()) {
        *cell = Some(value.clone());
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Most frequent non-null value; ties go to the value seen first.
fn mode(column: &Column) -> Option<Value> {
    let mut counts: HashMap<&Value, (usize, usize)> = HashMap::new();
    for (position, value) in column.non_null().enumerate() {
        counts.entry(value).or_insert((0, position)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then_with(|| first_b.cmp(first_a))
        })
        .map(|(value, _)| value.clone())
}
