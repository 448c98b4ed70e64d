//! Dataset cleaners for the general ledger and the budget/forecast export.
//!
//! Both run the shared sequence (whitespace, drop incomplete rows, type
//! coercion, deduplication) and then apply their own column rules. The ledger
//! rule for `Amount` is strict and fails the cleaner on a non-numeric value;
//! the budget currency rule is lenient and zero-fills. The two behave
//! differently on purpose and must stay that way.

use log::{debug, info};

use crate::{
    data::Value,
    error::Result,
    frame::{Column, ColumnKind, Table},
    transform::{
        MissingStrategy,
        coerce::{coerce_numeric_lenient, coerce_numeric_strict},
        coerce_types, drop_duplicates, resolve_missing, strip_whitespace,
    },
};

pub const AMOUNT_COLUMN: &str = "Amount";
pub const DEPT_COLUMN: &str = "Dept";
pub const BUDGET_CURRENCY_COLUMNS: &[&str] = &["BudgetUSD", "ForecastUSD", "ActualUSD", "VarianceUSD"];

/// The dataset-independent part of cleaning.
pub fn clean_common(table: Table) -> Table {
    let table = strip_whitespace(table);
    let table = resolve_missing(table, &MissingStrategy::Drop);
    let table = coerce_types(table);
    drop_duplicates(table)
}

pub fn clean_ledger(table: Table) -> Result<Table> {
    let before = table.shape();
    let mut table = clean_common(table);

    if let Some(amount) = table.column_mut(AMOUNT_COLUMN) {
        coerce_numeric_strict(amount)?;
    }
    if let Some(dept) = table.column_mut(DEPT_COLUMN) {
        uppercase_column(dept);
    }

    info!("Ledger shape before {:?} after {:?}", before, table.shape());
    Ok(table)
}

pub fn clean_budget(table: Table) -> Result<Table> {
    let before = table.shape();
    let mut table = clean_common(table);

    if let Some(dept) = table.column_mut(DEPT_COLUMN) {
        uppercase_column(dept);
    }
    for name in BUDGET_CURRENCY_COLUMNS {
        if let Some(column) = table.column_mut(name) {
            let zeroed = coerce_numeric_lenient(column);
            if zeroed > 0 {
                debug!("Column '{name}': {zeroed} unparseable value(s) set to 0");
            }
        }
    }

    info!("Budget shape before {:?} after {:?}", before, table.shape());
    Ok(table)
}

/// Rewrites every value as its uppercase text form.
fn uppercase_column(column: &mut Column) {
    for cell in column.cells.iter_mut().flatten() {
        let upper = match &*cell {
            Value::Text(text) => text.to_uppercase(),
            other => other.as_display().to_uppercase(),
        };
        *cell = Value::Text(upper);
    }
    column.kind = ColumnKind::Text;
}
