use std::collections::HashSet;

use crate::frame::Table;

/// Keeps the first occurrence of every distinct row. Two nulls compare equal.
pub fn drop_duplicates(mut table: Table) -> Table {
    let keep = {
        let mut seen = HashSet::with_capacity(table.row_count());
        table.rows().map(|row| seen.insert(row)).collect::<Vec<_>>()
    };
    table.retain_rows(&keep);
    table
}
