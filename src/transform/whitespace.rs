use crate::{
    data::Value,
    frame::{ColumnKind, Table},
};

/// Strips surrounding whitespace from every column label and from every text
/// cell of text columns. Numeric and timestamp columns are left alone.
pub fn strip_whitespace(mut table: Table) -> Table {
    for column in table.columns_mut() {
        let label = column.name.trim();
        if label.len() != column.name.len() {
            column.name = label.to_string();
        }
        if column.kind != ColumnKind::Text {
            continue;
        }
        for cell in column.cells.iter_mut() {
            if let Some(Value::Text(text)) = cell {
                let trimmed = text.trim();
                if trimmed.len() != text.len() {
                    *text = trimmed.to_string();
                }
            }
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Column;

    #[test]
    fn trims_labels_and_text_cells() {
        let table = Table::new(vec![
            Column::new(
                "  Dept ",
                ColumnKind::Text,
                vec![Some(" sales ".into()), None, Some(Value::Number(3.0))],
            ),
            Column::new(" Debit", ColumnKind::Number, vec![Some(1.0.into()), None, None]),
        ])
        .unwrap();

        let cleaned = strip_whitespace(table);

        assert_eq!(cleaned.column_names(), vec!["Dept", "Debit"]);
        let dept = cleaned.column("Dept").unwrap();
        assert_eq!(dept.cells[0], Some(Value::Text("sales".into())));
        assert_eq!(dept.cells[1], None);
        assert_eq!(dept.cells[2], Some(Value::Number(3.0)));
        assert_eq!(cleaned.shape(), (3, 2));
    }

    #[test]
    fn clean_table_passes_through_unchanged() {
        let table = Table::new(vec![Column::new(
            "Dept",
            ColumnKind::Text,
            vec![Some("SALES".into()), Some(" \tops\n".into())],
        )])
        .unwrap();

        let cleaned = strip_whitespace(table);

        assert_eq!(cleaned.column_names(), vec!["Dept"]);
        assert_eq!(
            cleaned.column("Dept").unwrap().cells,
            vec![Some("SALES".into()), Some("ops".into())]
        );
    }
}
