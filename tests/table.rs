use finance_pipeline::{
    data::Value,
    frame::{Column, ColumnKind, Table},
    table::{render_frame, render_table},
};

#[test]
fn render_table_aligns_columns() {
    let headers = vec!["query".to_string(), "sources".to_string()];
    let rows = vec![
        vec!["q_a".to_string(), "ledger".to_string()],
        vec!["q_longer".to_string(), "budget, ledger".to_string()],
    ];

    let rendered = render_table(&headers, &rows);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(
        lines,
        vec![
            "query     sources",
            "--------  --------------",
            "q_a       ledger",
            "q_longer  budget, ledger",
        ]
    );
}

#[test]
fn render_frame_shows_nulls_as_blank() {
    let table = Table::new(vec![
        Column::new(
            "Dept",
            ColumnKind::Text,
            vec![Some("SALES".into()), None],
        ),
        Column::new(
            "Debit",
            ColumnKind::Number,
            vec![None, Some(Value::Number(12.25))],
        ),
    ])
    .unwrap();

    let rendered = render_frame(&table, 10);
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[2], "SALES");
    assert_eq!(lines[3], "       12.25");
}
