//! Relational store capability and its DuckDB backend.
//!
//! The pipeline only needs three things from a store: replace a named relation
//! with a [`Table`], run a read-only query into a [`Table`], and list the
//! relation names for verification. [`RelationalStore`] captures exactly that,
//! and [`DuckDbStore`] implements it over a single-file (or in-memory) DuckDB
//! database.
//!
//! A store assumes one writer at a time. Two pipeline runs against the same file
//! are not coordinated.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use duckdb::{
    Connection,
    arrow::datatypes::DataType,
    params_from_iter,
    types::{TimeUnit, Value as DuckValue},
};
use log::debug;

use crate::{
    data::{Value, format_timestamp},
    error::Result,
    frame::{Column, ColumnKind, Table},
};

pub trait RelationalStore {
    /// Creates `name` from `table`, dropping any relation of that name first.
    fn replace_relation(&mut self, name: &str, table: &Table) -> Result<()>;

    /// Removes `name` if it exists.
    fn drop_relation(&mut self, name: &str) -> Result<()>;

    /// Runs a read-only query and collects its result set. Column kinds follow
    /// the declared result types, not the values returned.
    fn query(&mut self, sql: &str) -> Result<Table>;

    /// Names of every relation currently in the store, sorted.
    fn relation_names(&mut self) -> Result<Vec<String>>;
}

pub struct DuckDbStore {
    conn: Connection,
}

impl DuckDbStore {
    pub fn open(path: &Path) -> Result<Self> {
        debug!("Opening DuckDB store {:?}", path);
        Self::configure(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::configure(Connection::open_in_memory()?)
    }

    // One worker thread keeps aggregate results reproducible run to run.
    fn configure(conn: Connection) -> Result<Self> {
        conn.execute_batch("SET threads TO 1;")?;
        Ok(Self { conn })
    }
}

impl RelationalStore for DuckDbStore {
    fn replace_relation(&mut self, name: &str, table: &Table) -> Result<()> {
        let relation = quote_ident(name);
        let definitions = table
            .columns()
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), sql_type(c.kind)))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = table
            .columns()
            .iter()
            .map(|c| match c.kind {
                ColumnKind::Timestamp => "CAST(? AS TIMESTAMP)",
                _ => "?",
            })
            .collect::<Vec<_>>()
            .join(", ");

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS {relation}; CREATE TABLE {relation} ({definitions});"
        ))?;
        {
            let mut insert =
                tx.prepare(&format!("INSERT INTO {relation} VALUES ({placeholders})"))?;
            for row in table.rows() {
                let params = table
                    .columns()
                    .iter()
                    .zip(row)
                    .map(|(column, cell)| to_store_value(column.kind, cell.as_ref()))
                    .collect::<Vec<_>>();
                insert.execute(params_from_iter(params.iter()))?;
            }
        }
        tx.commit()?;
        debug!(
            "Replaced relation '{name}' with {} row(s) x {} column(s)",
            table.row_count(),
            table.column_count()
        );
        Ok(())
    }

    fn drop_relation(&mut self, name: &str) -> Result<()> {
        self.conn
            .execute_batch(&format!("DROP TABLE IF EXISTS {};", quote_ident(name)))?;
        debug!("Dropped relation '{name}'");
        Ok(())
    }

    fn query(&mut self, sql: &str) -> Result<Table> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let (headers, declared) = match rows.as_ref() {
            Some(stmt) => {
                let headers = stmt.column_names();
                let declared = (0..headers.len())
                    .map(|idx| kind_of_type(&stmt.column_type(idx)))
                    .collect::<Vec<_>>();
                (headers, declared)
            }
            None => (Vec::new(), Vec::new()),
        };
        let mut cells = vec![Vec::new(); headers.len()];
        while let Some(row) = rows.next()? {
            for (idx, column) in cells.iter_mut().enumerate() {
                let value: DuckValue = row.get(idx)?;
                column.push(from_store_value(value));
            }
        }
        let columns = headers
            .into_iter()
            .zip(declared)
            .zip(cells)
            .map(|((name, kind), cells)| {
                // A cell outside the declared kind (e.g. an interval rendered as
                // text) demotes the column to text.
                let kind = if cells.iter().flatten().all(|v| ColumnKind::of(v) == kind) {
                    kind
                } else {
                    ColumnKind::Text
                };
                Column::new(name, kind, cells)
            })
            .collect();
        Table::new(columns)
    }

    fn relation_names(&mut self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'main' ORDER BY table_name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn sql_type(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Number => "DOUBLE",
        ColumnKind::Timestamp => "TIMESTAMP",
        ColumnKind::Text => "VARCHAR",
    }
}

fn kind_of_type(data_type: &DataType) -> ColumnKind {
    match data_type {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float16
        | DataType::Float32
        | DataType::Float64
        | DataType::Decimal128(_, _)
        | DataType::Decimal256(_, _) => ColumnKind::Number,
        DataType::Timestamp(_, _) | DataType::Date32 | DataType::Date64 => ColumnKind::Timestamp,
        _ => ColumnKind::Text,
    }
}

fn to_store_value(kind: ColumnKind, cell: Option<&Value>) -> DuckValue {
    match (kind, cell) {
        (_, None) => DuckValue::Null,
        (ColumnKind::Number, Some(Value::Number(n))) => DuckValue::Double(*n),
        (_, Some(Value::Timestamp(ts))) => DuckValue::Text(format_timestamp(ts)),
        (_, Some(other)) => DuckValue::Text(other.as_display()),
    }
}

fn from_store_value(value: DuckValue) -> Option<Value> {
    let number = |n: f64| Some(Value::Number(n));
    match value {
        DuckValue::Null => None,
        DuckValue::Boolean(b) => Some(Value::Text(b.to_string())),
        DuckValue::TinyInt(v) => number(v as f64),
        DuckValue::SmallInt(v) => number(v as f64),
        DuckValue::Int(v) => number(v as f64),
        DuckValue::BigInt(v) => number(v as f64),
        DuckValue::HugeInt(v) => number(v as f64),
        DuckValue::UTinyInt(v) => number(v as f64),
        DuckValue::USmallInt(v) => number(v as f64),
        DuckValue::UInt(v) => number(v as f64),
        DuckValue::UBigInt(v) => number(v as f64),
        DuckValue::Float(v) => number(v as f64),
        DuckValue::Double(v) => number(v),
        DuckValue::Decimal(d) => d.to_string().parse::<f64>().ok().map(Value::Number),
        DuckValue::Text(s) => Some(Value::Text(s)),
        DuckValue::Timestamp(unit, raw) => timestamp_from_raw(unit, raw).map(Value::Timestamp),
        DuckValue::Date32(days) => NaiveDate::from_ymd_opt(1970, 1, 1)
            .and_then(|epoch| epoch.checked_add_signed(chrono::Duration::days(days as i64)))
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(Value::Timestamp),
        other => Some(Value::Text(format!("{other:?}"))),
    }
}

fn timestamp_from_raw(unit: TimeUnit, raw: i64) -> Option<NaiveDateTime> {
    let micros = match unit {
        TimeUnit::Second => raw.checked_mul(1_000_000)?,
        TimeUnit::Millisecond => raw.checked_mul(1_000)?,
        TimeUnit::Microsecond => raw,
        TimeUnit::Nanosecond => raw / 1_000,
    };
    DateTime::from_timestamp_micros(micros).map(|dt| dt.naive_utc())
}
