//! Error type shared by the cleaning, loading, and aggregation stages.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned by the pipeline core.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A source file the caller promised is not on disk.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// A strict coercion rule met a value it cannot convert.
    #[error("cannot coerce value '{value}' in column '{column}' (row {row}) to a number")]
    Coercion {
        column: String,
        row: usize,
        value: String,
    },

    /// One reporting query failed; sibling queries are unaffected.
    #[error("query '{name}' failed: {source}")]
    Query {
        name: String,
        #[source]
        source: Box<PipelineError>,
    },

    /// A relation expected after loading is missing from the store catalog.
    #[error("relation '{relation}' missing from store after load")]
    StoreIntegrity { relation: String },

    /// Cell and column counts disagree while assembling a table.
    #[error("row {row} has {found} cell(s) but the table has {expected} column(s)")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unsupported tabular format for {0}")]
    UnsupportedFormat(PathBuf),

    #[error("invalid workbook: {0}")]
    InvalidWorkbook(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] duckdb::Error),

    #[error("spreadsheet read error: {0}")]
    WorkbookRead(#[from] calamine::Error),

    #[error("spreadsheet write error: {0}")]
    WorkbookWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl PipelineError {
    /// Wraps `self` as the failure of the named reporting query.
    pub fn for_query(self, name: &str) -> Self {
        PipelineError::Query {
            name: name.to_string(),
            source: Box::new(self),
        }
    }

    /// True for failures that abort a dataset's cleaning because a value could
    /// not be forced into its declared type.
    pub fn is_coercion(&self) -> bool {
        matches!(self, PipelineError::Coercion { .. })
    }
}
