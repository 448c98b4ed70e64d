use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Clean ledger and budget workbooks and build finance reports",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clean both datasets, load them into the store, and run every report
    Run(RunArgs),
    /// List the reporting queries and the relations they read
    Queries,
    /// Print the first rows of a relation in the store
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// YAML configuration file; flags below override its fields
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// General ledger workbook or CSV
    #[arg(long)]
    pub ledger: Option<PathBuf>,
    /// Budget/forecast workbook or CSV
    #[arg(long)]
    pub budget: Option<PathBuf>,
    /// DuckDB database file that receives every relation
    #[arg(short, long)]
    pub store: Option<PathBuf>,
    /// Directory for timestamped cleaned copies
    #[arg(long = "cleaned-dir")]
    pub cleaned_dir: Option<PathBuf>,
    /// Append-only run log
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// DuckDB database file to read
    #[arg(short, long, default_value = "finance.db")]
    pub store: PathBuf,
    /// Relation to print (e.g. ledger, q_currency_mix)
    #[arg(short, long)]
    pub relation: String,
    /// Maximum number of rows to print
    #[arg(short = 'n', long, default_value_t = 20)]
    pub limit: usize,
}
