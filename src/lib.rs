pub mod aggregate;
pub mod catalog;
pub mod cleaners;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod event_log;
pub mod frame;
pub mod loader;
pub mod pipeline;
pub mod store;
pub mod table;
pub mod transform;
pub mod workbook;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, debug, info, warn};

use crate::{
    cli::{Cli, Commands, RunArgs, ShowArgs},
    config::PipelineConfig,
    error::PipelineError,
    event_log::{EventSink, FileEventLog},
    pipeline::{PipelineInputs, PipelineReport},
    store::{DuckDbStore, RelationalStore, quote_ident},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("finance_pipeline", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => handle_run(&args),
        Commands::Queries => handle_queries(),
        Commands::Show(args) => handle_show(&args),
    }
}

fn resolve_config(args: &RunArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Loading configuration from {path:?}"))?,
        None => PipelineConfig::default(),
    };
    if let Some(path) = &args.ledger {
        config.ledger = path.clone();
    }
    if let Some(path) = &args.budget {
        config.budget = path.clone();
    }
    if let Some(path) = &args.store {
        config.store = path.clone();
    }
    if let Some(path) = &args.cleaned_dir {
        config.cleaned_dir = path.clone();
    }
    if let Some(path) = &args.log_file {
        config.log_file = path.clone();
    }
    debug!("Resolved configuration: {config:?}");
    Ok(config)
}

fn handle_run(args: &RunArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let inputs = PipelineInputs::from_config(&config);
    if let Some(missing) = inputs.missing().first() {
        return Err(PipelineError::MissingInput(missing.to_path_buf()).into());
    }

    if let Some(parent) = config.store.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Creating store directory {parent:?}"))?;
    }
    let mut store = DuckDbStore::open(&config.store)
        .with_context(|| format!("Opening store {:?}", config.store))?;
    let mut events = FileEventLog::open(&config.log_file)
        .with_context(|| format!("Opening run log {:?}", config.log_file))?;
    info!(
        "Running pipeline on {:?} and {:?} into {:?}",
        inputs.ledger, inputs.budget, config.store
    );

    let report = match pipeline::execute(&inputs, &config, &mut store, &mut events) {
        Ok(report) => report,
        Err(err) => {
            record_abort(&mut events, &err);
            return Err(err).context("Pipeline run failed");
        }
    };
    print_report(&report);

    let failed = report.failed_queries().count();
    if failed > 0 {
        warn!(
            "{failed} reporting query(ies) failed; see {:?} for details",
            events.path()
        );
    }
    Ok(())
}

/// The run has already failed; a log write error here only gets a warning.
fn record_abort(events: &mut dyn EventSink, err: &PipelineError) {
    if let Err(log_err) = events.record(&format!("Pipeline aborted: {err}")) {
        warn!("Could not record the abort in the run log: {log_err}");
    }
}

fn print_report(report: &PipelineReport) {
    let shapes = [("ledger", report.ledger), ("budget", report.budget)]
        .into_iter()
        .map(|(name, change)| {
            vec![
                name.to_string(),
                change.before.0.to_string(),
                change.after.0.to_string(),
                change.after.1.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(
        &[
            "dataset".to_string(),
            "rows_before".to_string(),
            "rows_after".to_string(),
            "columns".to_string(),
        ],
        &shapes,
    );
    println!();

    let outcomes = report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(summary) => vec![
                outcome.name.to_string(),
                "ok".to_string(),
                summary.rows.to_string(),
                summary.digest.chars().take(12).collect(),
            ],
            Err(err) => vec![
                outcome.name.to_string(),
                "failed".to_string(),
                String::new(),
                err.to_string(),
            ],
        })
        .collect::<Vec<_>>();
    table::print_table(
        &[
            "query".to_string(),
            "status".to_string(),
            "rows".to_string(),
            "detail".to_string(),
        ],
        &outcomes,
    );
    println!();
    println!("Cleaned ledger: {}", report.cleaned_ledger.display());
    println!("Cleaned budget: {}", report.cleaned_budget.display());
}

fn handle_queries() -> Result<()> {
    let rows = catalog::QUERY_CATALOG
        .iter()
        .map(|query| vec![query.name.to_string(), query.sources().join(", ")])
        .collect::<Vec<_>>();
    table::print_table(&["query".to_string(), "sources".to_string()], &rows);
    Ok(())
}

fn handle_show(args: &ShowArgs) -> Result<()> {
    if !args.store.exists() {
        bail!("Store {:?} does not exist; run the pipeline first", args.store);
    }
    let mut store = DuckDbStore::open(&args.store)
        .with_context(|| format!("Opening store {:?}", args.store))?;
    if !store.relation_names()?.contains(&args.relation) {
        bail!("Relation '{}' not found in {:?}", args.relation, args.store);
    }
    let relation = store
        .query(&format!("SELECT * FROM {}", quote_ident(&args.relation)))
        .with_context(|| format!("Reading relation '{}'", args.relation))?;
    if let Some(query) = catalog::find(&args.relation) {
        println!("Report {} (from {})", query.name, query.sources().join(", "));
    }
    print!("{}", table::render_frame(&relation, args.limit));
    println!(
        "({} of {} row(s))",
        relation.row_count().min(args.limit),
        relation.row_count()
    );
    Ok(())
}
