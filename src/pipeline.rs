//! End-to-end run: read → clean → save cleaned copies → load → aggregate.
//!
//! The store and the event sink are passed in by the caller. Input paths come
//! from an explicit [`PipelineInputs`]; checking that they exist is the
//! caller's job.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use log::{info, warn};

use crate::{
    aggregate::{QueryOutcome, run_catalog},
    catalog::QUERY_CATALOG,
    cleaners::{clean_budget, clean_ledger},
    config::PipelineConfig,
    error::Result,
    event_log::EventSink,
    frame::Table,
    loader,
    store::RelationalStore,
    workbook,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineInputs {
    pub ledger: PathBuf,
    pub budget: PathBuf,
}

impl PipelineInputs {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            ledger: config.ledger.clone(),
            budget: config.budget.clone(),
        }
    }

    /// Paths that are not on disk, in ledger, budget order.
    pub fn missing(&self) -> Vec<&Path> {
        [self.ledger.as_path(), self.budget.as_path()]
            .into_iter()
            .filter(|path| !path.exists())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeChange {
    pub before: (usize, usize),
    pub after: (usize, usize),
}

#[derive(Debug)]
pub struct PipelineReport {
    pub ledger: ShapeChange,
    pub budget: ShapeChange,
    pub cleaned_ledger: PathBuf,
    pub cleaned_budget: PathBuf,
    pub outcomes: Vec<QueryOutcome>,
}

impl PipelineReport {
    pub fn failed_queries(&self) -> impl Iterator<Item = &QueryOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.succeeded())
    }
}

pub fn execute(
    inputs: &PipelineInputs,
    config: &PipelineConfig,
    store: &mut dyn RelationalStore,
    events: &mut dyn EventSink,
) -> Result<PipelineReport> {
    execute_at(inputs, config, store, events, Local::now().naive_local())
}

/// Same as [`execute`] with a fixed timestamp for the cleaned-copy names.
pub fn execute_at(
    inputs: &PipelineInputs,
    config: &PipelineConfig,
    store: &mut dyn RelationalStore,
    events: &mut dyn EventSink,
    stamp: NaiveDateTime,
) -> Result<PipelineReport> {
    events.record("Pipeline started")?;
    events.record(&format!("Ledger input: {}", inputs.ledger.display()))?;
    events.record(&format!("Budget input: {}", inputs.budget.display()))?;

    let raw_ledger = workbook::read_table(&inputs.ledger)?;
    let raw_budget = workbook::read_table(&inputs.budget)?;
    let ledger_before = raw_ledger.shape();
    let budget_before = raw_budget.shape();

    let ledger = clean_ledger(raw_ledger);
    record_cleaning(events, "Ledger", ledger_before, &ledger)?;
    let budget = clean_budget(raw_budget);
    record_cleaning(events, "Budget", budget_before, &budget)?;
    let (ledger, budget) = (ledger?, budget?);

    std::fs::create_dir_all(&config.cleaned_dir)?;
    let cleaned_ledger = config.cleaned_ledger_path(&stamp);
    let cleaned_budget = config.cleaned_budget_path(&stamp);
    workbook::write_table(&cleaned_ledger, &ledger)?;
    workbook::write_table(&cleaned_budget, &budget)?;
    events.record(&format!("Saved cleaned ledger to {}", cleaned_ledger.display()))?;
    events.record(&format!("Saved cleaned budget to {}", cleaned_budget.display()))?;

    loader::load(store, &ledger, &budget)?;
    events.record("Loaded ledger and budget into the store")?;

    let outcomes = run_catalog(store, QUERY_CATALOG, events);
    let failed = outcomes.iter().filter(|o| !o.succeeded()).count();
    if failed > 0 {
        warn!("{failed} of {} reporting queries failed", outcomes.len());
    }
    events.record(&format!(
        "Pipeline finished: {} of {} reporting queries stored",
        outcomes.len() - failed,
        outcomes.len()
    ))?;
    info!("Pipeline run complete");

    Ok(PipelineReport {
        ledger: ShapeChange {
            before: ledger_before,
            after: ledger.shape(),
        },
        budget: ShapeChange {
            before: budget_before,
            after: budget.shape(),
        },
        cleaned_ledger,
        cleaned_budget,
        outcomes,
    })
}

fn record_cleaning(
    events: &mut dyn EventSink,
    dataset: &str,
    before: (usize, usize),
    cleaned: &Result<Table>,
) -> Result<()> {
    let message = match cleaned {
        Ok(table) => format!(
            "{dataset} cleaned: {:?} -> {:?} (rows, columns)",
            before,
            table.shape()
        ),
        Err(err) => format!("{dataset} cleaning failed: {err}"),
    };
    events.record(&message)
}
