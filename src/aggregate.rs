//! Runs the reporting catalog against a loaded store.

use log::{info, warn};

use crate::{
    catalog::QueryDefinition,
    error::{PipelineError, Result},
    event_log::EventSink,
    store::RelationalStore,
};

#[derive(Debug)]
pub struct QueryOutcome {
    pub name: &'static str,
    pub result: std::result::Result<QuerySummary, PipelineError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySummary {
    pub rows: usize,
    pub digest: String,
}

impl QueryOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Materializes every catalog entry as a relation named after it. A failing
/// query is recorded, its relation is removed so no earlier result survives,
/// and the remaining queries still run. Event sink failures are logged and do
/// not interrupt the catalog.
pub fn run_catalog(
    store: &mut dyn RelationalStore,
    catalog: &[QueryDefinition],
    events: &mut dyn EventSink,
) -> Vec<QueryOutcome> {
    let mut outcomes = Vec::with_capacity(catalog.len());
    for query in catalog {
        let result = materialize(store, query).map_err(|err| err.for_query(query.name));
        match &result {
            Ok(summary) => {
                info!(
                    "Query '{}' produced {} row(s), digest {}",
                    query.name, summary.rows, summary.digest
                );
                note(
                    events,
                    &format!("Query {} stored {} row(s)", query.name, summary.rows),
                );
            }
            Err(err) => {
                warn!("{err}");
                if let Err(drop_err) = store.drop_relation(query.name) {
                    warn!("Could not remove stale relation '{}': {drop_err}", query.name);
                }
                note(events, &format!("Query {} failed: {err}", query.name));
            }
        }
        outcomes.push(QueryOutcome {
            name: query.name,
            result,
        });
    }
    outcomes
}

fn note(events: &mut dyn EventSink, message: &str) {
    if let Err(err) = events.record(message) {
        warn!("Event log write failed: {err}");
    }
}

fn materialize(store: &mut dyn RelationalStore, query: &QueryDefinition) -> Result<QuerySummary> {
    let table = store.query(query.sql)?;
    store.replace_relation(query.name, &table)?;
    Ok(QuerySummary {
        rows: table.row_count(),
        digest: table.digest(),
    })
}
