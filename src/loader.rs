use log::info;

use crate::{
    error::{PipelineError, Result},
    frame::Table,
    store::RelationalStore,
};

pub const LEDGER_RELATION: &str = "ledger";
pub const BUDGET_RELATION: &str = "budget";

/// Replaces the `ledger` and `budget` relations, then confirms both are listed
/// by the store.
pub fn load(store: &mut dyn RelationalStore, ledger: &Table, budget: &Table) -> Result<()> {
    store.replace_relation(LEDGER_RELATION, ledger)?;
    store.replace_relation(BUDGET_RELATION, budget)?;

    let names = store.relation_names()?;
    for relation in [LEDGER_RELATION, BUDGET_RELATION] {
        if !names.iter().any(|name| name == relation) {
            return Err(PipelineError::StoreIntegrity {
                relation: relation.to_string(),
            });
        }
    }
    info!(
        "Loaded {} ledger row(s) and {} budget row(s)",
        ledger.row_count(),
        budget.row_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::Value,
        frame::{Column, ColumnKind},
        store::DuckDbStore,
    };

    fn one_column(name: &str, values: &[f64]) -> Table {
        Table::new(vec![Column::new(
            name,
            ColumnKind::Number,
            values.iter().map(|v| Some(Value::Number(*v))).collect(),
        )])
        .unwrap()
    }

    /// Accepts writes but never reports the budget relation.
    struct ForgetfulStore(Vec<String>);

    impl RelationalStore for ForgetfulStore {
        fn replace_relation(&mut self, name: &str, _table: &Table) -> Result<()> {
            if name != BUDGET_RELATION {
                self.0.push(name.to_string());
            }
            Ok(())
        }

        fn query(&mut self, _sql: &str) -> Result<Table> {
            Table::new(Vec::new())
        }

        fn drop_relation(&mut self, name: &str) -> Result<()> {
            self.0.retain(|existing| existing != name);
            Ok(())
        }

        fn relation_names(&mut self) -> Result<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn loads_both_relations() {
        let mut store = DuckDbStore::open_in_memory().unwrap();
        load(&mut store, &one_column("Debit", &[1.0, 2.0]), &one_column("BudgetUSD", &[3.0]))
            .unwrap();
        assert_eq!(store.relation_names().unwrap(), vec!["budget", "ledger"]);
    }

    #[test]
    fn reload_replaces_previous_contents() {
        let mut store = DuckDbStore::open_in_memory().unwrap();
        let budget = one_column("BudgetUSD", &[3.0]);
        load(&mut store, &one_column("Debit", &[1.0, 2.0]), &budget).unwrap();
        load(&mut store, &one_column("Debit", &[5.0]), &budget).unwrap();
        let rows = store.query("SELECT * FROM ledger").unwrap();
        assert_eq!(rows.display_rows(), vec![vec!["5"]]);
    }

    #[test]
    fn missing_relation_is_an_integrity_error() {
        let mut store = ForgetfulStore(Vec::new());
        let table = one_column("x", &[1.0]);
        let err = load(&mut store, &table, &table).unwrap_err();
        assert!(matches!(err, PipelineError::StoreIntegrity { ref relation } if relation == "budget"));
    }
}
