//! Reporting query catalog.
//!
//! Each entry is materialized as a relation of the same name by
//! [`crate::aggregate::run_catalog`]. Adding or removing a report is an edit to
//! [`QUERY_CATALOG`] only. Ordering clauses include a tie-breaker so reruns over
//! the same data produce identical relations.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryDefinition {
    pub name: &'static str,
    pub sql: &'static str,
}

impl QueryDefinition {
    /// Relations the query reads, in the order they first appear.
    pub fn sources(&self) -> Vec<&'static str> {
        let lowered = self.sql.to_ascii_lowercase();
        ["ledger", "budget"]
            .into_iter()
            .filter_map(|relation| {
                lowered
                    .find(&format!("from {relation}"))
                    .or_else(|| lowered.find(&format!("join {relation}")))
                    .map(|position| (position, relation))
            })
            .collect::<std::collections::BTreeMap<_, _>>()
            .into_values()
            .collect()
    }
}

pub const QUERY_CATALOG: &[QueryDefinition] = &[
    QueryDefinition {
        name: "q_total_spend_by_dept",
        sql: "SELECT Dept, SUM(Debit) AS Total_Spend \
              FROM ledger \
              GROUP BY Dept \
              ORDER BY Total_Spend DESC, Dept",
    },
    QueryDefinition {
        name: "q_total_spend_by_costcenter",
        sql: "SELECT CostCenter, SUM(Debit) AS Total_Spend \
              FROM ledger \
              GROUP BY CostCenter \
              ORDER BY Total_Spend DESC, CostCenter",
    },
    QueryDefinition {
        name: "q_revenue_by_dept",
        sql: "SELECT Dept, SUM(Credit) AS Total_Revenue \
              FROM ledger \
              GROUP BY Dept \
              ORDER BY Total_Revenue DESC, Dept",
    },
    QueryDefinition {
        name: "q_revenue_by_costcenter",
        sql: "SELECT CostCenter, SUM(Credit) AS Total_Revenue \
              FROM ledger \
              GROUP BY CostCenter \
              ORDER BY Total_Revenue DESC, CostCenter",
    },
    QueryDefinition {
        name: "q_net_profit_by_dept",
        sql: "SELECT Dept, SUM(Credit) - SUM(Debit) AS Net_Profit \
              FROM ledger \
              GROUP BY Dept \
              ORDER BY Net_Profit DESC, Dept",
    },
    QueryDefinition {
        name: "q_monthly_spend_trend",
        sql: "SELECT strftime(TxnDate, '%Y-%m') AS Month, SUM(Debit) AS Total_Spend \
              FROM ledger \
              GROUP BY Month \
              ORDER BY Month",
    },
    QueryDefinition {
        name: "q_monthly_revenue_trend",
        sql: "SELECT strftime(TxnDate, '%Y-%m') AS Month, SUM(Credit) AS Total_Revenue \
              FROM ledger \
              GROUP BY Month \
              ORDER BY Month",
    },
    QueryDefinition {
        name: "q_actual_vs_budget_by_dept",
        sql: "SELECT b.FiscalYear, b.Dept, \
                     SUM(l.Debit) AS Actual_Spend, \
                     SUM(b.BudgetUSD) AS Budget, \
                     SUM(b.BudgetUSD) - SUM(l.Debit) AS Variance \
              FROM budget b \
              LEFT JOIN ledger l ON b.Dept = l.Dept \
              GROUP BY b.FiscalYear, b.Dept \
              ORDER BY b.FiscalYear, b.Dept",
    },
    QueryDefinition {
        name: "q_forecast_accuracy_by_dept",
        sql: "SELECT Dept, \
                     SUM(ForecastUSD) AS Total_Forecast, \
                     SUM(ActualUSD) AS Total_Actual, \
                     SUM(ActualUSD) - SUM(ForecastUSD) AS Forecast_Error \
              FROM budget \
              GROUP BY Dept \
              ORDER BY Dept",
    },
    QueryDefinition {
        name: "q_top_expense_accounts",
        sql: "SELECT AccountName, SUM(Debit) AS Total_Expense \
              FROM ledger \
              GROUP BY AccountName \
              ORDER BY Total_Expense DESC, AccountName \
              LIMIT 10",
    },
    QueryDefinition {
        name: "q_currency_mix",
        sql: "SELECT Currency, SUM(Debit) AS Total_Spend, SUM(Credit) AS Total_Revenue \
              FROM ledger \
              GROUP BY Currency \
              ORDER BY Total_Revenue DESC, Currency",
    },
];

pub fn find(name: &str) -> Option<&'static QueryDefinition> {
    QUERY_CATALOG.iter().find(|query| query.name == name)
}
