mod common;

use std::fs;

use assert_cmd::Command;
use common::TestWorkspace;
use finance_pipeline::catalog::QUERY_CATALOG;
use predicates::prelude::*;
use predicates::str::contains;

fn run_args(workspace: &TestWorkspace) -> Vec<String> {
    let config = workspace.fixture_config();
    vec![
        "run".to_string(),
        "--ledger".to_string(),
        config.ledger.display().to_string(),
        "--budget".to_string(),
        config.budget.display().to_string(),
        "--store".to_string(),
        config.store.display().to_string(),
        "--cleaned-dir".to_string(),
        config.cleaned_dir.display().to_string(),
        "--log-file".to_string(),
        config.log_file.display().to_string(),
    ]
}

#[test]
fn run_reports_every_query() {
    let workspace = TestWorkspace::new();
    let config = workspace.fixture_config();

    let assert = Command::cargo_bin("finance-pipeline")
        .expect("binary exists")
        .args(run_args(&workspace))
        .assert()
        .success()
        .stdout(contains("rows_before"))
        .stdout(contains("Cleaned ledger:"));
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    for query in QUERY_CATALOG {
        assert!(stdout.contains(query.name), "missing {} in output", query.name);
    }
    assert!(!stdout.contains("failed"));

    assert!(config.store.exists());
    let cleaned = fs::read_dir(&config.cleaned_dir)
        .expect("cleaned dir")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect::<Vec<_>>();
    assert_eq!(cleaned.len(), 2);
    assert!(cleaned.iter().any(|name| name.starts_with("General-Ledger-Cleaned_")));
    assert!(cleaned.iter().any(|name| name.starts_with("Budget-Forecast-Cleaned_")));
    let log = fs::read_to_string(&config.log_file).expect("run log");
    assert!(log.contains("Pipeline finished"));
}

#[test]
fn run_with_yaml_config_and_flag_override() {
    let workspace = TestWorkspace::new();
    let config = workspace.fixture_config();
    let yaml = format!(
        "ledger: {:?}\nbudget: {:?}\nstore: {:?}\ncleaned_dir: {:?}\nlog_file: {:?}\n",
        config.ledger,
        config.budget,
        workspace.path().join("ignored.db"),
        config.cleaned_dir,
        config.log_file,
    );
    let config_path = workspace.write("pipeline.yml", &yaml);

    Command::cargo_bin("finance-pipeline")
        .expect("binary exists")
        .args([
            "run",
            "--config",
            config_path.to_str().unwrap(),
            "--store",
            config.store.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert!(config.store.exists());
    assert!(!workspace.path().join("ignored.db").exists());
}

#[test]
fn run_fails_when_an_input_is_missing() {
    let workspace = TestWorkspace::new();
    let missing = workspace.path().join("absent.xlsx");
    let mut args = run_args(&workspace);
    args[2] = missing.display().to_string();

    Command::cargo_bin("finance-pipeline")
        .expect("binary exists")
        .args(args)
        .assert()
        .failure()
        .stderr(contains("input file not found").and(contains("absent.xlsx")));
    assert!(!workspace.path().join("finance.db").exists());
}

#[test]
fn run_fails_on_non_numeric_amount() {
    let workspace = TestWorkspace::new();
    let ledger = workspace.write(
        "ledger.csv",
        "TxnDate,Dept,Debit,Credit,Amount\n2024-01-05,sales,1,0,one\n",
    );
    let mut args = run_args(&workspace);
    args[2] = ledger.display().to_string();

    Command::cargo_bin("finance-pipeline")
        .expect("binary exists")
        .args(args)
        .assert()
        .failure()
        .stderr(contains("cannot coerce value 'one'"));

    let log = fs::read_to_string(workspace.path().join("pipeline.log")).expect("run log");
    assert!(log.contains("Ledger cleaning failed"));
    assert!(log.contains("Budget cleaned"));
    assert!(log.contains("Pipeline aborted"));
}

#[test]
fn queries_lists_catalog_with_sources() {
    Command::cargo_bin("finance-pipeline")
        .expect("binary exists")
        .arg("queries")
        .assert()
        .success()
        .stdout(contains("q_total_spend_by_dept"))
        .stdout(contains("q_currency_mix"))
        .stdout(contains("budget, ledger"));
}

#[test]
fn show_prints_a_stored_report() {
    let workspace = TestWorkspace::new();
    let config = workspace.fixture_config();
    Command::cargo_bin("finance-pipeline")
        .expect("binary exists")
        .args(run_args(&workspace))
        .assert()
        .success();

    Command::cargo_bin("finance-pipeline")
        .expect("binary exists")
        .args([
            "show",
            "--store",
            config.store.to_str().unwrap(),
            "--relation",
            "q_total_spend_by_dept",
            "--limit",
            "2",
        ])
        .assert()
        .success()
        .stdout(contains("OPS").and(contains("325.5")))
        .stdout(contains("HR").not())
        .stdout(contains("(2 of 3 row(s))"));

    Command::cargo_bin("finance-pipeline")
        .expect("binary exists")
        .args([
            "show",
            "--store",
            config.store.to_str().unwrap(),
            "--relation",
            "q_nope",
        ])
        .assert()
        .failure()
        .stderr(contains("Relation 'q_nope' not found"));
}
