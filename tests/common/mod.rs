#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use finance_pipeline::config::PipelineConfig;
use tempfile::{TempDir, tempdir};

pub const LEDGER_FIXTURE: &str = "General-Ledger.csv";
pub const BUDGET_FIXTURE: &str = "Budget-Forecast.csv";

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Configuration reading the bundled fixtures and writing every output
    /// inside this workspace.
    pub fn fixture_config(&self) -> PipelineConfig {
        PipelineConfig {
            ledger: fixture_path(LEDGER_FIXTURE),
            budget: fixture_path(BUDGET_FIXTURE),
            store: self.path().join("finance.db"),
            cleaned_dir: self.path().join("cleaned"),
            log_file: self.path().join("pipeline.log"),
        }
    }
}
