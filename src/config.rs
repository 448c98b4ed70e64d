//! Run configuration: where the inputs live and where outputs go.
//!
//! Every field has a default so an empty YAML document (or no file at all) is a
//! valid configuration. CLI flags override individual fields after loading.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const LEDGER_STEM: &str = "General-Ledger";
pub const BUDGET_STEM: &str = "Budget-Forecast";
const CLEANED_SUFFIX: &str = "Cleaned";
const CLEANED_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub ledger: PathBuf,
    pub budget: PathBuf,
    pub store: PathBuf,
    pub cleaned_dir: PathBuf,
    pub log_file: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ledger: PathBuf::from("input").join(format!("{LEDGER_STEM}.xlsx")),
            budget: PathBuf::from("input").join(format!("{BUDGET_STEM}.xlsx")),
            store: PathBuf::from("finance.db"),
            cleaned_dir: PathBuf::from("cleaned"),
            log_file: PathBuf::from("pipeline.log"),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Option<PipelineConfig> = serde_yaml::from_reader(reader)?;
        Ok(config.unwrap_or_default())
    }

    pub fn cleaned_ledger_path(&self, stamp: &NaiveDateTime) -> PathBuf {
        self.cleaned_path(LEDGER_STEM, stamp)
    }

    pub fn cleaned_budget_path(&self, stamp: &NaiveDateTime) -> PathBuf {
        self.cleaned_path(BUDGET_STEM, stamp)
    }

    fn cleaned_path(&self, stem: &str, stamp: &NaiveDateTime) -> PathBuf {
        self.cleaned_dir.join(format!(
            "{stem}-{CLEANED_SUFFIX}_{}.xlsx",
            stamp.format(CLEANED_STAMP_FORMAT)
        ))
    }
}
