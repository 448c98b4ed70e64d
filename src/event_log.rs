//! Run-level event log.
//!
//! Events are short human-readable lines describing what a pipeline run did:
//! which inputs it read, the shapes before and after cleaning, where cleaned
//! copies went, and the outcome of every reporting query.

use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Local;
use log::info;

use crate::error::Result;

pub trait EventSink {
    fn record(&mut self, message: &str) -> Result<()>;
}

/// Appends `[YYYY-MM-DD HH:MM:SS] message` lines to a file and mirrors each one
/// to the `log` facade.
pub struct FileEventLog {
    path: PathBuf,
    file: File,
}

impl FileEventLog {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for FileEventLog {
    fn record(&mut self, message: &str) -> Result<()> {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(self.file, "[{stamp}] {message}")?;
        info!("{message}");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryEventLog {
    events: Vec<String>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.events.iter().any(|event| event.contains(needle))
    }
}

impl EventSink for MemoryEventLog {
    fn record(&mut self, message: &str) -> Result<()> {
        self.events.push(message.to_string());
        Ok(())
    }
}
