//! Output file layout

use std::path::PathBuf;

use crate::filesys::file::File;

pub const FAILURES_FILE_ENV: &str = "FAILURES_FILE";
pub const STATUS_FILE_ENV: &str = "DEPLOYMENT_STATUS_FILE";

/// Where a run writes its artifacts
#[derive(Debug, Clone)]
pub struct OutputLayout {
    /// Failure report (device ids plus optional TIMEOUT sentinel)
    pub failures_file: PathBuf,

    /// Snapshot of the submitted deployment
    pub status_file: PathBuf,
}

impl OutputLayout {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        let out_dir = out_dir.into();
        Self {
            failures_file: out_dir.join("deployment_failures.json"),
            status_file: out_dir.join("deployment_status.json"),
        }
    }

    /// Default layout with environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(FAILURES_FILE_ENV).filter(|p| !p.is_empty()) {
            self.failures_file = PathBuf::from(path);
        }
        if let Some(path) = lookup(STATUS_FILE_ENV).filter(|p| !p.is_empty()) {
            self.status_file = PathBuf::from(path);
        }
        self
    }

    pub fn failures_file(&self) -> File {
        File::new(&self.failures_file)
    }

    pub fn status_file(&self) -> File {
        File::new(&self.status_file)
    }
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self::new("out")
    }
}
