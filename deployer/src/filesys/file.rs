//! File operations

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::errors::FleetError;

/// Input or output artifact of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    path: PathBuf,
}

impl File {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        fs::metadata(&self.path).await.is_ok()
    }

    /// Fail with `MissingFile` unless the file exists
    pub async fn assert_exists(&self) -> Result<(), FleetError> {
        if self.exists().await {
            Ok(())
        } else {
            Err(FleetError::MissingFile(self.path.clone()))
        }
    }

    pub async fn read_bytes(&self) -> Result<Vec<u8>, FleetError> {
        Ok(fs::read(&self.path).await?)
    }

    /// Parse the file as JSON. Malformed content is reported as a
    /// configuration error naming the file.
    pub async fn read_json<T: DeserializeOwned>(&self) -> Result<T, FleetError> {
        let contents = self.read_bytes().await?;
        serde_json::from_slice(&contents).map_err(|e| {
            FleetError::ConfigError(format!("Invalid JSON in {}: {}", self.path.display(), e))
        })
    }

    /// Replace the file through a sibling temp file, creating parent
    /// directories as needed
    pub async fn write_bytes(&self, contents: &[u8]) -> Result<(), FleetError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }

    /// Pretty-printed JSON followed by a newline
    pub async fn write_json<T: Serialize>(&self, value: &T) -> Result<(), FleetError> {
        let mut contents = serde_json::to_vec_pretty(value)?;
        contents.push(b'\n');
        self.write_bytes(&contents).await
    }
}
