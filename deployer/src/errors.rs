//! Error types for the deployment tooling

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the deployer
#[derive(Error, Debug)]
pub enum FleetError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("File {} does not exist", .0.display())]
    MissingFile(PathBuf),

    #[error("Registry error: {0}")]
    RegistryError(String),

    #[error("Failed to publish component {component}: {errors:?}")]
    ComponentPublishError {
        component: String,
        errors: BTreeMap<String, String>,
    },

    #[error("Service error ({status}) {error_type}: {message}")]
    ServiceError {
        status: u16,
        error_type: String,
        message: String,
    },

    #[error("Template error: {0}")]
    TemplateError(#[from] stack_template::DuplicateResource),

    #[error("Signing error: {0}")]
    SigningError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FleetError {
    /// Whether the error stems from local configuration rather than a service call
    pub fn is_config(&self) -> bool {
        matches!(self, FleetError::ConfigError(_) | FleetError::MissingFile(_))
    }
}
