//! Parameter file management

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::FleetError;
use crate::filesys::file::File;

pub const DEFAULT_PARAMS_FILE: &str = "deploy_params.json";

/// Deployment environment selected on the command line
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TargetName {
    Main,
    Canary,
}

impl TargetName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetName::Main => "main",
            TargetName::Canary => "canary",
        }
    }
}

impl fmt::Display for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fleet target: a thing group and the deployment name used on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentGroup {
    pub target_arn: String,
    pub deployment_name: String,
}

/// A component taken as-is from the public catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicComponent {
    pub component_name: String,
    pub component_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_update: Option<serde_json::Value>,
}

/// A component built from a local recipe and published when missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomComponent {
    pub component_name: String,
    pub component_version: String,

    /// Recipe path, relative to the parameter file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl CustomComponent {
    /// Recipe path resolved against the parameter file's directory
    pub fn recipe_path(&self, base_dir: &Path) -> PathBuf {
        let relative = self.recipe_file.clone().unwrap_or_else(|| {
            PathBuf::from("recipes").join(format!(
                "{}-{}.json",
                self.component_name, self.component_version
            ))
        });
        base_dir.join(relative)
    }
}

/// Convergence polling parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingParams {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_max_iterations() -> u32 {
    100
}

fn default_interval_secs() -> u64 {
    1
}

impl PollingParams {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for PollingParams {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            interval_secs: default_interval_secs(),
        }
    }
}

/// Pipeline stack parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackParams {
    #[serde(default)]
    pub repository_name: Option<String>,

    #[serde(default)]
    pub repository_branch_name: Option<String>,

    /// Tag key to accepted values for the on-premise deployment group
    #[serde(default)]
    pub on_premise_instance_tags: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub pipeline_name: Option<String>,

    #[serde(default)]
    pub stack_name: Option<String>,

    /// Parameter file path inside the source checkout, used by the deploy
    /// stages
    #[serde(default)]
    pub deploy_params_path: Option<String>,
}

/// Contents of the parameter file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployParams {
    #[serde(default)]
    pub deployment_groups: BTreeMap<TargetName, DeploymentGroup>,

    #[serde(default)]
    pub public_components: Vec<PublicComponent>,

    #[serde(default)]
    pub custom_components: Vec<CustomComponent>,

    /// Components carried over from an existing deployment
    #[serde(default = "default_baseline_components")]
    pub baseline_components: Vec<String>,

    #[serde(default)]
    pub polling: PollingParams,

    #[serde(flatten)]
    pub stack: StackParams,
}

fn default_baseline_components() -> Vec<String> {
    vec![
        "aws.greengrass.Nucleus".to_string(),
        "aws.greengrass.Cli".to_string(),
    ]
}

impl Default for DeployParams {
    fn default() -> Self {
        Self {
            deployment_groups: BTreeMap::new(),
            public_components: Vec::new(),
            custom_components: Vec::new(),
            baseline_components: default_baseline_components(),
            polling: PollingParams::default(),
            stack: StackParams::default(),
        }
    }
}

impl DeployParams {
    /// Look up the deployment group of an environment
    pub fn deployment_group(&self, target: TargetName) -> Result<&DeploymentGroup, FleetError> {
        self.deployment_groups.get(&target).ok_or_else(|| {
            FleetError::ConfigError(format!("No deployment group configured for '{}'", target))
        })
    }

    /// Requested component names must be unique across both lists
    pub fn validate(&self) -> Result<(), FleetError> {
        let mut seen = BTreeSet::new();
        let names = self
            .public_components
            .iter()
            .map(|c| &c.component_name)
            .chain(self.custom_components.iter().map(|c| &c.component_name));

        for name in names {
            if !seen.insert(name) {
                return Err(FleetError::ConfigError(format!(
                    "Component {} is declared more than once",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// A parameter file on disk
#[derive(Debug, Clone)]
pub struct ParamsFile {
    file: File,
}

impl ParamsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: File::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Directory recipe paths are resolved against
    pub fn base_dir(&self) -> PathBuf {
        match self.file.path().parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Load and validate the parameters
    pub async fn load(&self) -> Result<DeployParams, FleetError> {
        self.file.assert_exists().await?;
        let params: DeployParams = self.file.read_json().await?;
        params.validate()?;
        debug!(
            "Loaded {} public and {} custom components from {}",
            params.public_components.len(),
            params.custom_components.len(),
            self.file.path().display()
        );
        Ok(params)
    }
}

impl Default for ParamsFile {
    fn default() -> Self {
        Self::new(DEFAULT_PARAMS_FILE)
    }
}
