//! Run configuration options

use std::path::PathBuf;
use std::time::Duration;

use crate::storage::layout::OutputLayout;
use crate::storage::params::{PollingParams, TargetName, DEFAULT_PARAMS_FILE};
use crate::workers::poller;

/// Options for a deployment run
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Environment to deploy to
    pub target: TargetName,

    /// Parameter file
    pub params_file: PathBuf,

    /// Output artifacts
    pub layout: OutputLayout,

    /// Command-line overrides of the parameter file's polling block
    pub poll_overrides: PollOverrides,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            target: TargetName::Canary,
            params_file: PathBuf::from(DEFAULT_PARAMS_FILE),
            layout: OutputLayout::default(),
            poll_overrides: PollOverrides::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PollOverrides {
    pub max_iterations: Option<u32>,
    pub interval: Option<Duration>,
}

impl PollOverrides {
    pub fn apply(&self, params: PollingParams) -> poller::Options {
        let mut options = poller::Options::from(params);
        if let Some(max_iterations) = self.max_iterations {
            options.max_iterations = max_iterations;
        }
        if let Some(interval) = self.interval {
            options.interval = interval;
        }
        options
    }
}

/// Options for stack synthesis
#[derive(Debug, Clone)]
pub struct SynthOptions {
    /// Parameter file
    pub params_file: PathBuf,

    /// Directory the template is written to
    pub out_dir: PathBuf,

    /// Region baked into the build environment
    pub region: String,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            params_file: PathBuf::from(DEFAULT_PARAMS_FILE),
            out_dir: PathBuf::from("cdk.out"),
            region: crate::storage::settings::DEFAULT_REGION.to_string(),
        }
    }
}
