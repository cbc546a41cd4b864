//! Deployment configuration builder
//!
//! Produces the desired deployment for a target: either a revision of the
//! target's current deployment, trimmed to the baseline components, or a
//! fresh configuration. Requested public and custom components are then
//! merged in, publishing custom components the registry does not have yet.

use std::path::Path;

use fleet_models::{
    ComponentDeploymentSpecification, CreateDeploymentRequest, Deployment, HistoryFilter,
};
use tracing::{debug, info};

use crate::deploy::api::FleetApi;
use crate::deploy::registry::{ensure_component, PreparedComponent};
use crate::errors::FleetError;
use crate::storage::params::{DeployParams, DeploymentGroup, PublicComponent};

/// Components requested by the parameter file, recipes already loaded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DesiredComponents {
    pub public: Vec<PublicComponent>,
    pub custom: Vec<PreparedComponent>,
    pub baseline: Vec<String>,
}

impl DesiredComponents {
    /// Load every custom recipe up front so configuration errors surface
    /// before any service call
    pub async fn prepare(params: &DeployParams, base_dir: &Path) -> Result<Self, FleetError> {
        let mut custom = Vec::with_capacity(params.custom_components.len());
        for spec in &params.custom_components {
            custom.push(PreparedComponent::load(spec, base_dir).await?);
        }

        Ok(Self {
            public: params.public_components.clone(),
            custom,
            baseline: params.baseline_components.clone(),
        })
    }
}

/// The latest deployment on the target carrying the group's deployment name
pub async fn find_existing_deployment(
    api: &dyn FleetApi,
    group: &DeploymentGroup,
) -> Result<Option<Deployment>, FleetError> {
    let summaries = api
        .list_deployments(&group.target_arn, HistoryFilter::LatestOnly)
        .await?;

    let Some(summary) = summaries
        .into_iter()
        .find(|d| d.deployment_name == group.deployment_name)
    else {
        info!(
            "No deployment named {} on {}",
            group.deployment_name, group.target_arn
        );
        return Ok(None);
    };

    info!(
        "Revising deployment {} ({})",
        summary.deployment_id, summary.deployment_name
    );
    api.get_deployment(&summary.deployment_id).await.map(Some)
}

/// Turn an existing deployment into a submittable configuration that keeps
/// only the baseline components
pub fn revise_deployment(
    deployment: Deployment,
    group: &DeploymentGroup,
    baseline: &[String],
) -> CreateDeploymentRequest {
    let mut config = CreateDeploymentRequest::from(deployment);
    if config.deployment_name.is_empty() {
        config.deployment_name = group.deployment_name.clone();
    }

    config.components.retain(|name, _| {
        let keep = baseline.iter().any(|b| b == name);
        if !keep {
            debug!("Dropping {} from the previous deployment", name);
        }
        keep
    });
    config
}

/// Add the requested components to `config`, registering custom ones first
pub async fn merge_components(
    api: &dyn FleetApi,
    config: &mut CreateDeploymentRequest,
    desired: &DesiredComponents,
) -> Result<(), FleetError> {
    for component in &desired.public {
        config.components.insert(
            component.component_name.clone(),
            ComponentDeploymentSpecification {
                component_version: component.component_version.clone(),
                configuration_update: component.configuration_update.clone(),
                run_with: None,
            },
        );
    }

    for component in &desired.custom {
        ensure_component(api, component).await?;
        config.components.insert(
            component.name().to_string(),
            ComponentDeploymentSpecification::version(component.version()),
        );
    }
    Ok(())
}

/// Build the configuration to submit for `group`
pub async fn build_config(
    api: &dyn FleetApi,
    group: &DeploymentGroup,
    desired: &DesiredComponents,
) -> Result<CreateDeploymentRequest, FleetError> {
    let mut config = match find_existing_deployment(api, group).await? {
        Some(deployment) => revise_deployment(deployment, group, &desired.baseline),
        None => CreateDeploymentRequest::new(&group.target_arn, &group.deployment_name),
    };

    merge_components(api, &mut config, desired).await?;

    info!(
        "Deployment {} will pin {} components",
        config.deployment_name,
        config.components.len()
    );
    Ok(config)
}
