//! In-memory stand-in for the fleet management API

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use base64::prelude::*;
use fleet_models::{
    CloudComponentStatus, Component, ComponentDeploymentSpecification, ComponentLatestVersion,
    ComponentScope, ComponentVersionListItem, CoreDevice, CoreDeviceStatus,
    CreateComponentVersionRequest, CreateComponentVersionResponse, CreateDeploymentRequest,
    CreateDeploymentResponse, Deployment, DeploymentSummary, HistoryFilter,
};
use ggdeploy::deploy::api::FleetApi;
use ggdeploy::errors::FleetError;

pub const MAIN_ARN: &str = "arn:aws:iot:us-west-2:123456789012:thinggroup/main";
pub const CANARY_ARN: &str = "arn:aws:iot:us-west-2:123456789012:thinggroup/canary";

#[derive(Default)]
struct State {
    deployments: Vec<Deployment>,
    components: Vec<Component>,
    versions: HashMap<String, Vec<ComponentVersionListItem>>,
    listings: VecDeque<Vec<CoreDevice>>,
    publish_errors: Option<BTreeMap<String, String>>,
    reject_deployments: Option<String>,

    created: Vec<CreateDeploymentRequest>,
    published: Vec<CreateComponentVersionRequest>,
    device_polls: usize,
}

#[derive(Default)]
pub struct FakeFleet {
    state: Mutex<State>,
}

pub fn device(id: &str, status: CoreDeviceStatus) -> CoreDevice {
    CoreDevice {
        core_device_thing_name: id.to_string(),
        status,
        last_status_update_timestamp: None,
    }
}

fn component_arn(name: &str, lineage: usize) -> String {
    format!(
        "arn:aws:greengrass:us-west-2:123456789012:components:{}:lineage-{}",
        name, lineage
    )
}

pub fn recipe(name: &str, version: &str) -> String {
    serde_json::json!({
        "RecipeFormatVersion": "2020-01-25",
        "ComponentName": name,
        "ComponentVersion": version,
        "Manifests": [ { "Platform": { "os": "linux" }, "Lifecycle": { "Run": "echo hi" } } ]
    })
    .to_string()
}

impl FakeFleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// An existing, latest deployment on `target_arn`
    pub fn with_deployment(self, target_arn: &str, name: &str, components: &[(&str, &str)]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = format!("existing-{}", state.deployments.len() + 1);
            state.deployments.push(Deployment {
                target_arn: target_arn.to_string(),
                deployment_name: Some(name.to_string()),
                components: components
                    .iter()
                    .map(|(n, v)| (n.to_string(), ComponentDeploymentSpecification::version(*v)))
                    .collect(),
                deployment_policies: Some(serde_json::json!({ "failureHandlingPolicy": "ROLLBACK" })),
                iot_job_configuration: None,
                parent_target_arn: None,
                tags: Some(BTreeMap::new()),
                deployment_id: Some(id),
                revision_id: Some("1".to_string()),
                iot_job_id: Some("job-1".to_string()),
                iot_job_arn: Some("arn:aws:iot:job/job-1".to_string()),
                creation_timestamp: Some(1_700_000_000.0),
                is_latest_for_target: Some(true),
                deployment_status: Some("COMPLETED".to_string()),
            });
        }
        self
    }

    /// A registered private component with the given versions, the last one latest
    pub fn with_component(self, name: &str, versions: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let arn = component_arn(name, state.components.len());
            state.components.push(Component {
                arn: arn.clone(),
                component_name: name.to_string(),
                latest_version: versions.last().map(|v| ComponentLatestVersion {
                    arn: Some(format!("{}:versions:{}", arn, v)),
                    component_version: Some(v.to_string()),
                    creation_timestamp: None,
                    publisher: None,
                }),
            });
            state.versions.insert(
                arn,
                versions
                    .iter()
                    .map(|v| ComponentVersionListItem {
                        component_name: name.to_string(),
                        component_version: v.to_string(),
                        arn: None,
                    })
                    .collect(),
            );
        }
        self
    }

    /// Device listings returned by successive polls; the last one repeats
    pub fn with_listings(self, listings: Vec<Vec<CoreDevice>>) -> Self {
        self.state.lock().unwrap().listings = listings.into();
        self
    }

    pub fn failing_publish(self, errors: &[(&str, &str)]) -> Self {
        self.state.lock().unwrap().publish_errors = Some(
            errors
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    pub fn rejecting_deployments(self, message: &str) -> Self {
        self.state.lock().unwrap().reject_deployments = Some(message.to_string());
        self
    }

    pub fn created(&self) -> Vec<CreateDeploymentRequest> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn published(&self) -> Vec<CreateComponentVersionRequest> {
        self.state.lock().unwrap().published.clone()
    }

    pub fn device_polls(&self) -> usize {
        self.state.lock().unwrap().device_polls
    }
}

#[async_trait]
impl FleetApi for FakeFleet {
    async fn list_deployments(
        &self,
        target_arn: &str,
        history_filter: HistoryFilter,
    ) -> Result<Vec<DeploymentSummary>, FleetError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .deployments
            .iter()
            .filter(|d| d.target_arn == target_arn)
            .filter(|d| {
                history_filter == HistoryFilter::All || d.is_latest_for_target == Some(true)
            })
            .map(|d| DeploymentSummary {
                target_arn: d.target_arn.clone(),
                deployment_id: d.deployment_id.clone().unwrap_or_default(),
                deployment_name: d.deployment_name.clone().unwrap_or_default(),
                revision_id: d.revision_id.clone(),
                creation_timestamp: d.creation_timestamp,
                deployment_status: d.deployment_status.clone(),
                is_latest_for_target: d.is_latest_for_target,
                parent_target_arn: None,
            })
            .collect())
    }

    async fn get_deployment(&self, deployment_id: &str) -> Result<Deployment, FleetError> {
        let state = self.state.lock().unwrap();
        state
            .deployments
            .iter()
            .find(|d| d.deployment_id.as_deref() == Some(deployment_id))
            .cloned()
            .ok_or_else(|| FleetError::ServiceError {
                status: 404,
                error_type: "ResourceNotFoundException".to_string(),
                message: format!("Deployment {} not found", deployment_id),
            })
    }

    async fn create_deployment(
        &self,
        request: &CreateDeploymentRequest,
    ) -> Result<CreateDeploymentResponse, FleetError> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.reject_deployments {
            return Err(FleetError::ServiceError {
                status: 400,
                error_type: "ValidationException".to_string(),
                message: message.clone(),
            });
        }

        state.created.push(request.clone());
        for existing in state
            .deployments
            .iter_mut()
            .filter(|d| d.target_arn == request.target_arn)
        {
            existing.is_latest_for_target = Some(false);
        }

        let id = format!("deployment-{}", state.created.len());
        state.deployments.push(Deployment {
            target_arn: request.target_arn.clone(),
            deployment_name: Some(request.deployment_name.clone()),
            components: request.components.clone(),
            deployment_policies: request.deployment_policies.clone(),
            iot_job_configuration: request.iot_job_configuration.clone(),
            parent_target_arn: request.parent_target_arn.clone(),
            tags: request.tags.clone(),
            deployment_id: Some(id.clone()),
            revision_id: Some("1".to_string()),
            iot_job_id: Some(format!("job-{}", id)),
            iot_job_arn: None,
            creation_timestamp: Some(1_700_000_100.0),
            is_latest_for_target: Some(true),
            deployment_status: Some("ACTIVE".to_string()),
        });

        Ok(CreateDeploymentResponse {
            deployment_id: Some(id.clone()),
            iot_job_id: Some(format!("job-{}", id)),
            iot_job_arn: None,
        })
    }

    async fn list_components(&self, scope: ComponentScope) -> Result<Vec<Component>, FleetError> {
        assert_eq!(scope, ComponentScope::Private);
        Ok(self.state.lock().unwrap().components.clone())
    }

    async fn list_component_versions(
        &self,
        component_arn: &str,
    ) -> Result<Vec<ComponentVersionListItem>, FleetError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .versions
            .get(component_arn)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_component_version(
        &self,
        request: &CreateComponentVersionRequest,
    ) -> Result<CreateComponentVersionResponse, FleetError> {
        let recipe: serde_json::Value =
            serde_json::from_slice(&BASE64_STANDARD.decode(&request.inline_recipe).unwrap()).unwrap();
        let name = recipe["ComponentName"].as_str().unwrap().to_string();
        let version = recipe["ComponentVersion"].as_str().unwrap().to_string();

        let mut state = self.state.lock().unwrap();
        state.published.push(request.clone());

        if let Some(errors) = state.publish_errors.clone() {
            return Ok(CreateComponentVersionResponse {
                arn: None,
                component_name: name,
                component_version: version,
                creation_timestamp: None,
                status: CloudComponentStatus {
                    component_state: Some("FAILED".to_string()),
                    message: Some("Recipe validation failed".to_string()),
                    errors,
                },
            });
        }

        let arn = match state.components.iter().find(|c| c.component_name == name) {
            Some(component) => component.arn.clone(),
            None => {
                let arn = component_arn(&name, state.components.len());
                state.components.push(Component {
                    arn: arn.clone(),
                    component_name: name.clone(),
                    latest_version: None,
                });
                arn
            }
        };
        state
            .versions
            .entry(arn.clone())
            .or_default()
            .push(ComponentVersionListItem {
                component_name: name.clone(),
                component_version: version.clone(),
                arn: None,
            });

        Ok(CreateComponentVersionResponse {
            arn: Some(format!("{}:versions:{}", arn, version)),
            component_name: name,
            component_version: version,
            creation_timestamp: Some(1_700_000_050.0),
            status: CloudComponentStatus {
                component_state: Some("DEPLOYABLE".to_string()),
                message: None,
                errors: BTreeMap::new(),
            },
        })
    }

    async fn list_core_devices(&self, _thing_group_arn: &str) -> Result<Vec<CoreDevice>, FleetError> {
        let mut state = self.state.lock().unwrap();
        state.device_polls += 1;
        let listing = if state.listings.len() > 1 {
            state.listings.pop_front().unwrap_or_default()
        } else {
            state.listings.front().cloned().unwrap_or_default()
        };
        Ok(listing)
    }
}
