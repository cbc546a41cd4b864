use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::epoch_to_datetime;

/// History filter for `ListDeployments`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryFilter {
    All,
    LatestOnly,
}

impl HistoryFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryFilter::All => "ALL",
            HistoryFilter::LatestOnly => "LATEST_ONLY",
        }
    }
}

/// Component version pinned by a deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDeploymentSpecification {
    pub component_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_update: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_with: Option<serde_json::Value>,
}

impl ComponentDeploymentSpecification {
    pub fn version(version: impl Into<String>) -> Self {
        Self {
            component_version: version.into(),
            configuration_update: None,
            run_with: None,
        }
    }
}

/// Entry of a `ListDeployments` page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSummary {
    pub target_arn: String,
    pub deployment_id: String,
    pub deployment_name: String,

    #[serde(default)]
    pub revision_id: Option<String>,

    #[serde(default)]
    pub creation_timestamp: Option<f64>,

    #[serde(default)]
    pub deployment_status: Option<String>,

    #[serde(default)]
    pub is_latest_for_target: Option<bool>,

    #[serde(default)]
    pub parent_target_arn: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDeploymentsResponse {
    #[serde(default)]
    pub deployments: Vec<DeploymentSummary>,

    #[serde(default)]
    pub next_token: Option<String>,
}

/// Full deployment as returned by `GetDeployment`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub target_arn: String,

    #[serde(default)]
    pub deployment_name: Option<String>,

    #[serde(default)]
    pub components: BTreeMap<String, ComponentDeploymentSpecification>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_policies: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iot_job_configuration: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_target_arn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,

    // Assigned by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iot_job_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iot_job_arn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_latest_for_target: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_status: Option<String>,
}

impl Deployment {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.creation_timestamp.and_then(epoch_to_datetime)
    }
}

/// Body of `CreateDeployment`; also the desired state the reconciler builds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeploymentRequest {
    pub target_arn: String,
    pub deployment_name: String,
    pub components: BTreeMap<String, ComponentDeploymentSpecification>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_policies: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iot_job_configuration: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_target_arn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_token: Option<String>,
}

impl CreateDeploymentRequest {
    pub fn new(target_arn: impl Into<String>, deployment_name: impl Into<String>) -> Self {
        Self {
            target_arn: target_arn.into(),
            deployment_name: deployment_name.into(),
            components: BTreeMap::new(),
            deployment_policies: None,
            iot_job_configuration: None,
            parent_target_arn: None,
            tags: None,
            client_token: None,
        }
    }
}

impl From<Deployment> for CreateDeploymentRequest {
    /// Revise an existing deployment, dropping the fields the service assigns
    fn from(deployment: Deployment) -> Self {
        Self {
            target_arn: deployment.target_arn,
            deployment_name: deployment.deployment_name.unwrap_or_default(),
            components: deployment.components,
            deployment_policies: deployment.deployment_policies,
            iot_job_configuration: deployment.iot_job_configuration,
            parent_target_arn: deployment.parent_target_arn,
            tags: deployment.tags.filter(|tags| !tags.is_empty()),
            client_token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeploymentResponse {
    #[serde(default)]
    pub deployment_id: Option<String>,

    #[serde(default)]
    pub iot_job_id: Option<String>,

    #[serde(default)]
    pub iot_job_arn: Option<String>,
}
