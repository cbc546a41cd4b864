//! Fleet management API seam

use async_trait::async_trait;
use fleet_models::{
    Component, ComponentScope, ComponentVersionListItem, CoreDevice, CreateComponentVersionRequest,
    CreateComponentVersionResponse, CreateDeploymentRequest, CreateDeploymentResponse, Deployment,
    DeploymentSummary, HistoryFilter,
};

use crate::errors::FleetError;
use crate::http::client::HttpClient;

/// Fleet management operations the reconciler relies on.
///
/// Passed explicitly into every operation so tests can substitute an
/// in-memory fleet.
#[async_trait]
pub trait FleetApi: Send + Sync {
    async fn list_deployments(
        &self,
        target_arn: &str,
        history_filter: HistoryFilter,
    ) -> Result<Vec<DeploymentSummary>, FleetError>;

    async fn get_deployment(&self, deployment_id: &str) -> Result<Deployment, FleetError>;

    async fn create_deployment(
        &self,
        request: &CreateDeploymentRequest,
    ) -> Result<CreateDeploymentResponse, FleetError>;

    async fn list_components(&self, scope: ComponentScope) -> Result<Vec<Component>, FleetError>;

    async fn list_component_versions(
        &self,
        component_arn: &str,
    ) -> Result<Vec<ComponentVersionListItem>, FleetError>;

    async fn create_component_version(
        &self,
        request: &CreateComponentVersionRequest,
    ) -> Result<CreateComponentVersionResponse, FleetError>;

    async fn list_core_devices(&self, thing_group_arn: &str) -> Result<Vec<CoreDevice>, FleetError>;
}

#[async_trait]
impl FleetApi for HttpClient {
    async fn list_deployments(
        &self,
        target_arn: &str,
        history_filter: HistoryFilter,
    ) -> Result<Vec<DeploymentSummary>, FleetError> {
        HttpClient::list_deployments(self, target_arn, history_filter).await
    }

    async fn get_deployment(&self, deployment_id: &str) -> Result<Deployment, FleetError> {
        HttpClient::get_deployment(self, deployment_id).await
    }

    async fn create_deployment(
        &self,
        request: &CreateDeploymentRequest,
    ) -> Result<CreateDeploymentResponse, FleetError> {
        HttpClient::create_deployment(self, request).await
    }

    async fn list_components(&self, scope: ComponentScope) -> Result<Vec<Component>, FleetError> {
        HttpClient::list_components(self, scope).await
    }

    async fn list_component_versions(
        &self,
        component_arn: &str,
    ) -> Result<Vec<ComponentVersionListItem>, FleetError> {
        HttpClient::list_component_versions(self, component_arn).await
    }

    async fn create_component_version(
        &self,
        request: &CreateComponentVersionRequest,
    ) -> Result<CreateComponentVersionResponse, FleetError> {
        HttpClient::create_component_version(self, request).await
    }

    async fn list_core_devices(&self, thing_group_arn: &str) -> Result<Vec<CoreDevice>, FleetError> {
        HttpClient::list_core_devices(self, thing_group_arn).await
    }
}
