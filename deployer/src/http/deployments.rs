//! Deployment API client

use fleet_models::{
    CreateDeploymentRequest, CreateDeploymentResponse, Deployment, DeploymentSummary,
    HistoryFilter, ListDeploymentsResponse,
};

use crate::errors::FleetError;
use crate::http::client::{api_path, HttpClient};

const PAGE_SIZE: &str = "100";

impl HttpClient {
    /// List deployments of a target, following every page
    pub async fn list_deployments(
        &self,
        target_arn: &str,
        history_filter: HistoryFilter,
    ) -> Result<Vec<DeploymentSummary>, FleetError> {
        let path = api_path(&["greengrass", "v2", "deployments"]);
        let mut deployments = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("targetArn".to_string(), target_arn.to_string()),
                ("historyFilter".to_string(), history_filter.as_str().to_string()),
                ("maxResults".to_string(), PAGE_SIZE.to_string()),
            ];
            if let Some(token) = next_token.take() {
                query.push(("nextToken".to_string(), token));
            }

            let page: ListDeploymentsResponse = self.get(&path, &query).await?;
            deployments.extend(page.deployments);

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => return Ok(deployments),
            }
        }
    }

    /// Get a deployment by id
    pub async fn get_deployment(&self, deployment_id: &str) -> Result<Deployment, FleetError> {
        let path = api_path(&["greengrass", "v2", "deployments", deployment_id]);
        self.get(&path, &[]).await
    }

    /// Create a deployment (or a new revision of one)
    pub async fn create_deployment(
        &self,
        request: &CreateDeploymentRequest,
    ) -> Result<CreateDeploymentResponse, FleetError> {
        let path = api_path(&["greengrass", "v2", "deployments"]);
        self.post(&path, request).await
    }
}
