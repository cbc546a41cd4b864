//! Component registry API client

use fleet_models::{
    Component, ComponentScope, ComponentVersionListItem, CreateComponentVersionRequest,
    CreateComponentVersionResponse, ListComponentVersionsResponse, ListComponentsResponse,
};

use crate::errors::FleetError;
use crate::http::client::{api_path, HttpClient};

impl HttpClient {
    /// List registered components, following every page
    pub async fn list_components(&self, scope: ComponentScope) -> Result<Vec<Component>, FleetError> {
        let path = api_path(&["greengrass", "v2", "components"]);
        let mut components = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut query = vec![("scope".to_string(), scope.as_str().to_string())];
            if let Some(token) = next_token.take() {
                query.push(("nextToken".to_string(), token));
            }

            let page: ListComponentsResponse = self.get(&path, &query).await?;
            components.extend(page.components);

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => return Ok(components),
            }
        }
    }

    /// List the published versions of a component
    pub async fn list_component_versions(
        &self,
        component_arn: &str,
    ) -> Result<Vec<ComponentVersionListItem>, FleetError> {
        let path = api_path(&["greengrass", "v2", "components", component_arn, "versions"]);
        let mut versions = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut query = Vec::new();
            if let Some(token) = next_token.take() {
                query.push(("nextToken".to_string(), token));
            }

            let page: ListComponentVersionsResponse = self.get(&path, &query).await?;
            versions.extend(page.component_versions);

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => return Ok(versions),
            }
        }
    }

    /// Publish a component version from an inline recipe
    pub async fn create_component_version(
        &self,
        request: &CreateComponentVersionRequest,
    ) -> Result<CreateComponentVersionResponse, FleetError> {
        let path = api_path(&["greengrass", "v2", "createComponentVersion"]);
        self.post(&path, request).await
    }
}
