//! Component registry checks and publishing

use std::collections::BTreeMap;
use std::path::Path;

use base64::prelude::*;
use fleet_models::{ComponentScope, CreateComponentVersionRequest, CreateComponentVersionResponse};
use tracing::{debug, info};

use crate::deploy::api::FleetApi;
use crate::errors::FleetError;
use crate::filesys::file::File;
use crate::storage::params::CustomComponent;
use crate::utils::generate_uuid;

/// A custom component with its recipe loaded from disk
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedComponent {
    pub spec: CustomComponent,
    pub recipe: Vec<u8>,
}

impl PreparedComponent {
    /// Read the component's recipe. A missing recipe is a configuration error.
    pub async fn load(spec: &CustomComponent, base_dir: &Path) -> Result<Self, FleetError> {
        let file = File::new(spec.recipe_path(base_dir));
        file.assert_exists().await?;
        let recipe = file.read_bytes().await?;
        check_recipe_identity(spec, &recipe)?;

        Ok(Self {
            spec: spec.clone(),
            recipe,
        })
    }

    pub fn name(&self) -> &str {
        &self.spec.component_name
    }

    pub fn version(&self) -> &str {
        &self.spec.component_version
    }
}

/// JSON recipes must name the same component and version as the parameter
/// file. YAML recipes are passed through unchecked.
fn check_recipe_identity(spec: &CustomComponent, recipe: &[u8]) -> Result<(), FleetError> {
    let Ok(serde_json::Value::Object(fields)) = serde_json::from_slice::<serde_json::Value>(recipe)
    else {
        return Ok(());
    };

    let field = |key: &str| fields.get(key).and_then(|v| v.as_str());
    if let Some(name) = field("ComponentName") {
        if name != spec.component_name {
            return Err(FleetError::ConfigError(format!(
                "Recipe names component {} but parameters declare {}",
                name, spec.component_name
            )));
        }
    }
    if let Some(version) = field("ComponentVersion") {
        if version != spec.component_version {
            return Err(FleetError::ConfigError(format!(
                "Recipe for {} has version {} but parameters declare {}",
                spec.component_name, version, spec.component_version
            )));
        }
    }
    Ok(())
}

/// Whether `name` is registered at exactly `version`.
///
/// The component is found by name in the private listing and only the
/// versions published under that entry are compared; older lineages of the
/// same name are not searched.
pub async fn component_version_exists(
    api: &dyn FleetApi,
    name: &str,
    version: &str,
) -> Result<bool, FleetError> {
    let components = api
        .list_components(ComponentScope::Private)
        .await
        .map_err(|e| FleetError::RegistryError(format!("Unable to list components: {}", e)))?;

    let Some(component) = components.into_iter().find(|c| c.component_name == name) else {
        debug!("Component {} is not registered", name);
        return Ok(false);
    };

    let versions = api
        .list_component_versions(&component.arn)
        .await
        .map_err(|e| {
            FleetError::RegistryError(format!("Unable to list versions of {}: {}", name, e))
        })?;

    let exists = versions.iter().any(|v| v.component_version == version);
    debug!("Component {} version {} registered: {}", name, version, exists);
    Ok(exists)
}

/// Publish a new component version from its recipe
pub async fn publish_component(
    api: &dyn FleetApi,
    component: &PreparedComponent,
) -> Result<CreateComponentVersionResponse, FleetError> {
    info!(
        "Publishing component {} version {}",
        component.name(),
        component.version()
    );

    let request = CreateComponentVersionRequest {
        inline_recipe: BASE64_STANDARD.encode(&component.recipe),
        tags: component.spec.tags.clone(),
        client_token: Some(generate_uuid()),
    };
    let response = api.create_component_version(&request).await?;

    if response.status.is_failed() {
        let mut errors = response.status.errors.clone();
        if errors.is_empty() {
            let message = response
                .status
                .message
                .clone()
                .unwrap_or_else(|| "component state FAILED".to_string());
            errors = BTreeMap::from([("message".to_string(), message)]);
        }
        return Err(FleetError::ComponentPublishError {
            component: format!("{}-{}", component.name(), component.version()),
            errors,
        });
    }

    Ok(response)
}

/// Register the component unless that exact version already exists
pub async fn ensure_component(api: &dyn FleetApi, component: &PreparedComponent) -> Result<(), FleetError> {
    if component_version_exists(api, component.name(), component.version()).await? {
        info!(
            "Component {} version {} already registered",
            component.name(),
            component.version()
        );
        return Ok(());
    }
    publish_component(api, component).await?;
    Ok(())
}
