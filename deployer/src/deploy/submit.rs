//! Deployment submission

use fleet_models::{CreateDeploymentRequest, Deployment};
use tracing::info;

use crate::deploy::api::FleetApi;
use crate::errors::FleetError;
use crate::filesys::file::File;
use crate::utils::generate_uuid;

/// Submit the configuration and return the service-assigned deployment id.
/// Rejections are returned as the service reported them.
pub async fn submit_deployment(
    api: &dyn FleetApi,
    config: &CreateDeploymentRequest,
) -> Result<String, FleetError> {
    let mut request = config.clone();
    request.client_token = Some(generate_uuid());

    let response = api.create_deployment(&request).await?;
    let deployment_id = response.deployment_id.ok_or_else(|| {
        FleetError::Internal(format!(
            "Deployment {} was accepted without a deployment id",
            config.deployment_name
        ))
    })?;

    info!(
        "Created deployment {} (job {})",
        deployment_id,
        response.iot_job_id.as_deref().unwrap_or("-")
    );
    Ok(deployment_id)
}

/// Fetch the submitted deployment and record it for audit
pub async fn snapshot_deployment(
    api: &dyn FleetApi,
    deployment_id: &str,
    file: &File,
) -> Result<Deployment, FleetError> {
    let deployment = api.get_deployment(deployment_id).await?;
    file.write_json(&deployment).await?;
    info!("Deployment snapshot written to {}", file.path().display());
    Ok(deployment)
}
