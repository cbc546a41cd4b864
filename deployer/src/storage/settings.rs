//! Environment-driven settings

use secrecy::SecretString;
use url::Url;

use crate::authn::container::ContainerEndpoint;
use crate::authn::credentials::{CredentialSource, Credentials};
use crate::errors::FleetError;

pub const DEFAULT_REGION: &str = "us-west-2";
pub const SERVICE_NAME: &str = "greengrass";

/// Service connection settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Region the fleet lives in
    pub region: String,

    /// API endpoint, derived from the region unless overridden
    pub endpoint: Url,

    /// Where request signing credentials come from
    pub credentials: CredentialSource,
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self, FleetError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, FleetError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let region = region_from_lookup(&lookup);

        let endpoint = match non_empty("GREENGRASS_ENDPOINT") {
            Some(endpoint) => endpoint,
            None => default_endpoint(&region),
        };
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| FleetError::ConfigError(format!("Invalid endpoint {}: {}", endpoint, e)))?;
        if endpoint.host_str().is_none() {
            return Err(FleetError::ConfigError(format!(
                "Endpoint {} has no host",
                endpoint
            )));
        }

        let credentials = credentials_from_lookup(&lookup)?;

        Ok(Self {
            region,
            endpoint,
            credentials,
        })
    }
}

/// `AWS_REGION`, then `AWS_DEFAULT_REGION`, then the default. Blank values
/// count as unset.
pub fn region_from_lookup<F>(lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ["AWS_REGION", "AWS_DEFAULT_REGION"]
        .iter()
        .filter_map(|key| lookup(key))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}

/// Access keys from the environment, else the container credentials
/// endpoint a CodeBuild project provides
fn credentials_from_lookup<F>(lookup: &F) -> Result<CredentialSource, FleetError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(access_key_id) = non_empty("AWS_ACCESS_KEY_ID") {
        let secret_access_key = non_empty("AWS_SECRET_ACCESS_KEY").ok_or_else(|| {
            FleetError::ConfigError("AWS_SECRET_ACCESS_KEY is not set".to_string())
        })?;
        let credentials = Credentials {
            access_key_id,
            secret_access_key: SecretString::from(secret_access_key),
            session_token: non_empty("AWS_SESSION_TOKEN").map(SecretString::from),
        };
        return Ok(CredentialSource::Static(credentials));
    }

    match ContainerEndpoint::from_lookup(lookup)? {
        Some(endpoint) => Ok(CredentialSource::Container(endpoint)),
        None => Err(FleetError::ConfigError(
            "No credentials: set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY, \
             or run where AWS_CONTAINER_CREDENTIALS_RELATIVE_URI is provided"
                .to_string(),
        )),
    }
}

fn default_endpoint(region: &str) -> String {
    format!("https://{}.{}.amazonaws.com", SERVICE_NAME, region)
}
