//! Container credential provider
//!
//! CodeBuild (and ECS) expose the role credentials of a build through a
//! local HTTP endpoint instead of the access key variables. The endpoint is
//! named by `AWS_CONTAINER_CREDENTIALS_RELATIVE_URI` (relative to the link
//! local task metadata host) or `AWS_CONTAINER_CREDENTIALS_FULL_URI`, the
//! latter optionally guarded by an authorization token.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use reqwest::{header, Client};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::authn::credentials::Credentials;
use crate::errors::FleetError;

pub const RELATIVE_URI_ENV: &str = "AWS_CONTAINER_CREDENTIALS_RELATIVE_URI";
pub const FULL_URI_ENV: &str = "AWS_CONTAINER_CREDENTIALS_FULL_URI";
pub const AUTHORIZATION_TOKEN_ENV: &str = "AWS_CONTAINER_AUTHORIZATION_TOKEN";
pub const AUTHORIZATION_TOKEN_FILE_ENV: &str = "AWS_CONTAINER_AUTHORIZATION_TOKEN_FILE";

/// Task metadata host the relative URI is resolved against
pub const CONTAINER_HOST: &str = "http://169.254.170.2";

#[derive(Debug, Clone)]
pub enum AuthorizationToken {
    Value(SecretString),
    /// Re-read on every fetch; the agent rotates it
    File(PathBuf),
}

/// Where to fetch container credentials from
#[derive(Debug, Clone)]
pub struct ContainerEndpoint {
    pub uri: Url,
    pub authorization: Option<AuthorizationToken>,
}

/// Response body of the credentials endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ContainerCredentials {
    access_key_id: String,
    secret_access_key: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    expiration: Option<DateTime<Utc>>,
}

impl ContainerEndpoint {
    /// Endpoint described by the environment, if any. The relative URI wins
    /// when both are set.
    pub fn from_lookup<F>(lookup: &F) -> Result<Option<Self>, FleetError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let uri = match (non_empty(RELATIVE_URI_ENV), non_empty(FULL_URI_ENV)) {
            (Some(relative), _) => format!("{}{}", CONTAINER_HOST, relative),
            (None, Some(full)) => full,
            (None, None) => return Ok(None),
        };
        let uri = Url::parse(&uri).map_err(|e| {
            FleetError::ConfigError(format!("Invalid container credentials URI {}: {}", uri, e))
        })?;

        let authorization = match non_empty(AUTHORIZATION_TOKEN_FILE_ENV) {
            Some(path) => Some(AuthorizationToken::File(PathBuf::from(path))),
            None => non_empty(AUTHORIZATION_TOKEN_ENV)
                .map(|token| AuthorizationToken::Value(SecretString::from(token))),
        };

        Ok(Some(Self { uri, authorization }))
    }

    /// Fetch a fresh set of role credentials
    pub async fn fetch(&self, client: &Client) -> Result<Credentials, FleetError> {
        debug!("Fetching container credentials from {}", self.uri);

        let mut request = client.get(self.uri.clone());
        if let Some(token) = self.authorization_value().await? {
            request = request.header(header::AUTHORIZATION, token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(FleetError::ConfigError(format!(
                "Container credentials endpoint returned {}: {}",
                status,
                String::from_utf8_lossy(&body)
            )));
        }

        parse_credentials(&body)
    }

    async fn authorization_value(&self) -> Result<Option<String>, FleetError> {
        match &self.authorization {
            None => Ok(None),
            Some(AuthorizationToken::Value(token)) => Ok(Some(token.expose_secret().to_string())),
            Some(AuthorizationToken::File(path)) => {
                let token = tokio::fs::read_to_string(path).await?;
                Ok(Some(token.trim().to_string()))
            }
        }
    }
}

fn parse_credentials(body: &[u8]) -> Result<Credentials, FleetError> {
    let parsed: ContainerCredentials = serde_json::from_slice(body).map_err(|e| {
        FleetError::ConfigError(format!("Malformed container credentials: {}", e))
    })?;

    match parsed.expiration {
        Some(expiration) => info!(
            "Using container credentials {} (expire {})",
            parsed.access_key_id, expiration
        ),
        None => info!("Using container credentials {}", parsed.access_key_id),
    }

    let credentials = Credentials::new(parsed.access_key_id, parsed.secret_access_key);
    Ok(match parsed.token {
        Some(token) => credentials.with_session_token(token),
        None => credentials,
    })
}
