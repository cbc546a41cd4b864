//! Signing credentials

use reqwest::Client;
use secrecy::SecretString;

use crate::authn::container::ContainerEndpoint;
use crate::errors::FleetError;

/// Access key pair plus optional session token
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: SecretString,
    pub session_token: Option<SecretString>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: SecretString::from(secret_access_key.into()),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(SecretString::from(token.into()));
        self
    }
}

/// Where signing credentials come from
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Access keys given in the environment
    Static(Credentials),
    /// Role credentials served to a CodeBuild or ECS container
    Container(ContainerEndpoint),
}

impl CredentialSource {
    pub async fn resolve(&self, client: &Client) -> Result<Credentials, FleetError> {
        match self {
            CredentialSource::Static(credentials) => Ok(credentials.clone()),
            CredentialSource::Container(endpoint) => endpoint.fetch(client).await,
        }
    }
}
