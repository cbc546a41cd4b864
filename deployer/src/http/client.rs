//! HTTP client implementation

use std::time::Duration;

use chrono::Utc;
use http::Method;
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};
use url::Url;

use crate::authn::sigv4::{canonical_query, uri_encode, SignableRequest, Signer};
use crate::errors::FleetError;
use crate::storage::settings::{Settings, SERVICE_NAME};
use fleet_models::ErrorResponse;

/// Signed HTTP client for the fleet management API
pub struct HttpClient {
    client: Client,
    base_url: String,
    host: String,
    signer: Signer,
}

impl HttpClient {
    /// Resolve credentials and create the client
    pub async fn connect(settings: &Settings) -> Result<Self, FleetError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        let credentials = settings.credentials.resolve(&client).await?;

        Ok(Self {
            base_url: settings.endpoint.as_str().trim_end_matches('/').to_string(),
            host: host_header(&settings.endpoint)?,
            signer: Signer::new(credentials, settings.region.clone(), SERVICE_NAME),
            client,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, FleetError> {
        self.send::<T, ()>(Method::GET, path, query, None).await
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, FleetError> {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<T, FleetError> {
        let payload = match body {
            Some(body) => serde_json::to_vec(body)?,
            None => Vec::new(),
        };

        let query_string = canonical_query(query);
        let url = if query_string.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}?{}", self.base_url, path, query_string)
        };
        debug!("{} {}", method, url);

        let signed = self.signer.sign(
            &SignableRequest {
                method: method.as_str(),
                host: &self.host,
                path,
                query,
                payload: &payload,
            },
            Utc::now(),
        )?;

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(header::AUTHORIZATION, signed.authorization)
            .header("x-amz-date", signed.amz_date);

        if let Some(token) = signed.security_token {
            request = request.header("x-amz-security-token", token);
        }

        if body.is_some() {
            request = request
                .header(header::CONTENT_TYPE, "application/json")
                .body(payload);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_type = response
                .headers()
                .get("x-amzn-errortype")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.split(':').next().unwrap_or(v).to_string())
                .unwrap_or_else(|| "UnknownError".to_string());
            let body = response.text().await.unwrap_or_default();
            error!("HTTP {} {} failed: {} - {}", method, path, status, body);

            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(body);
            return Err(FleetError::ServiceError {
                status: status.as_u16(),
                error_type,
                message,
            });
        }

        let body = response.json().await?;
        Ok(body)
    }
}

/// Build a request path from raw segments, encoding each one
pub fn api_path(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| format!("/{}", uri_encode(s)))
        .collect()
}

fn host_header(endpoint: &Url) -> Result<String, FleetError> {
    let host = endpoint
        .host_str()
        .ok_or_else(|| FleetError::ConfigError(format!("Endpoint {} has no host", endpoint)))?;
    Ok(match endpoint.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
