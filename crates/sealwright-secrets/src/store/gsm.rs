//! Google Secret Manager store over the v1 REST API

use super::{parse_resource, SecretStore, StoreVersion};
use crate::security::{sanitize_error, SecureString};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::StatusCode;
use sealwright_core::config::StoreConfig;
use sealwright_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use zeroize::Zeroizing;

/// Connection settings for [`GsmStore`]
#[derive(Debug, Clone)]
pub struct GsmConfig {
    /// Base URL, e.g. `https://secretmanager.googleapis.com/v1`
    pub endpoint: String,
    /// OAuth bearer token; requests fail with `Unauthenticated` without one
    pub token: Option<SecureString>,
    pub timeout: Duration,
}

impl GsmConfig {
    /// Build from the configuration file, reading the token from the environment
    pub fn from_store_config(config: &StoreConfig) -> Self {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(SecureString::new);
        if token.is_none() {
            debug!("{} is not set; store requests will be unauthenticated", config.token_env);
        }
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            token,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

pub struct GsmStore {
    client: reqwest::Client,
    config: GsmConfig,
}

#[derive(Serialize, Deserialize)]
struct Payload {
    data: String,
}

#[derive(Deserialize)]
struct AccessResponse {
    payload: Payload,
}

#[derive(Serialize)]
struct AddVersionRequest {
    payload: Payload,
}

#[derive(Deserialize)]
struct VersionResponse {
    name: String,
}

impl GsmStore {
    pub fn new(config: GsmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("sealwright/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::external(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn token(&self) -> Result<&str> {
        self.config
            .token
            .as_ref()
            .map(|t| t.expose())
            .ok_or_else(|| Error::unauthenticated("no access token configured for the secret store"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.endpoint, path)
    }

    async fn send(
        &self,
        resource: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        let token = self.token()?;
        request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::external(sanitize_error(&format!("request for {resource} failed: {e}"))))
    }

    async fn check(resource: &str, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, resource, &body))
    }
}

/// Map a failed HTTP status to an error kind
pub fn status_error(status: StatusCode, resource: &str, body: &str) -> Error {
    let message = sanitize_error(&extract_message(body).unwrap_or_else(|| status.to_string()));
    match status {
        StatusCode::UNAUTHORIZED => Error::unauthenticated(message),
        StatusCode::FORBIDDEN => Error::permission_denied(resource, message),
        StatusCode::NOT_FOUND => Error::not_found(resource.to_string()),
        StatusCode::CONFLICT => Error::already_exists(resource),
        _ => Error::external(format!("secret store returned {status} for {resource}: {message}")),
    }
}

/// Google APIs report `{"error": {"message": ...}}`
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

/// Version number from `projects/p/secrets/s/versions/<n>`
fn version_from_name(name: &str) -> Result<StoreVersion> {
    name.rsplit('/')
        .next()
        .unwrap_or_default()
        .parse()
        .map_err(|_| Error::external(format!("unexpected version name '{name}' from store")))
}

#[async_trait]
impl SecretStore for GsmStore {
    async fn access_version(
        &self,
        resource: &str,
        version: StoreVersion,
    ) -> Result<Zeroizing<Vec<u8>>> {
        parse_resource(resource)?;
        let url = self.url(&format!("{resource}/versions/{version}:access"));
        debug!("Accessing {resource} version {version}");

        let response = self.send(resource, self.client.get(&url)).await?;
        let response = Self::check(&format!("{resource}/versions/{version}"), response).await?;
        let body: AccessResponse = response
            .json()
            .await
            .map_err(|e| Error::external(format!("invalid access response for {resource}: {e}")))?;

        let data = Zeroizing::new(body.payload.data);
        BASE64
            .decode(data.as_bytes())
            .map(Zeroizing::new)
            .map_err(|e| Error::external(format!("payload of {resource} is not base64: {e}")))
    }

    async fn add_version(&self, resource: &str, payload: &[u8]) -> Result<StoreVersion> {
        parse_resource(resource)?;
        let url = self.url(&format!("{resource}:addVersion"));
        let request = AddVersionRequest {
            payload: Payload {
                data: BASE64.encode(payload),
            },
        };

        let response = self
            .send(resource, self.client.post(&url).json(&request))
            .await?;
        let response = Self::check(resource, response).await?;
        let body: VersionResponse = response
            .json()
            .await
            .map_err(|e| Error::external(format!("invalid addVersion response for {resource}: {e}")))?;

        let version = version_from_name(&body.name)?;
        debug!("Added version {version} to {resource}");
        Ok(version)
    }

    async fn create_secret(&self, resource: &str, payload: &[u8]) -> Result<StoreVersion> {
        let (project, secret) = parse_resource(resource)?;
        let url = self.url(&format!("projects/{project}/secrets"));
        let body = serde_json::json!({ "replication": { "automatic": {} } });

        let response = self
            .send(
                resource,
                self.client
                    .post(&url)
                    .query(&[("secretId", secret)])
                    .json(&body),
            )
            .await?;
        Self::check(resource, response).await?;
        debug!("Created secret {resource}");

        self.add_version(resource, payload).await
    }

    async fn secret_exists(&self, resource: &str) -> Result<bool> {
        parse_resource(resource)?;
        let response = self.send(resource, self.client.get(self.url(resource))).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check(resource, response).await.map(|_| true)
    }

    fn name(&self) -> &'static str {
        "gsm"
    }
}
