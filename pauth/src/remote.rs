//! Remote authentication transport trait and reqwest-based HTTP implementation.

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use pcommon::BoxFuture;

use crate::{AuthConfig, AuthError, DEFAULT_REMOTE_TIMEOUT, SecretString};

/// Body posted to `<endpoint>/{device_id}`.
///
/// The duplicated username under `x-device-api-key` mirrors what the
/// authentication service expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteAuthRequest {
    #[serde(skip)]
    pub device_id: String,
    pub username: String,
    #[serde(rename = "x-device-api-key")]
    pub device_api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_transcripts: Option<Vec<Value>>,
}

impl RemoteAuthRequest {
    pub fn new(device_id: impl Into<String>, participant_name: impl Into<String>) -> Self {
        let participant_name = participant_name.into();
        Self {
            device_id: device_id.into(),
            username: participant_name.clone(),
            device_api_key: participant_name,
            assistant_name: None,
            session_instructions: None,
            initial_transcripts: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RemoteAuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub livekit_token: Option<String>,
    #[serde(default)]
    pub room_name: Option<String>,
    #[serde(default)]
    pub livekit_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

pub trait RemoteAuthenticator: Send + Sync + std::fmt::Debug {
    fn authenticate<'a>(
        &'a self,
        request: &'a RemoteAuthRequest,
    ) -> BoxFuture<'a, Result<RemoteAuthResponse, AuthError>>;
}

#[derive(Debug, Clone)]
pub struct HttpRemoteAuthenticator {
    client: Client,
    endpoint: String,
    api_key: Option<SecretString>,
}

impl HttpRemoteAuthenticator {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, AuthError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_REMOTE_TIMEOUT)
            .timeout(DEFAULT_REMOTE_TIMEOUT)
            .build()
            .map_err(|err| AuthError::configuration(format!("cannot build HTTP client: {err}")))?;

        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: None,
        }
    }

    /// `None` when no endpoint is configured.
    pub fn from_config(config: &AuthConfig) -> Result<Option<Self>, AuthError> {
        let Some(endpoint) = &config.endpoint else {
            return Ok(None);
        };

        let client = Client::builder()
            .connect_timeout(config.remote_timeout)
            .timeout(config.remote_timeout)
            .build()
            .map_err(|err| AuthError::configuration(format!("cannot build HTTP client: {err}")))?;

        let mut authenticator = Self::with_client(client, endpoint.clone());
        authenticator.api_key = config.api_key.clone();
        Ok(Some(authenticator))
    }

    pub fn with_api_key(mut self, api_key: impl Into<SecretString>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn endpoint_for(&self, device_id: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), device_id)
    }

    async fn parse_error(response: Response) -> AuthError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<RemoteAuthResponse>(&body)
            .ok()
            .and_then(|parsed| parsed.error)
            .unwrap_or_else(|| format!("authentication request failed with status {status}"));

        AuthError::remote(detail)
    }
}

impl RemoteAuthenticator for HttpRemoteAuthenticator {
    fn authenticate<'a>(
        &'a self,
        request: &'a RemoteAuthRequest,
    ) -> BoxFuture<'a, Result<RemoteAuthResponse, AuthError>> {
        Box::pin(async move {
            let mut builder = self
                .client
                .post(self.endpoint_for(&request.device_id))
                .json(request);
            if let Some(api_key) = &self.api_key {
                builder = builder.header("x-api-key", api_key.expose());
            }

            let response = builder.send().await.map_err(|err| {
                if err.is_timeout() {
                    AuthError::remote(format!("authentication request timed out: {err}"))
                } else {
                    AuthError::remote(format!("authentication request failed: {err}"))
                }
            })?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            response
                .json::<RemoteAuthResponse>()
                .await
                .map_err(|err| AuthError::remote(format!("malformed authentication response: {err}")))
        })
    }
}
