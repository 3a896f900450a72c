// API client module: a small blocking HTTP client for the Firebase Rules
// API. One call is made per run, so there is no connection reuse to manage.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{DeployError, Result};
use crate::rules::DeploymentRequest;

/// Production endpoint of the Firebase Rules API.
pub const DEFAULT_ENDPOINT: &str = "https://firebaserules.googleapis.com";

/// Release resource returned by the rules API. `name` and `ruleset_name`
/// are printed; the timestamps only show up in `--verbose` logs.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ruleset_name: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

/// Sends a release request on behalf of the pipeline.
pub trait ReleaseTransport {
    fn create_release(&self, request: &DeploymentRequest, token: &str) -> Result<Release>;

    /// URL the request for `project_id` is sent to.
    fn release_url(&self, project_id: &str) -> String;
}

/// Blocking reqwest client bound to one API endpoint.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for `base_url`. Without `timeout` requests may block
    /// indefinitely; reqwest's 30s default is switched off explicitly.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeployError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Authorization and content-type headers for one request.
    fn headers(&self, token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            DeployError::Credential("access token contains invalid header characters".to_string())
        })?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

impl ReleaseTransport for ApiClient {
    fn release_url(&self, project_id: &str) -> String {
        format!("{}/v1/projects/{}/releases", self.base_url, project_id)
    }

    /// POST the payload. Non-2xx answers become `Deployment` errors with the
    /// raw body; anything that prevents reading a JSON answer is `Transport`.
    fn create_release(&self, request: &DeploymentRequest, token: &str) -> Result<Release> {
        let url = self.release_url(&request.project_id);
        let body = serde_json::to_vec(&request.payload)
            .map_err(|e| DeployError::Transport(format!("failed to encode payload: {e}")))?;
        info!(%url, bytes = body.len(), "posting release");

        let res = self
            .client
            .post(&url)
            .headers(self.headers(token)?)
            .body(body)
            .send()
            .map_err(|e| DeployError::Transport(e.to_string()))?;

        let status = res.status();
        debug!(status = status.as_u16(), "rules API responded");
        if !status.is_success() {
            let body = res.text().unwrap_or_default();
            return Err(DeployError::Deployment {
                status: status.as_u16(),
                body,
            });
        }

        let text = res
            .text()
            .map_err(|e| DeployError::Transport(format!("failed to read response: {e}")))?;
        serde_json::from_str(&text)
            .map_err(|e| DeployError::Transport(format!("invalid JSON in response: {e}")))
    }
}
