use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use tracing::debug;

use crate::error::{error_for_status, GcpError};

pub const DEFAULT_METADATA_URL: &str = "http://metadata.google.internal";

const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Resolves the bearer token attached to every outbound API request.
#[async_trait]
pub trait TokenSource {
    async fn access_token(&self) -> Result<String, GcpError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    expires_in: Option<u64>,
    #[allow(dead_code)]
    token_type: Option<String>,
}

/// Fetches the default service account token from the metadata server available to
/// Compute Engine and Cloud Functions workloads.
pub struct MetadataTokenSource {
    client: reqwest::Client,
    base_url: String,
}

impl MetadataTokenSource {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl TokenSource for MetadataTokenSource {
    async fn access_token(&self) -> Result<String, GcpError> {
        let url: reqwest::Url = format!("{}{}", self.base_url, TOKEN_PATH).parse()?;
        debug!("requesting access token from {}", url);

        let response = self
            .client
            .get(url)
            .header("Metadata-Flavor", "Google")
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| GcpError::AuthError(error.to_string()))?;

        let response = error_for_status(response)
            .await
            .map_err(|error| GcpError::AuthError(error.to_string()))?;

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|error| GcpError::AuthError(error.to_string()))?;

        if token.access_token.is_empty() {
            return Err(GcpError::AuthError(
                "metadata server returned an empty token".to_owned(),
            ));
        }

        Ok(token.access_token)
    }
}

/// A fixed token, e.g. the output of `gcloud auth print-access-token` when running locally.
#[derive(Clone)]
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_owned(),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<String, GcpError> {
        Ok(self.token.clone())
    }
}
