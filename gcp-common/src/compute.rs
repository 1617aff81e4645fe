use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::TokenSource;
use crate::error::{error_for_status, GcpError};

pub const DEFAULT_COMPUTE_URL: &str = "https://compute.googleapis.com";

/// Identifies a Compute Engine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRef {
    pub project: String,
    pub zone: String,
    pub instance: String,
}

impl fmt::Display for InstanceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "projects/{}/zones/{}/instances/{}",
            self.project, self.zone, self.instance
        )
    }
}

/// The acknowledgement returned by a lifecycle request. Only a handful of fields are named,
/// everything else the API sends is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub operation_type: Option<String>,
    pub target_link: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Transitions compute instances between running and stopped.
#[async_trait]
pub trait InstanceLifecycle {
    async fn stop(&self, instance: &InstanceRef) -> Result<Operation, GcpError>;
}

/// Compute Engine v1 client.
pub struct ComputeClient {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenSource + Send + Sync>,
}

impl ComputeClient {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        tokens: Arc<dyn TokenSource + Send + Sync>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            tokens,
        }
    }

    fn instance_url(
        &self,
        instance: &InstanceRef,
        action: &str,
    ) -> Result<reqwest::Url, GcpError> {
        let url = format!("{}/compute/v1/{}/{}", self.base_url, instance, action).parse()?;

        Ok(url)
    }
}

#[async_trait]
impl InstanceLifecycle for ComputeClient {
    async fn stop(&self, instance: &InstanceRef) -> Result<Operation, GcpError> {
        let url = self.instance_url(instance, "stop")?;
        let token = self.tokens.access_token().await?;
        debug!("requesting stop at {}", url);

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_LENGTH, "0")
            .send()
            .await?;

        let body = error_for_status(response).await?.bytes().await?;
        let operation: Operation = serde_json::from_slice(&body)?;

        Ok(operation)
    }
}
