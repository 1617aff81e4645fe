use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::TokenSource;
use crate::error::{error_for_status, GcpError};

pub const DEFAULT_MONITORING_URL: &str = "https://monitoring.googleapis.com";

/// A `timeSeries.list` request scoped to a single project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSeriesQuery {
    pub project: String,
    pub filter: String,
    /// ISO-8601 UTC instant.
    pub start_time: String,
    /// ISO-8601 UTC instant.
    pub end_time: String,
}

/// One series returned by the Monitoring API. Kept opaque: callers only care whether any
/// series came back at all.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TimeSeries(pub serde_json::Value);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTimeSeriesResponse {
    // The API omits the field entirely when nothing matched.
    #[serde(default)]
    time_series: Vec<TimeSeries>,
}

/// A queryable store of time series data points.
#[async_trait]
pub trait TimeSeriesSource {
    async fn list_time_series(
        &self,
        query: &TimeSeriesQuery,
    ) -> Result<Vec<TimeSeries>, GcpError>;
}

/// Cloud Monitoring v3 client.
pub struct MonitoringClient {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenSource + Send + Sync>,
}

impl MonitoringClient {
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

    fn list_url(&self, project: &str) -> Result<reqwest::Url, GcpError> {
        let url = format!("{}/v3/projects/{}/timeSeries", self.base_url, project).parse()?;

        Ok(url)
    }
}

#[async_trait]
impl TimeSeriesSource for MonitoringClient {
    async fn list_time_series(
        &self,
        query: &TimeSeriesQuery,
    ) -> Result<Vec<TimeSeries>, GcpError> {
        let url = self.list_url(&query.project)?;
        let token = self.tokens.access_token().await?;
        debug!("listing time series from {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .query(&[
                ("filter", query.filter.as_str()),
                ("interval.startTime", query.start_time.as_str()),
                ("interval.endTime", query.end_time.as_str()),
            ])
            .send()
            .await?;

        let body = error_for_status(response).await?.bytes().await?;
        let parsed: ListTimeSeriesResponse = serde_json::from_slice(&body)?;

        Ok(parsed.time_series)
    }
}
