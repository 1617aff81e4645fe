use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use gcp_common::compute::{InstanceLifecycle, InstanceRef, Operation};
use gcp_common::error::GcpError;
use gcp_common::monitoring::{TimeSeries, TimeSeriesQuery, TimeSeriesSource};
use serde_json::json;

use crate::detector::{DetectorSettings, IdleDetector};
use crate::time::FixedTime;

pub fn fixed_time(iso: &str) -> FixedTime {
    let time = DateTime::parse_from_rfc3339(iso)
        .expect("invalid test timestamp")
        .with_timezone(&Utc);

    FixedTime { time }
}

pub fn series() -> TimeSeries {
    TimeSeries(json!({
        "metric": { "type": "logging.googleapis.com/user/cpu_ping" },
        "points": [{ "value": { "int64Value": "1" } }]
    }))
}

pub fn settings() -> DetectorSettings {
    DetectorSettings {
        metric_name: "cpu_ping".to_owned(),
        instance: InstanceRef {
            project: "my-project".to_owned(),
            zone: "us-central1-a".to_owned(),
            instance: "vm-1".to_owned(),
        },
    }
}

pub fn detector_with(
    source: MockTimeSeriesSource,
    lifecycle: MockInstanceLifecycle,
    time: FixedTime,
) -> IdleDetector {
    IdleDetector::new(
        settings(),
        Arc::new(source),
        Arc::new(lifecycle),
        Arc::new(time),
    )
}

/// Records every query and answers with a canned result.
#[derive(Clone)]
pub struct MockTimeSeriesSource {
    series: Vec<TimeSeries>,
    fail_with: Option<StatusCode>,
    queries: Arc<Mutex<Vec<TimeSeriesQuery>>>,
}

impl MockTimeSeriesSource {
    pub fn returning(series: Vec<TimeSeries>) -> Self {
        Self {
            series,
            fail_with: None,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(status: StatusCode) -> Self {
        Self {
            fail_with: Some(status),
            ..Self::returning(Vec::new())
        }
    }

    pub fn queries(&self) -> Vec<TimeSeriesQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl TimeSeriesSource for MockTimeSeriesSource {
    async fn list_time_series(
        &self,
        query: &TimeSeriesQuery,
    ) -> Result<Vec<TimeSeries>, GcpError> {
        self.queries.lock().unwrap().push(query.clone());

        match self.fail_with {
            Some(status) => Err(GcpError::StatusError {
                status,
                body: "mock query failure".to_owned(),
            }),
            None => Ok(self.series.clone()),
        }
    }
}

/// Records every stop request.
#[derive(Clone)]
pub struct MockInstanceLifecycle {
    fail_with: Option<StatusCode>,
    calls: Arc<Mutex<Vec<InstanceRef>>>,
}

impl MockInstanceLifecycle {
    pub fn new() -> Self {
        Self {
            fail_with: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(status: StatusCode) -> Self {
        Self {
            fail_with: Some(status),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<InstanceRef> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockInstanceLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InstanceLifecycle for MockInstanceLifecycle {
    async fn stop(&self, instance: &InstanceRef) -> Result<Operation, GcpError> {
        self.calls.lock().unwrap().push(instance.clone());

        match self.fail_with {
            Some(status) => Err(GcpError::StatusError {
                status,
                body: "mock stop failure".to_owned(),
            }),
            None => Ok(Operation {
                name: Some("operation-1".to_owned()),
                status: Some("RUNNING".to_owned()),
                operation_type: Some("stop".to_owned()),
                ..Default::default()
            }),
        }
    }
}
