use std::sync::Arc;
use std::time::Instant;

use gcp_common::compute::{InstanceLifecycle, InstanceRef, Operation};
use gcp_common::monitoring::{TimeSeriesQuery, TimeSeriesSource};
use tracing::{error, info, warn};

use crate::api::CheckError;
use crate::metrics_constants::*;
use crate::time::TimeSource;
use crate::window::{build_filter, ActivityWindow};

pub struct DetectorSettings {
    pub metric_name: String,
    pub instance: InstanceRef,
}

/// What a successful check found. Only used for logs, metrics and tests: callers over HTTP
/// always get the same response.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// The metric reported points inside the window, nothing was done.
    Active { series: usize },
    /// No points in the window, a stop was requested.
    Stopped { operation: Operation },
}

/// Decides whether the configured instance has been idle over the last
/// `IDLE_WINDOW_MINUTES`, and stops it if so.
///
/// There is no state between checks: every call computes a fresh window, queries once and
/// acts on that single answer. Overlapping calls are not coordinated.
pub struct IdleDetector {
    settings: DetectorSettings,
    series_source: Arc<dyn TimeSeriesSource + Send + Sync>,
    lifecycle: Arc<dyn InstanceLifecycle + Send + Sync>,
    timesource: Arc<dyn TimeSource + Send + Sync>,
    metrics_labels: Vec<(String, String)>,
}

impl IdleDetector {
    pub fn new(
        settings: DetectorSettings,
        series_source: Arc<dyn TimeSeriesSource + Send + Sync>,
        lifecycle: Arc<dyn InstanceLifecycle + Send + Sync>,
        timesource: Arc<dyn TimeSource + Send + Sync>,
    ) -> Self {
        let metrics_labels = vec![("instance".to_owned(), settings.instance.instance.clone())];

        Self {
            settings,
            series_source,
            lifecycle,
            timesource,
            metrics_labels,
        }
    }

    pub fn instance(&self) -> &InstanceRef {
        &self.settings.instance
    }

    /// Build the monitoring query for `window`.
    pub fn query_for(&self, window: &ActivityWindow) -> TimeSeriesQuery {
        let start_time = window.start_time();
        let filter = build_filter(
            &self.settings.metric_name,
            &self.settings.instance.instance,
            &start_time,
        );

        TimeSeriesQuery {
            project: self.settings.instance.project.clone(),
            filter,
            start_time,
            end_time: window.end_time(),
        }
    }

    /// Query the activity metric over the trailing window and stop the instance when it
    /// reported nothing.
    #[tracing::instrument(skip_all, fields(instance = %self.settings.instance))]
    pub async fn check_activity(&self) -> Result<CheckOutcome, CheckError> {
        metrics::counter!(CHECK_STARTS, &self.metrics_labels).increment(1);

        let window = ActivityWindow::ending_at(self.timesource.current_time());
        let query = self.query_for(&window);

        let query_start = Instant::now();
        let series = self
            .series_source
            .list_time_series(&query)
            .await
            .map_err(|e| self.failed(CheckError::QueryError(e)))?;
        metrics::histogram!(QUERY_TIME, &self.metrics_labels)
            .record(query_start.elapsed().as_secs_f64());

        info!(
            start = %query.start_time,
            end = %query.end_time,
            series = series.len(),
            "checked instance activity"
        );

        if !series.is_empty() {
            metrics::counter!(CHECK_ACTIVE, &self.metrics_labels).increment(1);
            return Ok(CheckOutcome::Active {
                series: series.len(),
            });
        }

        warn!(
            "no activity reported since {}, stopping {}",
            query.start_time, self.settings.instance
        );
        let operation = self.stop_resource().await?;

        Ok(CheckOutcome::Stopped { operation })
    }

    /// Issue a single stop request for the configured instance.
    pub async fn stop_resource(&self) -> Result<Operation, CheckError> {
        let operation = self
            .lifecycle
            .stop(&self.settings.instance)
            .await
            .map_err(|e| self.failed(CheckError::StopError(e)))?;

        metrics::counter!(STOPS, &self.metrics_labels).increment(1);
        info!(
            operation = operation.name.as_deref().unwrap_or_default(),
            status = operation.status.as_deref().unwrap_or_default(),
            "stop requested for {}",
            self.settings.instance
        );

        Ok(operation)
    }

    fn failed(&self, error: CheckError) -> CheckError {
        let mut labels = self.metrics_labels.clone();
        labels.push(("step".to_owned(), error.step().to_owned()));
        metrics::counter!(CHECK_FAILURES, &labels).increment(1);

        error!("{}", error);
        error
    }
}
