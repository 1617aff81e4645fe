use std::sync::Arc;

use axum::{routing, Router};
use gcp_common::metrics::setup_metrics_routes;
use metrics_exporter_prometheus::PrometheusHandle;

use super::check;
use crate::detector::IdleDetector;

pub fn app(detector: Arc<IdleDetector>, metrics: Option<PrometheusHandle>) -> Router {
    let router = Router::new()
        .route("/", routing::get(index))
        .route("/_readiness", routing::get(index))
        .route("/_liveness", routing::get(index))
        .route("/check", routing::get(check::check).post(check::check))
        .with_state(detector);

    // Installing the recorder touches global state, so tests run without it
    match metrics {
        Some(recorder_handle) => setup_metrics_routes(router, recorder_handle),
        None => router,
    }
}

pub async fn index() -> &'static str {
    "idle-janitor"
}
