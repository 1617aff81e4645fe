use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::debug;

use crate::api::{CheckError, CheckResponse};
use crate::detector::IdleDetector;

/// Run one check. The request itself carries nothing we look at.
pub async fn check(
    State(detector): State<Arc<IdleDetector>>,
) -> Result<Json<CheckResponse>, CheckError> {
    let outcome = detector.check_activity().await?;
    debug!("check finished with {:?}", outcome);

    Ok(Json(CheckResponse::checked()))
}
