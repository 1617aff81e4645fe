use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gcp_common::error::GcpError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CHECKED_MESSAGE: &str = "Checked instance activity";

/// Body returned for every completed check. It is the same whether or not the instance was
/// stopped.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CheckResponse {
    pub message: String,
    pub status: u16,
}

impl CheckResponse {
    pub fn checked() -> Self {
        Self {
            message: CHECKED_MESSAGE.to_owned(),
            status: StatusCode::OK.as_u16(),
        }
    }
}

/// A check aborted at one of its two external calls. Nothing is retried.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("failed to query instance activity: {0}")]
    QueryError(#[source] GcpError),
    #[error("failed to stop idle instance: {0}")]
    StopError(#[source] GcpError),
}

impl CheckError {
    /// Which step of the check failed, used as a metrics label.
    pub fn step(&self) -> &'static str {
        match self {
            CheckError::QueryError(_) => "query",
            CheckError::StopError(_) => "stop",
        }
    }
}

impl IntoResponse for CheckError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
