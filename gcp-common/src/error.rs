use http::StatusCode;
use thiserror::Error;

/// Enumeration of errors returned by calls to Google Cloud REST APIs.
#[derive(Error, Debug)]
pub enum GcpError {
    #[error("failed to resolve an access token: {0}")]
    AuthError(String),
    #[error("error parsing api url")]
    ParseUrlError(#[from] url::ParseError),
    #[error("request could not be sent: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("api responded with {status}: {body}")]
    StatusError { status: StatusCode, body: String },
    #[error("failed to decode api response: {0}")]
    DecodeError(#[from] serde_json::Error),
}

impl GcpError {
    /// The HTTP status returned by the API, if the request got that far.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GcpError::StatusError { status, .. } => Some(*status),
            GcpError::RequestError(error) => error.status(),
            _ => None,
        }
    }
}

/// Turn a non-2xx response into a `GcpError::StatusError`, keeping the body for diagnostics.
pub(crate) async fn error_for_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, GcpError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // The body is best-effort: losing it should not hide the status.
    let body = response.text().await.unwrap_or_default();

    Err(GcpError::StatusError { status, body })
}
