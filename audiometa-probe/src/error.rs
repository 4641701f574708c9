//! Error types for audiometa-probe
//!
//! Probing-phase failures are plain values ([`AnalysisError`]) returned up the
//! invoker -> normalizer -> handler chain. [`ApiError`] is the only place that
//! decides an HTTP status.

use std::any::Any;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error};

use crate::response::ErrorEnvelope;

/// Failure while probing a file or normalizing the probe output
///
/// The `Display` text is what the client sees in the error envelope.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Probe binary could not be located
    #[error("Probe tool '{0}' not found. Make sure FFmpeg is installed and on the system PATH.")]
    ToolNotFound(String),

    /// Probe process could not be started or exited non-zero
    #[error("Failed to run probe tool: {0}")]
    InvocationFailed(String),

    /// Probe stdout was not the expected JSON document
    #[error("Failed to parse probe JSON output: {0}")]
    MalformedOutput(String),

    /// No stream with codec type "audio"
    #[error("No audio stream found in file.")]
    NoAudioStream,
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid request parameter (400)
    #[error("{0}")]
    BadRequest(String),

    /// File absent at check time (404)
    #[error("{0}")]
    NotFound(String),

    /// Anything other than GET (405)
    #[error("Method {0} not supported. Use GET.")]
    MethodNotAllowed(String),

    /// Probe or normalization failure (500)
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Panic or runtime failure inside the request (500)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Analysis(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), "Internal error: {}", message);
        } else {
            debug!(status = status.as_u16(), "Request rejected: {}", message);
        }

        let mut response = ErrorEnvelope::new(message).with_status(status);
        if status == StatusCode::METHOD_NOT_ALLOWED {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("GET"));
        }
        response
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Response for a panic that escaped a handler (tower-http `CatchPanicLayer`)
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    ApiError::Internal(format!("Internal error: {}", panic_message(payload.as_ref())))
        .into_response()
}
