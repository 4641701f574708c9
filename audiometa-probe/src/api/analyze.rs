//! Audio analysis endpoint
//!
//! `GET /analyze?f=<path>`
//!
//! Per request: method check, parameter check, admission, existence check,
//! probe + normalize on the blocking pool, response. The admission token is
//! moved into the blocking task, so the slot stays held until the subprocess
//! is done even if the client has gone away, and is returned on every exit
//! path including a panic inside the task.
//!
//! The existence check and the probe are not atomic: a file removed in
//! between surfaces as a probe failure (500), not a 404.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::Method,
    routing::any,
    Router,
};
use tracing::{debug, info};

use crate::{
    error::{panic_message, ApiError, ApiResult},
    normalize::{analyze_file, AudioMetadata},
    response::SuccessEnvelope,
    AppState,
};

/// Name of the file path query parameter
pub const FILE_PARAM: &str = "f";

/// Value of the first `f`, empty counting as absent; later repeats are ignored
fn file_param(pairs: Vec<(String, String)>) -> Option<PathBuf> {
    pairs
        .into_iter()
        .find(|(key, _)| key == FILE_PARAM)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// `/analyze` handler; every method is routed here so non-GET verbs get the
/// JSON 405 envelope
pub async fn analyze(
    State(state): State<AppState>,
    method: Method,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<SuccessEnvelope<AudioMetadata>> {
    if method != Method::GET {
        return Err(ApiError::MethodNotAllowed(method.to_string()));
    }

    let pairs = params
        .map_err(|e| ApiError::BadRequest(format!("Invalid query string: {}", e)))?
        .0;
    let path = file_param(pairs).ok_or_else(|| {
        ApiError::BadRequest("Parameter 'f' (file path) is required.".to_string())
    })?;

    let token = state
        .gate
        .acquire()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    debug!(
        file = %path.display(),
        in_flight = state.gate.in_flight(),
        "Admitted probe request"
    );

    // Other stat failures (e.g. permissions) fall through to the probe
    if let Err(e) = tokio::fs::metadata(&path).await {
        if e.kind() == ErrorKind::NotFound {
            return Err(ApiError::NotFound(format!(
                "File not found on server: {}",
                path.display()
            )));
        }
    }

    let prober = Arc::clone(&state.prober);
    let task_path = path.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let _token = token;
        analyze_file(prober.as_ref(), &task_path)
    })
    .await;

    match outcome {
        Ok(Ok(metadata)) => {
            info!(
                file = %path.display(),
                codec = %metadata.codec,
                duration_sec = metadata.duration_sec,
                "Analysis complete"
            );
            Ok(SuccessEnvelope::new(metadata))
        }
        Ok(Err(e)) => Err(e.into()),
        Err(join_err) if join_err.is_panic() => {
            let payload = join_err.into_panic();
            Err(ApiError::Internal(format!(
                "Internal error: {}",
                panic_message(payload.as_ref())
            )))
        }
        Err(join_err) => Err(ApiError::Internal(format!(
            "Probe task did not complete: {}",
            join_err
        ))),
    }
}

/// Build analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analyze", any(analyze))
}
