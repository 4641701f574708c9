//! audiometa-probe library interface
//!
//! Exposes the router and its building blocks for the binary and for
//! integration tests.

pub mod api;
pub mod error;
pub mod gate;
pub mod normalize;
pub mod probe;
pub mod response;

pub use crate::error::{AnalysisError, ApiError, ApiResult};
pub use crate::gate::{AdmissionGate, AdmissionToken};
pub use crate::normalize::AudioMetadata;
pub use crate::probe::{FfprobeInvoker, MediaProber};

use std::sync::Arc;

use audiometa_common::ServiceConfig;
use axum::Router;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Process-wide admission gate
    pub gate: AdmissionGate,
    /// Probe backend (ffprobe in production)
    pub prober: Arc<dyn MediaProber>,
}

impl AppState {
    pub fn new(gate: AdmissionGate, prober: Arc<dyn MediaProber>) -> Self {
        Self { gate, prober }
    }

    /// State for the configured ffprobe binary and admission capacity
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            AdmissionGate::new(config.max_concurrent_probes),
            Arc::new(FfprobeInvoker::new(config.probe_binary.clone())),
        )
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::analyze_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(error::panic_response))
        .with_state(state)
}
