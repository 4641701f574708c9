//! Test Helper Utilities
//!
//! Shared fakes and request helpers for audiometa-probe integration tests

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use audiometa_probe::probe::ProbeRawResult;
use audiometa_probe::{build_router, AdmissionGate, AnalysisError, AppState, MediaProber};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

/// A typical report: cover art stream first, then the audio stream
pub fn sample_report() -> ProbeRawResult {
    serde_json::from_value(json!({
        "streams": [
            {"codec_type": "video", "codec_name": "mjpeg"},
            {
                "codec_type": "audio",
                "codec_name": "aac",
                "sample_rate": "44100",
                "bit_rate": "128000",
                "channels": 2,
                "channel_layout": "stereo",
                "tags": {"title": "T"}
            }
        ],
        "format": {
            "filename": "/library/album/track01.m4a",
            "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
            "size": "2097152",
            "duration": "10.5",
            "probe_score": 100,
            "tags": {"title": "Ignored", "artist": "Ignored"}
        }
    }))
    .unwrap()
}

/// Always returns the same report
pub struct StaticProber(pub ProbeRawResult);

impl MediaProber for StaticProber {
    fn probe(&self, _path: &Path) -> Result<ProbeRawResult, AnalysisError> {
        Ok(self.0.clone())
    }
}

/// Always fails with the error produced by the closure
pub struct FailingProber(pub fn() -> AnalysisError);

impl MediaProber for FailingProber {
    fn probe(&self, _path: &Path) -> Result<ProbeRawResult, AnalysisError> {
        Err((self.0)())
    }
}

/// Panics inside the probe call
pub struct PanickingProber;

impl MediaProber for PanickingProber {
    fn probe(&self, _path: &Path) -> Result<ProbeRawResult, AnalysisError> {
        panic!("probe exploded");
    }
}

/// Records how many probes overlap
#[derive(Default)]
pub struct CountingProber {
    pub current: AtomicUsize,
    pub max_seen: AtomicUsize,
    pub total: AtomicUsize,
    pub delay: Duration,
}

impl CountingProber {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }
}

impl MediaProber for CountingProber {
    fn probe(&self, _path: &Path) -> Result<ProbeRawResult, AnalysisError> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_seen.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.current.fetch_sub(1, Ordering::SeqCst);
        self.total.fetch_add(1, Ordering::SeqCst);
        Ok(sample_report())
    }
}

/// Blocks inside the probe until the test sends a release signal
pub struct BlockingProber {
    pub entered: AtomicUsize,
    release: Mutex<Receiver<()>>,
}

impl BlockingProber {
    pub fn new() -> (Self, Sender<()>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                entered: AtomicUsize::new(0),
                release: Mutex::new(rx),
            },
            tx,
        )
    }
}

impl MediaProber for BlockingProber {
    fn probe(&self, _path: &Path) -> Result<ProbeRawResult, AnalysisError> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        let _ = self.release.lock().unwrap().recv();
        Ok(sample_report())
    }
}

/// Router plus a handle on its gate
pub fn test_app(capacity: usize, prober: Arc<dyn MediaProber>) -> (Router, AdmissionGate) {
    let gate = AdmissionGate::new(capacity);
    let app = build_router(AppState::new(gate.clone(), prober));
    (app, gate)
}

/// Send one request and decode the JSON body
pub async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

/// `/analyze` URI for a path, percent-encoding the characters tests use
pub fn analyze_uri(path: &Path) -> String {
    let encoded: String = path
        .to_string_lossy()
        .chars()
        .map(|c| match c {
            ' ' => "%20".to_string(),
            '&' => "%26".to_string(),
            '#' => "%23".to_string(),
            '+' => "%2B".to_string(),
            '%' => "%25".to_string(),
            c => c.to_string(),
        })
        .collect();
    format!("/analyze?f={}", encoded)
}

/// Poll until the condition holds or a second passes
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
