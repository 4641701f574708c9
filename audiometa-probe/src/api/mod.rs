//! HTTP API handlers for audiometa-probe

pub mod analyze;
pub mod health;

pub use analyze::{analyze, analyze_routes};
pub use health::health_routes;
