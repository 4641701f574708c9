//! Common error types for audiometa

use thiserror::Error;

/// Common result type for audiometa operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across audiometa crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
