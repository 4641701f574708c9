//! # audiometa Common Library
//!
//! Shared code for the audiometa services:
//! - Error type and `Result` alias
//! - Bootstrap configuration (TOML schema and startup resolution)

pub mod config;
pub mod error;

pub use config::{ConfigOverrides, LoadedToml, ServiceConfig, TomlConfig};
pub use error::{Error, Result};
