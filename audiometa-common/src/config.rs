//! Bootstrap configuration loading and resolution
//!
//! Every setting is resolved once at startup, first hit wins:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! The resolved [`ServiceConfig`] is immutable for the life of the process.

use crate::{Error, Result};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default bind host (all interfaces)
pub const DEFAULT_BIND: &str = "0.0.0.0";
/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;
/// Default number of probe invocations allowed to run at once
pub const DEFAULT_MAX_CONCURRENT_PROBES: usize = 10;
/// Default probe tool, looked up on PATH
pub const DEFAULT_PROBE_BINARY: &str = "ffprobe";
/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const ENV_BIND: &str = "AUDIOMETA_BIND";
pub const ENV_PORT: &str = "AUDIOMETA_PORT";
pub const ENV_MAX_CONCURRENT_PROBES: &str = "AUDIOMETA_MAX_CONCURRENT_PROBES";
pub const ENV_PROBE_BINARY: &str = "AUDIOMETA_PROBE_BINARY";
pub const ENV_LOG_LEVEL: &str = "AUDIOMETA_LOG_LEVEL";
pub const ENV_CONFIG: &str = "AUDIOMETA_CONFIG";

/// Configuration file contents
///
/// All keys are optional; anything missing falls through to the compiled default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Bind host (IP literal)
    #[serde(default)]
    pub bind: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    /// Admission capacity
    #[serde(default)]
    pub max_concurrent_probes: Option<usize>,

    /// Probe tool name or path
    #[serde(default)]
    pub probe_binary: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default)]
    pub level: Option<String>,
}

impl TomlConfig {
    /// Read and parse a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read TOML failed ({}): {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e))
        })
    }

    /// Parse TOML configuration text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }
}

/// Platform configuration file location (`<config dir>/audiometa/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("audiometa").join("config.toml"))
}

/// A configuration file and where it came from
#[derive(Debug, Clone)]
pub struct LoadedToml {
    pub path: PathBuf,
    pub config: TomlConfig,
}

/// Load the configuration file, if any
///
/// An explicitly requested file (argument or `AUDIOMETA_CONFIG`) must exist and parse.
/// The platform default file is optional: when missing, `None` is returned and
/// startup continues on defaults.
pub fn load_optional_toml(explicit: Option<&Path>) -> Result<Option<LoadedToml>> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match std::env::var(ENV_CONFIG) {
            Ok(path) if !path.trim().is_empty() => (PathBuf::from(path), true),
            _ => match default_config_path() {
                Some(path) => (path, false),
                None => return Ok(None),
            },
        },
    };

    if !required && !path.exists() {
        return Ok(None);
    }

    let config = TomlConfig::load(&path)?;
    Ok(Some(LoadedToml { path, config }))
}

/// Settings supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub max_concurrent_probes: Option<usize>,
    pub probe_binary: Option<String>,
    pub log_level: Option<String>,
}

/// Resolved process-wide configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: SocketAddr,
    /// Admission capacity K (always >= 1)
    pub max_concurrent_probes: usize,
    /// Probe tool name (looked up on PATH) or path
    pub probe_binary: String,
    /// Log level used when RUST_LOG is unset
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            max_concurrent_probes: DEFAULT_MAX_CONCURRENT_PROBES,
            probe_binary: DEFAULT_PROBE_BINARY.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Merge command line, environment, config file and defaults
    pub fn resolve(overrides: ConfigOverrides, toml: Option<TomlConfig>) -> Result<Self> {
        let toml = toml.unwrap_or_default();

        let bind = match overrides.bind {
            Some(bind) => bind,
            None => env_value::<String>(ENV_BIND)?
                .or(toml.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
        };

        let port = match overrides.port {
            Some(port) => port,
            None => env_value::<u16>(ENV_PORT)?
                .or(toml.port)
                .unwrap_or(DEFAULT_PORT),
        };

        let max_concurrent_probes = match overrides.max_concurrent_probes {
            Some(k) => k,
            None => env_value::<usize>(ENV_MAX_CONCURRENT_PROBES)?
                .or(toml.max_concurrent_probes)
                .unwrap_or(DEFAULT_MAX_CONCURRENT_PROBES),
        };

        let probe_binary = match overrides.probe_binary {
            Some(binary) => binary,
            None => env_value::<String>(ENV_PROBE_BINARY)?
                .or(toml.probe_binary)
                .unwrap_or_else(|| DEFAULT_PROBE_BINARY.to_string()),
        };

        let log_level = match overrides.log_level {
            Some(level) => level,
            None => env_value::<String>(ENV_LOG_LEVEL)?
                .or(toml.logging.level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        };

        if max_concurrent_probes == 0 {
            return Err(Error::Config(
                "max_concurrent_probes must be at least 1".to_string(),
            ));
        }

        if probe_binary.trim().is_empty() {
            return Err(Error::Config("probe_binary must not be empty".to_string()));
        }

        let ip: IpAddr = bind
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", bind, e)))?;

        Ok(Self {
            bind_addr: SocketAddr::new(ip, port),
            max_concurrent_probes,
            probe_binary,
            log_level,
        })
    }
}

/// Read and parse an environment variable; unset or blank is `None`
fn env_value<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid {} '{}': {}", name, raw, e))),
        _ => Ok(None),
    }
}
