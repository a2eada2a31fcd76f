//! # Availability Configuration
//!
//! YAML target file parser for the `ca-await` tool.
//!
//! A target file names the endpoints to wait for and how long to wait for
//! each of them. Parsed targets convert into the poller's
//! [`PollConfig`](availability::PollConfig) and
//! [`HttpProbeOptions`](availability::HttpProbeOptions).

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub mod parser;

pub use parser::{Target, parse_file, parse_str, resolve_target, resolve_targets};

/// Request timeout used when neither the target nor the settings give one
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Deadline used when neither the target nor the settings give one
pub const DEFAULT_DEADLINE_SECS: u64 = 60;

/// Pause between retried failures when the retry block omits it
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 1000;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Environment variable not found
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    /// Target reference not found
    #[error("Target '{0}' not found")]
    TargetNotFound(String),

    /// Target rejected by the poller
    #[error("Target '{name}': {source}")]
    InvalidTarget {
        /// Target name
        name: String,
        /// Poller error
        #[source]
        source: availability::Error,
    },
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Optional deployment name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Global settings
    #[serde(default, skip_serializing_if = "Settings::is_default")]
    pub settings: Settings,

    /// Endpoints to wait for, by name
    pub targets: BTreeMap<String, TargetDef>,
}

/// Defaults applied to every target
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// Default log level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Default request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,

    /// Default deadline in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<u64>,

    /// Default health path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_path: Option<String>,
}

impl Settings {
    /// Check if settings are default (all None)
    fn is_default(&self) -> bool {
        self == &Settings::default()
    }
}

/// One endpoint to wait for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetDef {
    /// Base URL; `${VAR}` and `${VAR:-default}` are substituted
    pub url: String,

    /// Health path appended to the URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_path: Option<String>,

    /// Request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,

    /// Deadline in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<u64>,

    /// Exact status to accept instead of any 2xx
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_status: Option<u16>,

    /// Skip TLS certificate validation (test networks only)
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// PEM file to trust as an extra root; `${VAR}` is substituted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_certificate: Option<String>,

    /// Retry non-timeout failures instead of failing fast
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryDef>,
}

/// Retry block of a target
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RetryDef {
    /// Retry connection failures
    #[serde(default)]
    pub transport_errors: bool,

    /// Retry non-success status codes
    #[serde(default)]
    pub unexpected_status: bool,

    /// Pause between retries in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,
}
