/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Waypoint Config Module
//! This module provides a common configuration framework for our crates.
//!
//! # Variable Naming Convention
//!
//! - Struct fields use snake_case (e.g., `probe`, `tcp_timeout_ms`)
//! - Environment variables use SCREAMING_SNAKE_CASE and are prefixed with "WAYPOINT__"
//!   (e.g., `WAYPOINT__PROBE__TCP_TIMEOUT_MS`)
//! - Configuration file keys use snake_case (e.g., `probe.tcp_timeout_ms`, `log.level`)
//!
//! # Configuration Overriding
//!
//! The configuration values are loaded and overridden in the following order (later sources take precedence):
//!
//! 1. Default values from the embedded `default.toml` file
//! 2. Values from an optional external configuration file (if provided)
//! 3. Environment variables
//!
//! # Available Environment Variables
//!
//! - `WAYPOINT__LOG__LEVEL`: Sets the log level for the application
//!   Default: "info"
//!
//! - `WAYPOINT__LOG__FORMAT`: "text" for human-readable lines, "json" for structured output
//!   Default: "text"
//!
//! - `WAYPOINT__PROBE__TCP_TIMEOUT_MS`: Timeout for a single TCP reachability probe
//!   Default: 2000
//!
//! - `WAYPOINT__PROBE__HTTP_TIMEOUT_MS`: Timeout for the broker diagnostic request
//!   Default: 5000
//!
//! - `WAYPOINT__BROKER__HOST_ALIAS`: Host-bridge alias tried with the external broker port
//!   Default: "host.docker.internal"
//!
//! - `WAYPOINT__BROKER__GROUP` / `__VERSION` / `__KIND`: Broker custom resource type
//!   Default: "meshery.io" / "v1alpha1" / "Broker"
//!
//! - `WAYPOINT__BROKER__NAMESPACE` / `__NAME`: Broker custom resource location
//!   Default: "meshery" / "meshery-broker"
//!
//! - `WAYPOINT__KUBECONFIG__ENV_VAR`: Name of the variable holding a kubeconfig path
//!   Default: "KUBECONFIG"
//!
//! - `WAYPOINT__KUBECONFIG__OUTPUT_PATH`: Where the normalized kubeconfig is persisted
//!   Default: None (not persisted)
//!
//! - `WAYPOINT__OPERATOR__NAMESPACE` / `__RELEASE_NAME` / `__CHART` / `__REPOSITORY`:
//!   Helm release coordinates of the operator chart

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

// Include the default settings file as a string constant
const DEFAULT_SETTINGS: &str = include_str!("../default.toml");

/// Represents the main settings structure for the application
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Logging configuration
    pub log: Log,
    /// Network probe configuration
    pub probe: Probe,
    /// Broker lookup configuration
    pub broker: Broker,
    /// Kubeconfig discovery configuration
    pub kubeconfig: Kubeconfig,
    /// Operator chart configuration
    pub operator: Operator,
}

/// Represents the logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Log {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,
    /// Log format: "text" for human-readable, "json" for structured JSON
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_format() -> String {
    "text".to_string()
}

/// Timeouts applied to individual network probes
#[derive(Debug, Deserialize, Clone)]
pub struct Probe {
    /// TCP connect timeout in milliseconds
    pub tcp_timeout_ms: u64,
    /// HTTP request timeout for the diagnostic endpoint in milliseconds
    pub http_timeout_ms: u64,
}

impl Probe {
    pub fn tcp_timeout(&self) -> Duration {
        Duration::from_millis(self.tcp_timeout_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

/// Represents the broker configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Broker {
    /// Host-bridge alias used by container-desktop environments
    pub host_alias: String,
    /// API group of the broker custom resource
    pub group: String,
    /// API version of the broker custom resource
    pub version: String,
    /// Kind of the broker custom resource
    pub kind: String,
    /// Namespace the broker resource lives in
    pub namespace: String,
    /// Name of the broker resource
    pub name: String,
}

/// Represents the kubeconfig discovery configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Kubeconfig {
    /// Environment variable naming a kubeconfig path
    pub env_var: String,
    /// Optional path the normalized kubeconfig is written to
    pub output_path: Option<String>,
}

/// Helm release coordinates of the operator chart
#[derive(Debug, Deserialize, Clone)]
pub struct Operator {
    pub namespace: String,
    pub release_name: String,
    pub chart: String,
    pub repository: String,
}

impl Settings {
    /// Creates a new `Settings` instance
    ///
    /// # Arguments
    ///
    /// * `file` - An optional path to a configuration file
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing the `Settings` instance or a `ConfigError`
    pub fn new(file: Option<String>) -> Result<Self, ConfigError> {
        // Start with default settings from the embedded TOML file
        let mut s = Config::builder()
            .add_source(File::from_str(DEFAULT_SETTINGS, config::FileFormat::Toml));

        // If a configuration file is provided, add it as a source
        s = match file {
            Some(x) => s.add_source(File::with_name(x.as_str())),
            None => s,
        };

        // Add environment variables as a source, prefixed with "WAYPOINT" and using "__" as a separator
        s = s.add_source(Environment::with_prefix("WAYPOINT").separator("__"));

        s.build()?.try_deserialize()
    }
}
