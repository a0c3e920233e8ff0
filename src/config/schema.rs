//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the runner.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::lifecycle::signals::SignalKind;

/// Root configuration for the runner.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RunnerConfig {
    /// Service identity, passed through to the runner unexamined.
    pub service: ServiceConfig,

    /// Per-callback deadlines.
    pub timeouts: TimeoutConfig,

    /// Observed OS signals.
    pub signals: SignalConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Service identity.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ServiceConfig {
    /// Instance identifier.
    pub id: String,

    /// Service name.
    pub name: String,

    /// Service version.
    pub version: String,

    /// Advertised endpoints (e.g., "grpc://10.0.0.1:9000").
    pub endpoints: Vec<String>,
}

/// Timeout configuration for hook callbacks.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for each start callback in seconds.
    pub start_secs: u64,

    /// Deadline for each stop callback in seconds.
    pub stop_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            start_secs: 30,
            stop_secs: 30,
        }
    }
}

/// Signal configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct SignalConfig {
    /// Signal kinds to observe. Empty disables signal handling.
    pub kinds: Vec<SignalKind>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            kinds: SignalKind::DEFAULTS.to_vec(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: RunnerConfig = toml::from_str("").unwrap();
        assert_eq!(config, RunnerConfig::default());
        assert_eq!(config.timeouts.start_secs, 30);
        assert_eq!(config.signals.kinds, SignalKind::DEFAULTS);
    }

    #[test]
    fn partial_document() {
        let config: RunnerConfig = toml::from_str(
            r#"
            [service]
            name = "billing"
            endpoints = ["http://127.0.0.1:8000"]

            [timeouts]
            stop_secs = 5

            [signals]
            kinds = []
            "#,
        )
        .unwrap();

        assert_eq!(config.service.name, "billing");
        assert_eq!(config.service.endpoints, ["http://127.0.0.1:8000"]);
        assert_eq!(config.timeouts.start_secs, 30);
        assert_eq!(config.timeouts.stop_secs, 5);
        assert!(config.signals.kinds.is_empty());
        assert_eq!(config.observability.log_format, "pretty");
    }
}
