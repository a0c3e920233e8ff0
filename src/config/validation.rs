//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0)
//! - Reject duplicate signal kinds and malformed endpoints
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RunnerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::RunnerConfig;
use crate::lifecycle::signals::SignalKind;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("timeouts.{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("signal {0} is listed more than once")]
    DuplicateSignal(SignalKind),

    #[error("endpoint '{endpoint}' is not a valid URL: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("unknown log format '{0}' (expected 'pretty' or 'json')")]
    UnknownLogFormat(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &RunnerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.timeouts.start_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "start_secs",
        });
    }
    if config.timeouts.stop_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "stop_secs" });
    }

    let mut seen = HashSet::new();
    for &kind in &config.signals.kinds {
        if !seen.insert(kind) {
            errors.push(ValidationError::DuplicateSignal(kind));
        }
    }

    for endpoint in &config.service.endpoints {
        if let Err(e) = url::Url::parse(endpoint) {
            errors.push(ValidationError::InvalidEndpoint {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            });
        }
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::UnknownLogFormat(other.to_string())),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
