//! Service identity from environment variables.

use crate::config::schema::{RunnerConfig, ServiceConfig};

pub const ENV_SERVICE_ID: &str = "LIFECYCLE_SERVICE_ID";
pub const ENV_SERVICE_NAME: &str = "LIFECYCLE_SERVICE_NAME";
pub const ENV_SERVICE_VERSION: &str = "LIFECYCLE_SERVICE_VERSION";
/// Comma-separated endpoint list.
pub const ENV_SERVICE_ENDPOINTS: &str = "LIFECYCLE_SERVICE_ENDPOINTS";

impl ServiceConfig {
    /// Identity read from the process environment. Unset variables stay empty.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Identity read through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            id: lookup(ENV_SERVICE_ID).unwrap_or_default(),
            name: lookup(ENV_SERVICE_NAME).unwrap_or_default(),
            version: lookup(ENV_SERVICE_VERSION).unwrap_or_default(),
            endpoints: lookup(ENV_SERVICE_ENDPOINTS)
                .map(|raw| split_endpoints(&raw))
                .unwrap_or_default(),
        }
    }

    /// Overlay the non-empty fields of `other` onto `self`.
    pub fn merge(&mut self, other: ServiceConfig) {
        if !other.id.is_empty() {
            self.id = other.id;
        }
        if !other.name.is_empty() {
            self.name = other.name;
        }
        if !other.version.is_empty() {
            self.version = other.version;
        }
        if !other.endpoints.is_empty() {
            self.endpoints = other.endpoints;
        }
    }
}

impl RunnerConfig {
    /// Overlay identity set in the environment onto the file values.
    pub fn apply_env(&mut self) {
        self.service.merge(ServiceConfig::from_env());
    }
}

fn split_endpoints(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|endpoint| !endpoint.is_empty())
        .map(str::to_string)
        .collect()
}
