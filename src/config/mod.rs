//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → env.rs (service identity overlay from the environment)
//!     → RunnerConfig (validated, immutable)
//!     → RunnerOptions::from_config
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Identity fields are passed through to the runner unexamined

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::ObservabilityConfig;
pub use schema::RunnerConfig;
pub use schema::ServiceConfig;
pub use schema::SignalConfig;
pub use schema::TimeoutConfig;
pub use validation::ValidationError;
