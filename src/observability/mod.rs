//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! runner, hooks, signal listener
//!     → tracing events (run span with run_id)
//!     → logging.rs subscriber (pretty or JSON to stdout)
//! ```

pub mod logging;

pub use logging::init_logging;
