//! Process lifecycle coordinator.
//!
//! Registers components ("hooks"), starts them all concurrently, waits for an
//! OS signal or a programmatic stop, then stops them all concurrently, each
//! under its own deadline.
//!
//! ```no_run
//! use std::time::Duration;
//! use lifecycle_runner::{Hook, Runner, RunnerOptions};
//!
//! # async fn demo() -> Result<(), lifecycle_runner::LifecycleError> {
//! let mut runner = Runner::new(RunnerOptions::from_env().stop_timeout(Duration::from_secs(10)));
//! runner.append_hook(
//!     Hook::new("cache")
//!         .on_start(|_ctx| async { Ok(()) })
//!         .on_stop(|_ctx| async { Ok(()) }),
//! );
//! runner.run().await
//! # }
//! ```

pub mod config;
pub mod heartbeat;
pub mod lifecycle;
pub mod observability;

pub use config::RunnerConfig;
pub use heartbeat::Heartbeat;
pub use lifecycle::{
    Hook, HookContext, HookError, HookRegistry, Lifecycle, LifecycleError, RunState, Runner,
    RunnerHandle, RunnerOptions, SignalKind,
};
