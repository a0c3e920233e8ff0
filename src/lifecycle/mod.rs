//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (registry.rs, hook.rs):
//!     Lifecycle component / Hook → HookRegistry (append-only)
//!
//! Run (runner.rs):
//!     Shutdown (shutdown.rs) + TaskGroup (group.rs)
//!     → start tasks run at once, each with its own HookContext (context.rs)
//!     → stop tasks wait for the shutdown trigger
//!     → signal task feeds signals (signals.rs) to the handler (options.rs)
//!
//! Shutdown:
//!     first of {task error, Runner::stop, handled signal}
//!     → stop tasks run under stop_timeout → join → first error
//! ```
//!
//! # Design Decisions
//! - Start and stop callbacks of every hook run concurrently, no ordering
//! - The shutdown trigger is one-shot; the first cause is kept
//! - No retries: the first failure ends the run and is the reported error
//! - Deadlines are handed to callbacks, never enforced by aborting them

pub mod context;
pub mod error;
pub mod group;
pub mod hook;
pub mod options;
pub mod registry;
pub mod runner;
pub mod shutdown;
pub mod signals;

pub use context::{ContextError, HookContext};
pub use error::{HookError, LifecycleError, LifecycleResult};
pub use hook::{Hook, HookFn, Lifecycle};
pub use options::{stop_on_termination, RunnerOptions, SignalHandler};
pub use registry::HookRegistry;
pub use runner::{RunState, Runner, RunnerHandle};
pub use shutdown::{Shutdown, ShutdownCause};
pub use signals::{ManualSignals, OsSignals, SignalKind, SignalSource, SignalSubscription};
