//! Lifecycle error definitions.

use thiserror::Error;

use crate::lifecycle::signals::SignalKind;

/// Error returned by a hook callback.
///
/// Boxed so any component error converts with `?`.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can end a run.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A start callback failed.
    #[error("start hook '{hook}' failed: {source}")]
    Start {
        hook: String,
        #[source]
        source: HookError,
    },

    /// A stop callback failed.
    #[error("stop hook '{hook}' failed: {source}")]
    Stop {
        hook: String,
        #[source]
        source: HookError,
    },

    /// The shared context was cancelled by an OS signal.
    #[error("context canceled by {signal}")]
    Interrupted { signal: SignalKind },

    /// Subscribing to an OS signal failed.
    #[error("failed to subscribe to {signal}: {source}")]
    Subscribe {
        signal: SignalKind,
        #[source]
        source: std::io::Error,
    },

    /// A hook task panicked.
    #[error("hook '{hook}' panicked")]
    Panicked { hook: String },

    /// `run` was called while another run of the same runner is live.
    #[error("runner is already running")]
    AlreadyRunning,
}

impl LifecycleError {
    /// The hook error behind a `Start` or `Stop` failure.
    pub fn hook_error(&self) -> Option<&HookError> {
        match self {
            LifecycleError::Start { source, .. } | LifecycleError::Stop { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;
