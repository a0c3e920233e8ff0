//! Shared shutdown context for one run.

use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

use crate::lifecycle::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::signals::SignalKind;

/// What fired the shutdown trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    /// `Runner::stop` or `RunnerHandle::request_stop` outside a signal handler.
    Requested,
    /// A signal handler requested stop.
    Signal(SignalKind),
    /// A hook or listener task reported an error.
    Failed,
}

/// Coordinator for graceful shutdown.
///
/// Every task of a run holds a clone. Triggering is one-shot: the first cause
/// is kept and later triggers only repeat the (idempotent) cancellation.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
    cause: Arc<OnceLock<ShutdownCause>>,
}

impl Shutdown {
    /// Create a new, untriggered shutdown context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trigger the shutdown. Returns true if this call was the first trigger.
    pub fn trigger(&self, cause: ShutdownCause) -> bool {
        // cause must be visible before any waiter wakes
        let first = self.cause.set(cause).is_ok();
        self.token.cancel();
        first
    }

    /// Whether the shutdown has been triggered.
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The first trigger cause, if triggered.
    pub fn cause(&self) -> Option<ShutdownCause> {
        self.cause.get().copied()
    }

    /// Wait until the shutdown is triggered.
    pub async fn triggered(&self) {
        self.token.cancelled().await;
    }

    /// The result a task reports when it exits because of the shutdown.
    ///
    /// A signal-driven shutdown surfaces as `Interrupted`; a requested stop is a
    /// clean exit; a failure has already been recorded by the failing task.
    pub fn exit_result(&self) -> LifecycleResult<()> {
        match self.cause() {
            Some(ShutdownCause::Signal(signal)) => Err(LifecycleError::Interrupted { signal }),
            _ => Ok(()),
        }
    }
}
