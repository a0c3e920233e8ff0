//! Per-invocation context handed to hook callbacks.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};

/// Deadline used when `now + timeout` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Why a context is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The context was released before its deadline.
    #[error("context canceled")]
    Cancelled,
    /// The deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Deadline plus cancellation signal for one start or stop invocation.
///
/// Each invocation gets its own context; one hook running out of time never
/// moves another hook's deadline. Callbacks are expected to observe it
/// cooperatively, the runner does not abort them.
#[derive(Debug, Clone)]
pub struct HookContext {
    token: CancellationToken,
    deadline: Instant,
}

impl HookContext {
    /// Create a context that expires `timeout` from now.
    ///
    /// The returned guard cancels the context when dropped. Timeouts too large
    /// to represent are clamped to a deadline decades away.
    pub fn with_timeout(timeout: Duration) -> (Self, DropGuard) {
        let token = CancellationToken::new();
        let guard = token.clone().drop_guard();
        let now = Instant::now();
        let deadline = now
            .checked_add(timeout)
            .unwrap_or_else(|| now + FAR_FUTURE);
        let ctx = Self { token, deadline };
        (ctx, guard)
    }

    /// The instant at which this context expires.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Time left before the deadline, zero once expired.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<ContextError> {
        if Instant::now() >= self.deadline {
            Some(ContextError::DeadlineExceeded)
        } else if self.token.is_cancelled() {
            Some(ContextError::Cancelled)
        } else {
            None
        }
    }

    /// Whether the context is done for any reason.
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Wait until the context is cancelled or its deadline passes.
    pub async fn done(&self) -> ContextError {
        tokio::select! {
            _ = tokio::time::sleep_until(self.deadline) => ContextError::DeadlineExceeded,
            _ = self.token.cancelled() => self.err().unwrap_or(ContextError::Cancelled),
        }
    }

    /// Drive `fut` until it completes or the context is done.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, ContextError>
    where
        F: Future,
    {
        tokio::select! {
            output = fut => Ok(output),
            reason = self.done() => Err(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn live_until_deadline() {
        let (ctx, _guard) = HookContext::with_timeout(Duration::from_millis(50));
        assert_eq!(ctx.err(), None);
        assert!(ctx.remaining() > Duration::ZERO);

        assert_eq!(ctx.done().await, ContextError::DeadlineExceeded);
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
        assert_eq!(ctx.remaining(), Duration::ZERO);
    }

    #[tokio::test]
    async fn dropping_guard_cancels() {
        let (ctx, guard) = HookContext::with_timeout(Duration::from_secs(30));
        let observer = ctx.clone();
        assert!(!observer.is_done());
        drop(guard);

        assert!(observer.is_done());
        assert_eq!(observer.err(), Some(ContextError::Cancelled));
        assert_eq!(observer.done().await, ContextError::Cancelled);
    }

    #[tokio::test]
    async fn run_cuts_slow_future() {
        let (ctx, _guard) = HookContext::with_timeout(Duration::from_millis(20));
        let slow = ctx
            .run(tokio::time::sleep(Duration::from_secs(5)))
            .await;
        assert_eq!(slow, Err(ContextError::DeadlineExceeded));

        let (ctx, _guard) = HookContext::with_timeout(Duration::from_secs(5));
        let fast = ctx.run(async { 7 }).await;
        assert_eq!(fast, Ok(7));
    }

    #[tokio::test]
    async fn huge_timeout_is_clamped() {
        let before = Instant::now();
        let (ctx, _guard) = HookContext::with_timeout(Duration::MAX);
        assert!(ctx.deadline() > before + Duration::from_secs(86_400 * 365));
        assert!(!ctx.is_done());
        assert_eq!(ctx.run(async { "done" }).await, Ok("done"));
    }
}
