//! Heartbeat: a demo component that logs on a fixed interval until stopped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::lifecycle::{HookContext, HookError, Lifecycle};

struct Worker {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

pub struct Heartbeat {
    name: String,
    interval: Duration,
    beats: Arc<AtomicU64>,
    worker: Mutex<Option<Worker>>,
}

impl Heartbeat {
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            interval,
            beats: Arc::new(AtomicU64::new(0)),
            worker: Mutex::new(None),
        }
    }

    /// Ticks so far.
    pub fn beats(&self) -> u64 {
        self.beats.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.worker.lock().is_some()
    }
}

#[async_trait]
impl Lifecycle for Heartbeat {
    async fn start(&self, _ctx: HookContext) -> Result<(), HookError> {
        if self.interval.is_zero() {
            return Err(format!("heartbeat '{}' needs a non-zero interval", self.name).into());
        }

        let mut worker = self.worker.lock();
        if worker.is_some() {
            return Err(format!("heartbeat '{}' already started", self.name).into());
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let beats = Arc::clone(&self.beats);
        let name = self.name.clone();
        let mut ticker = tokio::time::interval(self.interval);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let beat = beats.fetch_add(1, Ordering::Relaxed) + 1;
                        tracing::info!(heartbeat = %name, beat, "Beat");
                    }
                }
            }
        });

        tracing::info!(heartbeat = %self.name, interval = ?self.interval, "Heartbeat started");
        *worker = Some(Worker { cancel, task });
        Ok(())
    }

    async fn stop(&self, ctx: HookContext) -> Result<(), HookError> {
        let Some(Worker { cancel, task }) = self.worker.lock().take() else {
            return Ok(());
        };

        cancel.cancel();
        ctx.run(task).await??;
        tracing::info!(heartbeat = %self.name, beats = self.beats(), "Heartbeat stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn beats_until_stopped() {
        let heartbeat = Heartbeat::new("test", Duration::from_millis(10));
        let (ctx, _guard) = HookContext::with_timeout(Duration::from_secs(1));

        heartbeat.start(ctx.clone()).await.unwrap();
        assert!(heartbeat.is_running());
        assert!(heartbeat.start(ctx.clone()).await.is_err());

        tokio::time::sleep(Duration::from_millis(55)).await;
        heartbeat.stop(ctx.clone()).await.unwrap();
        assert!(!heartbeat.is_running());

        let beats = heartbeat.beats();
        assert!(beats >= 2, "expected a few beats, got {beats}");

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(heartbeat.beats(), beats);
    }

    #[tokio::test]
    async fn zero_interval_is_rejected() {
        let heartbeat = Heartbeat::new("still", Duration::ZERO);
        let (ctx, _guard) = HookContext::with_timeout(Duration::from_secs(1));

        let err = heartbeat.start(ctx).await.unwrap_err();
        assert!(err.to_string().contains("non-zero interval"));
        assert!(!heartbeat.is_running());
    }

    #[tokio::test]
    async fn stop_without_start_is_ok() {
        let heartbeat = Heartbeat::new("idle", Duration::from_secs(1));
        let (ctx, _guard) = HookContext::with_timeout(Duration::from_secs(1));
        heartbeat.stop(ctx).await.unwrap();
    }
}
