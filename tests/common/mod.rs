//! Shared utilities for runner integration tests.

use std::sync::Arc;
use std::time::Duration;

use lifecycle_runner::lifecycle::{LifecycleResult, ManualSignals};
use lifecycle_runner::{Hook, Runner};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Ordered log of hook events, shared between hooks and the test body.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn contains(&self, event: &str) -> bool {
        self.events.lock().iter().any(|e| e == event)
    }

    pub fn count_suffix(&self, suffix: &str) -> usize {
        self.events.lock().iter().filter(|e| e.ends_with(suffix)).count()
    }
}

/// A hook that records `<name>:start` and `<name>:stop`.
pub fn recording_hook(name: &'static str, recorder: &Recorder) -> Hook {
    let on_start = recorder.clone();
    let on_stop = recorder.clone();
    Hook::new(name)
        .on_start(move |_ctx| {
            let recorder = on_start.clone();
            async move {
                recorder.push(format!("{name}:start"));
                Ok(())
            }
        })
        .on_stop(move |_ctx| {
            let recorder = on_stop.clone();
            async move {
                recorder.push(format!("{name}:stop"));
                Ok(())
            }
        })
}

/// Run the runner on a background task.
pub fn spawn_run(runner: &Arc<Runner>) -> JoinHandle<LifecycleResult<()>> {
    let runner = Arc::clone(runner);
    tokio::spawn(async move { runner.run().await })
}

/// Wait until the runner is live, so `stop` is not a pre-run no-op.
pub async fn wait_until_running(runner: &Runner) {
    for _ in 0..200 {
        if runner.handle().is_some() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("runner never started");
}

/// Wait until a run has subscribed to the manual signal source.
pub async fn wait_for_subscriber(signals: &ManualSignals) {
    for _ in 0..200 {
        if signals.subscriber_count() > 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("signal listener never subscribed");
}

/// Await a run with a generous upper bound.
pub async fn finish(handle: JoinHandle<LifecycleResult<()>>) -> LifecycleResult<()> {
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("run did not finish in time")
        .expect("run task panicked")
}
