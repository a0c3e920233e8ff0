//! Task group with first-error-cancels semantics.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::{Id, JoinSet};
use tracing::Instrument;

use crate::lifecycle::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::shutdown::{Shutdown, ShutdownCause};

/// Spawns the tasks of one run and joins them.
///
/// The first error reported by any task is kept and immediately triggers the
/// shared shutdown, while the other tasks keep running until they return.
pub struct TaskGroup {
    tasks: JoinSet<()>,
    labels: Vec<(Id, String)>,
    first_error: Arc<Mutex<Option<LifecycleError>>>,
    shutdown: Shutdown,
}

impl TaskGroup {
    pub fn new(shutdown: Shutdown) -> Self {
        Self {
            tasks: JoinSet::new(),
            labels: Vec::new(),
            first_error: Arc::new(Mutex::new(None)),
            shutdown,
        }
    }

    /// Spawn a task. `label` names it if it panics.
    pub fn spawn<F>(&mut self, label: impl Into<String>, task: F)
    where
        F: Future<Output = LifecycleResult<()>> + Send + 'static,
    {
        let first_error = Arc::clone(&self.first_error);
        let shutdown = self.shutdown.clone();
        let handle = self.tasks.spawn(
            async move {
                if let Err(error) = task.await {
                    record(&first_error, &shutdown, error);
                }
            }
            .in_current_span(),
        );
        self.labels.push((handle.id(), label.into()));
    }

    /// Number of tasks spawned so far.
    pub(crate) fn len(&self) -> usize {
        self.labels.len()
    }

    /// Wait for every task, then return the first error observed.
    pub async fn wait(mut self) -> LifecycleResult<()> {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(join_error) = joined {
                let hook = self
                    .labels
                    .iter()
                    .find(|(id, _)| *id == join_error.id())
                    .map(|(_, label)| label.clone())
                    .unwrap_or_default();
                record(
                    &self.first_error,
                    &self.shutdown,
                    LifecycleError::Panicked { hook },
                );
            }
        }

        match self.first_error.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn record(slot: &Mutex<Option<LifecycleError>>, shutdown: &Shutdown, error: LifecycleError) {
    {
        let mut first = slot.lock();
        if first.is_none() {
            tracing::debug!(error = %error, "Task failed, triggering shutdown");
            *first = Some(error);
        } else {
            tracing::debug!(error = %error, "Task failed after shutdown was triggered");
        }
    }
    shutdown.trigger(ShutdownCause::Failed);
}
