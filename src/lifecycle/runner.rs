//! The lifecycle runner.
//!
//! # Data Flow
//! ```text
//! run():
//!     Shutdown::new() + TaskGroup
//!     → stop tasks   (wait for shutdown → stop_timeout context → on_stop)
//!     → start tasks  (start_timeout context → on_start)
//!     → signal task  (subscribe → on_signal per signal, exit on shutdown)
//!     → join all → first error
//! ```

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::Instrument;
use uuid::Uuid;

use crate::lifecycle::context::HookContext;
use crate::lifecycle::error::{LifecycleError, LifecycleResult};
use crate::lifecycle::group::TaskGroup;
use crate::lifecycle::hook::{Hook, HookFn, Lifecycle};
use crate::lifecycle::options::{RunnerOptions, SignalHandler};
use crate::lifecycle::registry::HookRegistry;
use crate::lifecycle::shutdown::{Shutdown, ShutdownCause};
use crate::lifecycle::signals::{OsSignals, SignalKind, SignalSource};

/// Where a runner is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// `run` has never been called.
    Idle,
    /// Tasks are spawned and no trigger has fired yet.
    Running,
    /// The shutdown trigger fired; tasks are draining.
    ShuttingDown,
    /// The last run returned.
    Terminated,
}

/// Stop trigger for one run, handed to signal handlers.
#[derive(Debug, Clone)]
pub struct RunnerHandle {
    shutdown: Shutdown,
    signal: Option<SignalKind>,
}

impl RunnerHandle {
    /// Request a graceful stop. Safe to call any number of times.
    pub fn request_stop(&self) {
        let cause = match self.signal {
            Some(signal) => ShutdownCause::Signal(signal),
            None => ShutdownCause::Requested,
        };
        if self.shutdown.trigger(cause) {
            tracing::info!(cause = ?cause, "Stop requested");
        }
    }

    /// Whether a stop has already been triggered for this run.
    pub fn is_stopping(&self) -> bool {
        self.shutdown.is_triggered()
    }
}

/// Which callback a task drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    Stop,
}

impl Phase {
    fn as_str(self) -> &'static str {
        match self {
            Phase::Start => "start",
            Phase::Stop => "stop",
        }
    }
}

/// One callback invocation to spawn.
struct HookTask {
    index: usize,
    name: String,
    phase: Phase,
    callback: HookFn,
}

impl HookTask {
    fn label(&self) -> String {
        format!("{}#{}:{}", self.name, self.index, self.phase.as_str())
    }

    async fn invoke(self, timeout: Duration) -> LifecycleResult<()> {
        let (ctx, _release) = HookContext::with_timeout(timeout);
        tracing::debug!(
            hook = %self.name,
            index = self.index,
            phase = self.phase.as_str(),
            "Invoking hook"
        );

        let result = (self.callback)(ctx).await;
        match result {
            Ok(()) => {
                tracing::debug!(hook = %self.name, phase = self.phase.as_str(), "Hook finished");
                Ok(())
            }
            Err(source) => Err(match self.phase {
                Phase::Start => LifecycleError::Start {
                    hook: self.name,
                    source,
                },
                Phase::Stop => LifecycleError::Stop {
                    hook: self.name,
                    source,
                },
            }),
        }
    }
}

/// Starts registered hooks concurrently and stops them once a trigger fires.
///
/// `run` borrows the runner, so share it (e.g. in an `Arc`) to call `stop`
/// from another task.
pub struct Runner {
    options: RunnerOptions,
    hooks: HookRegistry,
    signal_source: Arc<dyn SignalSource>,
    active: Mutex<Option<Shutdown>>,
    state: Mutex<RunState>,
}

impl Runner {
    pub fn new(options: RunnerOptions) -> Self {
        Self {
            options,
            hooks: HookRegistry::new(),
            signal_source: Arc::new(OsSignals),
            active: Mutex::new(None),
            state: Mutex::new(RunState::Idle),
        }
    }

    /// Replace where signals come from.
    pub fn with_signal_source(mut self, source: impl SignalSource + 'static) -> Self {
        self.signal_source = Arc::new(source);
        self
    }

    /// Register a component whose `start`/`stop` run on application start and stop.
    pub fn append<L>(&mut self, component: L)
    where
        L: Lifecycle + 'static,
    {
        self.hooks.register_capability(component);
    }

    /// Register a raw pair of callbacks.
    pub fn append_hook(&mut self, hook: Hook) {
        self.hooks.register(hook);
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn state(&self) -> RunState {
        let state = *self.state.lock();
        match (state, self.active.lock().as_ref()) {
            (RunState::Running, Some(shutdown)) if shutdown.is_triggered() => {
                RunState::ShuttingDown
            }
            _ => state,
        }
    }

    /// Handle to the live run, if any.
    pub fn handle(&self) -> Option<RunnerHandle> {
        self.active.lock().as_ref().map(|shutdown| RunnerHandle {
            shutdown: shutdown.clone(),
            signal: None,
        })
    }

    /// Gracefully stop the live run. No-op when nothing is running.
    pub fn stop(&self) {
        if let Some(handle) = self.handle() {
            handle.request_stop();
        }
    }

    /// Run every hook until a stop trigger fires and all tasks have returned.
    ///
    /// Returns the first error reported by any start, stop or signal task.
    pub async fn run(&self) -> LifecycleResult<()> {
        let shutdown = Shutdown::new();
        {
            let mut active = self.active.lock();
            if active.is_some() {
                return Err(LifecycleError::AlreadyRunning);
            }
            *active = Some(shutdown.clone());
            *self.state.lock() = RunState::Running;
        }

        let span = tracing::info_span!(
            "run",
            run_id = %Uuid::new_v4(),
            service = %self.options.service_info().name
        );
        let _finished = FinishRun { runner: self };
        self.run_tasks(shutdown).instrument(span).await
    }

    async fn run_tasks(&self, shutdown: Shutdown) -> LifecycleResult<()> {
        let tasks = self.build_tasks();
        let mut group = TaskGroup::new(shutdown.clone());
        let start_timeout = self.options.start_timeout_value();
        let stop_timeout = self.options.stop_timeout_value();

        for task in tasks {
            let label = task.label();
            match task.phase {
                Phase::Stop => {
                    let shutdown = shutdown.clone();
                    group.spawn(label, async move {
                        shutdown.triggered().await;
                        task.invoke(stop_timeout).await
                    });
                }
                Phase::Start => group.spawn(label, task.invoke(start_timeout)),
            }
        }

        let kinds = self.options.signal_kinds().to_vec();
        if !kinds.is_empty() {
            let source = Arc::clone(&self.signal_source);
            let handler = self.options.signal_handler();
            let shutdown = shutdown.clone();
            group.spawn("signals", listen(source, kinds, handler, shutdown));
        }

        tracing::info!(
            hooks = self.hooks.len(),
            tasks = group.len(),
            signals = ?self.options.signal_kinds(),
            "Runner started"
        );

        let result = group.wait().await;
        match &result {
            Ok(()) => tracing::info!(cause = ?shutdown.cause(), "Runner stopped"),
            Err(error) => {
                tracing::info!(cause = ?shutdown.cause(), error = %error, "Runner stopped with error")
            }
        }
        result
    }

    /// Flatten the registry into an indexed task list, stop tasks first.
    fn build_tasks(&self) -> Vec<HookTask> {
        let mut tasks = Vec::with_capacity(self.hooks.len() * 2);
        for (index, hook) in self.hooks.iter().enumerate() {
            if let Some(callback) = hook.stop_fn() {
                tasks.push(HookTask {
                    index,
                    name: hook.name().to_string(),
                    phase: Phase::Stop,
                    callback: Arc::clone(callback),
                });
            }
            if let Some(callback) = hook.start_fn() {
                tasks.push(HookTask {
                    index,
                    name: hook.name().to_string(),
                    phase: Phase::Start,
                    callback: Arc::clone(callback),
                });
            }
        }
        tasks
    }
}

/// Clears the live run when `run` returns or its future is dropped.
struct FinishRun<'a> {
    runner: &'a Runner,
}

impl Drop for FinishRun<'_> {
    fn drop(&mut self) {
        *self.runner.active.lock() = None;
        *self.runner.state.lock() = RunState::Terminated;
    }
}

/// Signal loop: hand each signal to the handler until the shutdown fires.
async fn listen(
    source: Arc<dyn SignalSource>,
    kinds: Vec<SignalKind>,
    handler: SignalHandler,
    shutdown: Shutdown,
) -> LifecycleResult<()> {
    let mut subscription = source.subscribe(&kinds)?;

    loop {
        tokio::select! {
            _ = shutdown.triggered() => break,
            received = subscription.recv() => match received {
                Some(signal) => {
                    tracing::info!(signal = %signal, "Signal received");
                    let handle = RunnerHandle {
                        shutdown: shutdown.clone(),
                        signal: Some(signal),
                    };
                    handler(&handle, signal);
                }
                None => {
                    tracing::debug!("Signal source closed, waiting for shutdown");
                    shutdown.triggered().await;
                    break;
                }
            },
        }
    }

    shutdown.exit_result()
}
