//! Ordered, append-only hook registry.

use crate::lifecycle::hook::{Hook, Lifecycle};

/// Registered hooks in insertion order.
///
/// Order only decides the order tasks are built in; all hooks run concurrently.
#[derive(Debug, Default, Clone)]
pub struct HookRegistry {
    hooks: Vec<Hook>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook. Any combination of callbacks is accepted.
    pub fn register(&mut self, hook: Hook) {
        tracing::debug!(
            hook = hook.name(),
            on_start = hook.start_fn().is_some(),
            on_stop = hook.stop_fn().is_some(),
            "Hook registered"
        );
        self.hooks.push(hook);
    }

    /// Append a component exposing `start` and `stop`.
    pub fn register_capability<L>(&mut self, component: L)
    where
        L: Lifecycle + 'static,
    {
        self.register(Hook::from_lifecycle(component));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hook> {
        self.hooks.iter()
    }
}
