//! Hook definitions and the component capability trait.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use crate::lifecycle::context::HookContext;
use crate::lifecycle::error::HookError;

/// A start or stop callback.
pub type HookFn =
    Arc<dyn Fn(HookContext) -> BoxFuture<'static, Result<(), HookError>> + Send + Sync>;

/// A component that can be started and stopped.
#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// Bring the component up. Should return once it is running.
    async fn start(&self, ctx: HookContext) -> Result<(), HookError>;

    /// Tear the component down before `ctx` expires.
    async fn stop(&self, ctx: HookContext) -> Result<(), HookError>;
}

/// A pair of optional start and stop callbacks for one component.
#[derive(Clone)]
pub struct Hook {
    name: Cow<'static, str>,
    on_start: Option<HookFn>,
    on_stop: Option<HookFn>,
}

impl Hook {
    /// Create a hook with no callbacks.
    ///
    /// The name only labels logs and errors.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            on_start: None,
            on_stop: None,
        }
    }

    /// Wrap a `Lifecycle` component. Both callbacks share the component.
    pub fn from_lifecycle<L>(component: L) -> Self
    where
        L: Lifecycle + 'static,
    {
        Self::from_shared(Arc::new(component))
    }

    /// Wrap a shared `Lifecycle` component.
    pub fn from_shared<L>(component: Arc<L>) -> Self
    where
        L: Lifecycle + 'static,
    {
        let starter = Arc::clone(&component);
        let stopper = component;
        Self::new(short_type_name::<L>())
            .on_start(move |ctx| {
                let component = Arc::clone(&starter);
                async move { component.start(ctx).await }
            })
            .on_stop(move |ctx| {
                let component = Arc::clone(&stopper);
                async move { component.stop(ctx).await }
            })
    }

    /// Set the start callback.
    pub fn on_start<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.on_start = Some(boxed(f));
        self
    }

    /// Set the stop callback.
    pub fn on_stop<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.on_stop = Some(boxed(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_fn(&self) -> Option<&HookFn> {
        self.on_start.as_ref()
    }

    pub fn stop_fn(&self) -> Option<&HookFn> {
        self.on_stop.as_ref()
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.name)
            .field("on_start", &self.on_start.is_some())
            .field("on_stop", &self.on_stop.is_some())
            .finish()
    }
}

fn boxed<F, Fut>(f: F) -> HookFn
where
    F: Fn(HookContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HookError>> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

/// Last path segment of a type name, e.g. `Heartbeat` for `my_crate::Heartbeat`.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
