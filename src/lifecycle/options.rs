//! Runner options.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::schema::{RunnerConfig, ServiceConfig};
use crate::lifecycle::runner::RunnerHandle;
use crate::lifecycle::signals::SignalKind;

/// Reaction to a received signal.
pub type SignalHandler = Arc<dyn Fn(&RunnerHandle, SignalKind) + Send + Sync>;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Options a runner is built with.
#[derive(Clone)]
pub struct RunnerOptions {
    service: ServiceConfig,
    start_timeout: Duration,
    stop_timeout: Duration,
    signals: Vec<SignalKind>,
    on_signal: SignalHandler,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            start_timeout: DEFAULT_TIMEOUT,
            stop_timeout: DEFAULT_TIMEOUT,
            signals: SignalKind::DEFAULTS.to_vec(),
            on_signal: Arc::new(stop_on_termination),
        }
    }
}

impl RunnerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with the service identity read from the environment.
    pub fn from_env() -> Self {
        Self::default().service(ServiceConfig::from_env())
    }

    /// Options from a loaded configuration. The default signal handler is kept.
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self::default()
            .service(config.service.clone())
            .start_timeout(Duration::from_secs(config.timeouts.start_secs))
            .stop_timeout(Duration::from_secs(config.timeouts.stop_secs))
            .signals(config.signals.kinds.iter().copied())
    }

    pub fn service(mut self, service: ServiceConfig) -> Self {
        self.service = service;
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.service.id = id.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.service.name = name.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.service.version = version.into();
        self
    }

    /// Add an advertised endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.service.endpoints.push(endpoint.into());
        self
    }

    /// Deadline given to each start callback.
    pub fn start_timeout(mut self, timeout: Duration) -> Self {
        self.start_timeout = timeout;
        self
    }

    /// Deadline given to each stop callback.
    pub fn stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    /// Replace the observed signal kinds. An empty set disables listening.
    pub fn signals(mut self, signals: impl IntoIterator<Item = SignalKind>) -> Self {
        self.signals = signals.into_iter().collect();
        self
    }

    /// Replace the signal handler.
    pub fn on_signal<F>(mut self, handler: F) -> Self
    where
        F: Fn(&RunnerHandle, SignalKind) + Send + Sync + 'static,
    {
        self.on_signal = Arc::new(handler);
        self
    }

    pub fn service_info(&self) -> &ServiceConfig {
        &self.service
    }

    pub fn start_timeout_value(&self) -> Duration {
        self.start_timeout
    }

    pub fn stop_timeout_value(&self) -> Duration {
        self.stop_timeout
    }

    pub fn signal_kinds(&self) -> &[SignalKind] {
        &self.signals
    }

    pub(crate) fn signal_handler(&self) -> SignalHandler {
        Arc::clone(&self.on_signal)
    }
}

impl fmt::Debug for RunnerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnerOptions")
            .field("service", &self.service)
            .field("start_timeout", &self.start_timeout)
            .field("stop_timeout", &self.stop_timeout)
            .field("signals", &self.signals)
            .finish_non_exhaustive()
    }
}

/// Default handler: request stop on interrupt, quit and terminate.
pub fn stop_on_termination(handle: &RunnerHandle, signal: SignalKind) {
    if signal.is_termination() {
        handle.request_stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = RunnerOptions::default();
        assert_eq!(options.start_timeout_value(), Duration::from_secs(30));
        assert_eq!(options.stop_timeout_value(), Duration::from_secs(30));
        assert_eq!(
            options.signal_kinds(),
            [SignalKind::Interrupt, SignalKind::Quit, SignalKind::Terminate]
        );
        assert!(options.service_info().endpoints.is_empty());
    }

    #[test]
    fn builder_overrides() {
        let options = RunnerOptions::new()
            .id("svc-1")
            .name("billing")
            .version("1.4.0")
            .endpoint("http://127.0.0.1:8000")
            .endpoint("grpc://127.0.0.1:9000")
            .start_timeout(Duration::from_secs(5))
            .stop_timeout(Duration::from_millis(1500))
            .signals([]);

        let service = options.service_info();
        assert_eq!(service.id, "svc-1");
        assert_eq!(service.name, "billing");
        assert_eq!(service.version, "1.4.0");
        assert_eq!(service.endpoints.len(), 2);
        assert_eq!(options.start_timeout_value(), Duration::from_secs(5));
        assert_eq!(options.stop_timeout_value(), Duration::from_millis(1500));
        assert!(options.signal_kinds().is_empty());
    }

    #[test]
    fn from_config_uses_timeouts_and_signals() {
        let mut config = RunnerConfig::default();
        config.service.name = "worker".into();
        config.timeouts.start_secs = 3;
        config.timeouts.stop_secs = 7;
        config.signals.kinds = vec![SignalKind::Terminate, SignalKind::Hangup];

        let options = RunnerOptions::from_config(&config);
        assert_eq!(options.service_info().name, "worker");
        assert_eq!(options.start_timeout_value(), Duration::from_secs(3));
        assert_eq!(options.stop_timeout_value(), Duration::from_secs(7));
        assert_eq!(
            options.signal_kinds(),
            [SignalKind::Terminate, SignalKind::Hangup]
        );
    }
}
