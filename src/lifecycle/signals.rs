//! OS signal handling.
//!
//! # Responsibilities
//! - Name the signal kinds a runner can observe
//! - Subscribe to them for the lifetime of one run
//! - Offer a manual source so signal delivery can be simulated
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Each kind gets a forwarder task feeding one channel; dropping the
//!   subscription aborts the forwarders
//! - No process-wide state survives the run that created the subscription

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;

use crate::lifecycle::error::{LifecycleError, LifecycleResult};

/// An OS notification the runner can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    #[serde(alias = "sigint")]
    Interrupt,
    #[serde(alias = "sigquit")]
    Quit,
    #[serde(alias = "sigterm")]
    Terminate,
    #[serde(alias = "sighup")]
    Hangup,
    #[serde(alias = "sigusr1")]
    User1,
    #[serde(alias = "sigusr2")]
    User2,
}

impl SignalKind {
    /// Kinds observed when nothing else is configured.
    pub const DEFAULTS: [SignalKind; 3] =
        [SignalKind::Interrupt, SignalKind::Quit, SignalKind::Terminate];

    /// Whether this kind asks the process to exit.
    pub fn is_termination(self) -> bool {
        matches!(
            self,
            SignalKind::Interrupt | SignalKind::Quit | SignalKind::Terminate
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SignalKind::Interrupt => "SIGINT",
            SignalKind::Quit => "SIGQUIT",
            SignalKind::Terminate => "SIGTERM",
            SignalKind::Hangup => "SIGHUP",
            SignalKind::User1 => "SIGUSR1",
            SignalKind::User2 => "SIGUSR2",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(unix)]
impl From<SignalKind> for tokio::signal::unix::SignalKind {
    fn from(kind: SignalKind) -> Self {
        use tokio::signal::unix::SignalKind as Unix;
        match kind {
            SignalKind::Interrupt => Unix::interrupt(),
            SignalKind::Quit => Unix::quit(),
            SignalKind::Terminate => Unix::terminate(),
            SignalKind::Hangup => Unix::hangup(),
            SignalKind::User1 => Unix::user_defined1(),
            SignalKind::User2 => Unix::user_defined2(),
        }
    }
}

/// Signals received for one run.
///
/// Dropping the subscription stops listening.
#[derive(Debug)]
pub struct SignalSubscription {
    rx: mpsc::Receiver<SignalKind>,
    forwarders: JoinSet<()>,
}

impl SignalSubscription {
    fn new(capacity: usize) -> (mpsc::Sender<SignalKind>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            tx,
            Self {
                rx,
                forwarders: JoinSet::new(),
            },
        )
    }

    /// Next received signal, or `None` once every forwarder has gone.
    pub async fn recv(&mut self) -> Option<SignalKind> {
        self.rx.recv().await
    }
}

/// Where a runner gets its signals from.
///
/// `subscribe` is called from inside the run, on the Tokio runtime.
pub trait SignalSource: Send + Sync {
    fn subscribe(&self, kinds: &[SignalKind]) -> LifecycleResult<SignalSubscription>;
}

/// Real process signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSignals;

impl SignalSource for OsSignals {
    #[cfg(unix)]
    fn subscribe(&self, kinds: &[SignalKind]) -> LifecycleResult<SignalSubscription> {
        use tokio::signal::unix::signal;

        let (tx, mut subscription) = SignalSubscription::new(kinds.len());
        for &kind in kinds {
            let mut stream = signal(kind.into())
                .map_err(|source| LifecycleError::Subscribe { signal: kind, source })?;
            let tx = tx.clone();
            subscription.forwarders.spawn(async move {
                while stream.recv().await.is_some() {
                    if tx.send(kind).await.is_err() {
                        break;
                    }
                }
            });
        }
        tracing::debug!(signals = ?kinds, "Subscribed to OS signals");
        Ok(subscription)
    }

    #[cfg(not(unix))]
    fn subscribe(&self, kinds: &[SignalKind]) -> LifecycleResult<SignalSubscription> {
        let (tx, mut subscription) = SignalSubscription::new(kinds.len());
        for &kind in kinds {
            if kind != SignalKind::Interrupt {
                return Err(LifecycleError::Subscribe {
                    signal: kind,
                    source: std::io::Error::new(
                        std::io::ErrorKind::Unsupported,
                        "only interrupt is available on this platform",
                    ),
                });
            }
            let tx = tx.clone();
            subscription.forwarders.spawn(async move {
                while tokio::signal::ctrl_c().await.is_ok() {
                    if tx.send(kind).await.is_err() {
                        break;
                    }
                }
            });
        }
        Ok(subscription)
    }
}

/// A signal source driven by hand.
///
/// Clones share the same channel, so a test can keep one clone and hand the
/// other to the runner.
#[derive(Debug, Clone)]
pub struct ManualSignals {
    tx: broadcast::Sender<SignalKind>,
}

impl ManualSignals {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Deliver `kind` to every live subscription. Returns how many received it.
    ///
    /// Subscriptions filter out kinds they were not configured for.
    pub fn send(&self, kind: SignalKind) -> usize {
        self.tx.send(kind).unwrap_or(0)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ManualSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalSource for ManualSignals {
    fn subscribe(&self, kinds: &[SignalKind]) -> LifecycleResult<SignalSubscription> {
        let (tx, mut subscription) = SignalSubscription::new(kinds.len());
        let mut incoming = self.tx.subscribe();
        let wanted = kinds.to_vec();
        subscription.forwarders.spawn(async move {
            loop {
                match incoming.recv().await {
                    Ok(kind) if wanted.contains(&kind) => {
                        if tx.send(kind).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn kinds_parse_from_config_names() {
        #[derive(Deserialize)]
        struct Kinds {
            kinds: Vec<SignalKind>,
        }

        let parsed: Kinds =
            toml::from_str(r#"kinds = ["interrupt", "sigterm", "hangup", "sigusr1"]"#).unwrap();
        assert_eq!(
            parsed.kinds,
            [
                SignalKind::Interrupt,
                SignalKind::Terminate,
                SignalKind::Hangup,
                SignalKind::User1
            ]
        );
    }

    #[test]
    fn termination_kinds() {
        for kind in SignalKind::DEFAULTS {
            assert!(kind.is_termination());
        }
        assert!(!SignalKind::Hangup.is_termination());
        assert_eq!(SignalKind::Terminate.to_string(), "SIGTERM");
    }

    #[tokio::test]
    async fn manual_source_filters_unsubscribed_kinds() {
        let source = ManualSignals::new();
        assert_eq!(source.send(SignalKind::Terminate), 0);

        let mut subscription = source.subscribe(&[SignalKind::Terminate]).unwrap();
        assert_eq!(source.subscriber_count(), 1);

        source.send(SignalKind::Hangup);
        source.send(SignalKind::Terminate);

        let received = tokio::time::timeout(Duration::from_secs(1), subscription.recv())
            .await
            .unwrap();
        assert_eq!(received, Some(SignalKind::Terminate));
    }

    #[tokio::test]
    async fn dropping_subscription_releases_source() {
        let source = ManualSignals::new();
        let subscription = source.subscribe(&SignalKind::DEFAULTS).unwrap();
        assert_eq!(source.subscriber_count(), 1);

        drop(subscription);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(source.subscriber_count(), 0);
    }
}
