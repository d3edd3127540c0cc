// ── Connectivity monitor ──
//
// Tracks whether the device currently has a network route. State changes
// are pushed by a `Reachability` provider (the platform's network-change
// notifications); the monitor never polls. Registration with the provider
// happens at most once per monitor.

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use strum::Display;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, trace};

use crate::error::CoreError;

/// Kind of connection reported by a reachability provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionKind {
    None,
    Wifi,
    Cellular,
    Ethernet,
    /// A route exists but the provider cannot tell what carries it.
    Other,
}

/// Online/offline state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ConnectivityState {
    #[default]
    Unknown,
    Online,
    Offline,
}

impl From<ConnectionKind> for ConnectivityState {
    fn from(kind: ConnectionKind) -> Self {
        match kind {
            ConnectionKind::None => Self::Offline,
            _ => Self::Online,
        }
    }
}

/// Failure to register with the platform's reachability facility.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ReachabilityError(pub String);

/// Handle a provider uses to push connection changes into the monitor.
#[derive(Debug, Clone)]
pub struct ReachabilityNotifier {
    tx: Arc<watch::Sender<ConnectivityState>>,
}

impl ReachabilityNotifier {
    /// Report the current connection kind.
    pub fn notify(&self, kind: ConnectionKind) {
        let next = ConnectivityState::from(kind);
        let changed = self.tx.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
        if changed {
            debug!(%kind, state = %next, "connectivity changed");
        }
    }
}

/// Platform reachability facility.
pub trait Reachability: Send + Sync {
    /// Start delivering connection changes through `notifier`.
    ///
    /// Implementations should report the current kind before returning.
    fn start_notifier(&self, notifier: ReachabilityNotifier) -> Result<(), ReachabilityError>;
}

// ── ConnectivityMonitor ──────────────────────────────────────────────

pub struct ConnectivityMonitor {
    provider: Arc<dyn Reachability>,
    started: AtomicBool,
    tx: Arc<watch::Sender<ConnectivityState>>,
}

impl ConnectivityMonitor {
    pub fn new(provider: Arc<dyn Reachability>) -> Self {
        let (tx, _) = watch::channel(ConnectivityState::Unknown);
        Self {
            provider,
            started: AtomicBool::new(false),
            tx: Arc::new(tx),
        }
    }

    /// Register with the provider. No-op once registration succeeded;
    /// a failed registration may be retried by calling `start` again.
    pub fn start(&self) -> Result<(), CoreError> {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            trace!("reachability notifier already started");
            return Ok(());
        }

        let notifier = ReachabilityNotifier {
            tx: Arc::clone(&self.tx),
        };
        match self.provider.start_notifier(notifier) {
            Ok(()) => {
                info!(state = %self.state(), "reachability notifier started");
                Ok(())
            }
            Err(e) => {
                self.started.store(false, Ordering::Release);
                Err(CoreError::InitRegistration {
                    reason: e.to_string(),
                })
            }
        }
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    pub fn state(&self) -> ConnectivityState {
        *self.tx.borrow()
    }

    /// `false` until the provider reports a connection.
    pub fn is_online(&self) -> bool {
        self.state() == ConnectivityState::Online
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectivityState> {
        self.tx.subscribe()
    }

    /// Wait for the provider to report a connection.
    pub async fn wait_until_online(&self, timeout: Duration) -> Result<(), CoreError> {
        let mut rx = self.subscribe();
        match tokio::time::timeout(timeout, rx.wait_for(|s| *s == ConnectivityState::Online)).await
        {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) | Err(_) => Err(CoreError::Offline),
        }
    }
}

impl std::fmt::Debug for ConnectivityMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectivityMonitor")
            .field("started", &self.is_started())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// ── RouteReachability ────────────────────────────────────────────────

/// Default probe target. Connecting a UDP socket only consults the
/// routing table; nothing is sent.
const DEFAULT_PROBE: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)),
    53,
);

/// Reachability derived from the host routing table.
///
/// The host application calls [`notify_changed`](Self::notify_changed)
/// from its OS network-change hook; each call re-reads the route.
#[derive(Debug)]
pub struct RouteReachability {
    probe: SocketAddr,
    notifier: Mutex<Option<ReachabilityNotifier>>,
}

impl Default for RouteReachability {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE)
    }
}

impl RouteReachability {
    pub fn new(probe: SocketAddr) -> Self {
        Self {
            probe,
            notifier: Mutex::new(None),
        }
    }

    fn probe(&self) -> Result<ConnectionKind, ReachabilityError> {
        let bind: SocketAddr = if self.probe.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(bind)
            .map_err(|e| ReachabilityError(format!("cannot open probe socket: {e}")))?;
        Ok(match socket.connect(self.probe) {
            Ok(()) => ConnectionKind::Other,
            Err(_) => ConnectionKind::None,
        })
    }

    /// Re-read the route and report it. Ignored before registration.
    pub fn notify_changed(&self) {
        let guard = self.notifier.lock().expect("reachability lock poisoned");
        let Some(ref notifier) = *guard else { return };
        match self.probe() {
            Ok(kind) => notifier.notify(kind),
            Err(e) => debug!(error = %e, "route probe failed"),
        }
    }
}

impl Reachability for RouteReachability {
    fn start_notifier(&self, notifier: ReachabilityNotifier) -> Result<(), ReachabilityError> {
        let kind = self.probe()?;
        notifier.notify(kind);
        *self.notifier.lock().expect("reachability lock poisoned") = Some(notifier);
        Ok(())
    }
}

// ── ManualReachability ───────────────────────────────────────────────

/// Provider driven entirely by the embedding application (or tests).
#[derive(Debug)]
pub struct ManualReachability {
    kind: Mutex<ConnectionKind>,
    failure: Option<String>,
    starts: AtomicUsize,
    notifier: Mutex<Option<ReachabilityNotifier>>,
}

impl ManualReachability {
    pub fn new(kind: ConnectionKind) -> Self {
        Self {
            kind: Mutex::new(kind),
            failure: None,
            starts: AtomicUsize::new(0),
            notifier: Mutex::new(None),
        }
    }

    /// A provider whose registration always fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::new(ConnectionKind::None)
        }
    }

    /// Change the reported connection kind.
    pub fn set(&self, kind: ConnectionKind) {
        *self.kind.lock().expect("reachability lock poisoned") = kind;
        if let Some(ref notifier) = *self.notifier.lock().expect("reachability lock poisoned") {
            notifier.notify(kind);
        }
    }

    /// How many times registration was attempted.
    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::Acquire)
    }
}

impl Reachability for ManualReachability {
    fn start_notifier(&self, notifier: ReachabilityNotifier) -> Result<(), ReachabilityError> {
        self.starts.fetch_add(1, Ordering::AcqRel);
        if let Some(ref reason) = self.failure {
            return Err(ReachabilityError(reason.clone()));
        }
        notifier.notify(*self.kind.lock().expect("reachability lock poisoned"));
        *self.notifier.lock().expect("reachability lock poisoned") = Some(notifier);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn offline_until_started() {
        let monitor = ConnectivityMonitor::new(Arc::new(ManualReachability::new(
            ConnectionKind::Wifi,
        )));
        assert_eq!(monitor.state(), ConnectivityState::Unknown);
        assert!(!monitor.is_online());

        monitor.start().unwrap();
        assert!(monitor.is_online());
    }

    #[test]
    fn start_is_idempotent() {
        let provider = Arc::new(ManualReachability::new(ConnectionKind::Cellular));
        let monitor = ConnectivityMonitor::new(Arc::clone(&provider) as Arc<dyn Reachability>);
        monitor.start().unwrap();
        monitor.start().unwrap();
        assert_eq!(provider.start_count(), 1);
    }

    #[test]
    fn failed_start_can_be_retried() {
        let provider = Arc::new(ManualReachability::failing("no notifier"));
        let monitor = ConnectivityMonitor::new(Arc::clone(&provider) as Arc<dyn Reachability>);

        let err = monitor.start().unwrap_err();
        assert!(matches!(err, CoreError::InitRegistration { ref reason } if reason == "no notifier"));
        assert!(!monitor.is_started());

        assert!(monitor.start().is_err());
        assert_eq!(provider.start_count(), 2);
    }

    #[test]
    fn transitions_follow_notifications() {
        let provider = Arc::new(ManualReachability::new(ConnectionKind::Wifi));
        let monitor = ConnectivityMonitor::new(Arc::clone(&provider) as Arc<dyn Reachability>);
        monitor.start().unwrap();
        let rx = monitor.subscribe();

        provider.set(ConnectionKind::None);
        assert_eq!(*rx.borrow(), ConnectivityState::Offline);
        provider.set(ConnectionKind::Ethernet);
        assert!(monitor.is_online());
    }

    #[tokio::test]
    async fn wait_until_online_times_out() {
        let monitor = ConnectivityMonitor::new(Arc::new(ManualReachability::new(
            ConnectionKind::None,
        )));
        monitor.start().unwrap();
        let err = monitor
            .wait_until_online(Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Offline));
    }

    #[tokio::test]
    async fn wait_until_online_wakes_on_change() {
        let provider = Arc::new(ManualReachability::new(ConnectionKind::None));
        let monitor = ConnectivityMonitor::new(Arc::clone(&provider) as Arc<dyn Reachability>);
        monitor.start().unwrap();

        let waiter = monitor.wait_until_online(Duration::from_secs(5));
        provider.set(ConnectionKind::Wifi);
        waiter.await.unwrap();
    }

    #[test]
    fn route_probe_reports_something() {
        let provider = Arc::new(RouteReachability::default());
        let monitor = ConnectivityMonitor::new(Arc::clone(&provider) as Arc<dyn Reachability>);
        monitor.start().unwrap();
        assert_ne!(monitor.state(), ConnectivityState::Unknown);
        provider.notify_changed();
    }
}
