// ── Client facade ──
//
// The single entry point for host applications. Owns the session
// (Config + CloudProperties) lifecycle, the connectivity monitor, device
// identity and credential storage, and routes cloud calls through the
// request executor.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use fhsync_api::{HttpMethod, RequestExecutor, Response};
use secrecy::SecretString;
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::AuthRequest;
use crate::cloud::{CloudRequest, inject_metadata};
use crate::config::{ClientConfig, Config};
use crate::connectivity::{
    ConnectivityMonitor, ConnectivityState, Reachability, RouteReachability,
};
use crate::credentials::CredentialStore;
use crate::error::{CoreError, INIT_REGISTRATION_CODE};
use crate::identity::DeviceIdentity;
use crate::properties::CloudProperties;
use crate::storage::{KeyValueStore, MemoryStore};

/// Everything `init` resolved. Replaced wholesale by the next `init`.
#[derive(Debug)]
pub struct Session {
    pub config: Config,
    pub properties: CloudProperties,
}

/// Summary of the last failed `init`, kept for later inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitFailure {
    /// `0` for missing configuration, non-zero for structural failures.
    pub code: i32,
    pub message: String,
}

// ── Client ───────────────────────────────────────────────────────

/// Handle to one backend application.
///
/// Cheaply cloneable via `Arc<ClientInner>`; construct one per
/// application and pass it to whatever needs backend access.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    identity: DeviceIdentity,
    credentials: CredentialStore,
    monitor: ConnectivityMonitor,
    executor: RequestExecutor,
    session: ArcSwapOption<Session>,
    init_error: ArcSwapOption<InitFailure>,
}

impl Client {
    /// Client with in-memory storage and route-based reachability.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        ClientBuilder::new(config).build()
    }

    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    pub fn client_config(&self) -> &ClientConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Bootstrap a session against `uri` (or the configured host when
    /// `uri` is blank).
    ///
    /// Local only: builds the session config, starts reachability
    /// tracking and returns. No request is sent to the backend. On
    /// reachability failure the new session stays in place.
    pub fn init(&self, uri: &str) -> Result<(), CoreError> {
        match self.setup(uri) {
            Ok(()) => {
                self.inner.init_error.store(None);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "init failed");
                self.inner.init_error.store(Some(Arc::new(InitFailure {
                    code: e.code().unwrap_or(INIT_REGISTRATION_CODE),
                    message: e.to_string(),
                })));
                Err(e)
            }
        }
    }

    fn setup(&self, uri: &str) -> Result<(), CoreError> {
        let host = self.resolve_host(uri)?;
        let device_id = self.inner.identity.device_id()?;

        let cfg = &self.inner.config;
        let config = Config {
            backend_host: host.clone(),
            device_id,
            app_id: cfg.app_id.clone(),
            environment: cfg.environment.clone(),
        };
        let properties = CloudProperties::new(host, cfg.environment.clone());
        debug!(
            host = %properties.host,
            tracking_id = %properties.tracking_id,
            "session created"
        );
        self.inner
            .session
            .store(Some(Arc::new(Session { config, properties })));

        self.inner.monitor.start()?;

        info!(online = self.is_online(), "client initialized");
        Ok(())
    }

    fn resolve_host(&self, uri: &str) -> Result<Url, CoreError> {
        let raw = Some(uri.trim())
            .filter(|s| !s.is_empty())
            .or_else(|| {
                self.inner
                    .config
                    .host
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
            })
            .ok_or_else(|| CoreError::missing("host", "no backend host configured"))?;

        let url = Url::parse(raw)
            .map_err(|e| CoreError::missing("host", format!("invalid URL '{raw}': {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::missing(
                "host",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(url)
    }

    /// The failure recorded by the most recent `init`, if it failed.
    pub fn init_error(&self) -> Option<InitFailure> {
        self.inner.init_error.load_full().map(|f| (*f).clone())
    }

    // ── Requests ─────────────────────────────────────────────────

    /// Call a backend-defined path with the current session.
    ///
    /// Fails fast with [`CoreError::NotInitialized`] before a successful
    /// `init`. The device id is added to the body under `__fh`.
    pub async fn perform_cloud_request(
        &self,
        path: &str,
        method: HttpMethod,
        headers: Option<BTreeMap<String, String>>,
        body: Option<Map<String, Value>>,
    ) -> Result<Response, CoreError> {
        let session = self.session().ok_or(CoreError::NotInitialized)?;
        let body = inject_metadata(body, method, &session.config.device_id);

        let mut request = CloudRequest::new(session, path, method);
        if let Some(headers) = headers {
            request = request.headers(headers);
        }
        if let Some(body) = body {
            request = request.body(body);
        }
        request
            .exec(&self.inner.executor, &self.inner.credentials)
            .await
    }

    /// Start a login against `policy_id`.
    pub fn auth(&self, policy_id: impl Into<String>) -> AuthRequest {
        AuthRequest::new(self, policy_id)
    }

    /// Forget the stored session token. Local only; the backend is not told.
    pub fn logout(&self) -> Result<(), CoreError> {
        self.inner.credentials.clear()
    }

    // ── State observation ────────────────────────────────────────

    pub fn session(&self) -> Option<Arc<Session>> {
        self.inner.session.load_full()
    }

    pub fn cloud_properties(&self) -> Option<CloudProperties> {
        self.session().map(|s| s.properties.clone())
    }

    pub fn config(&self) -> Option<Config> {
        self.session().map(|s| s.config.clone())
    }

    pub fn device_id(&self) -> Result<String, CoreError> {
        self.inner.identity.device_id()
    }

    pub fn session_token(&self) -> Result<Option<SecretString>, CoreError> {
        self.inner.credentials.session_token()
    }

    /// `false` until reachability tracking reports a connection.
    pub fn is_online(&self) -> bool {
        self.inner.monitor.is_online()
    }

    pub fn connectivity_state(&self) -> ConnectivityState {
        self.inner.monitor.state()
    }

    /// Subscribe to connectivity changes.
    pub fn connectivity(&self) -> watch::Receiver<ConnectivityState> {
        self.inner.monitor.subscribe()
    }

    /// Wait up to `timeout` for a connection; [`CoreError::Offline`] otherwise.
    pub async fn wait_until_online(&self, timeout: Duration) -> Result<(), CoreError> {
        self.inner.monitor.wait_until_online(timeout).await
    }

    pub(crate) fn executor(&self) -> &RequestExecutor {
        &self.inner.executor
    }

    pub(crate) fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("session", &self.session())
            .field("monitor", &self.inner.monitor)
            .finish_non_exhaustive()
    }
}

// ── ClientBuilder ────────────────────────────────────────────────

/// Assembles a [`Client`] from its collaborators. Anything left unset
/// gets an in-process default.
pub struct ClientBuilder {
    config: ClientConfig,
    storage: Option<Arc<dyn KeyValueStore>>,
    token_storage: Option<Arc<dyn KeyValueStore>>,
    reachability: Option<Arc<dyn Reachability>>,
    executor: Option<RequestExecutor>,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            storage: None,
            token_storage: None,
            reachability: None,
            executor: None,
        }
    }

    /// Durable store for the device identifier (and the session token,
    /// unless [`token_storage`](Self::token_storage) is set).
    pub fn storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Separate store for the session token (e.g. an OS keyring).
    pub fn token_storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.token_storage = Some(storage);
        self
    }

    pub fn reachability(mut self, reachability: Arc<dyn Reachability>) -> Self {
        self.reachability = Some(reachability);
        self
    }

    /// Use a pre-built executor instead of one derived from the config.
    pub fn executor(mut self, executor: RequestExecutor) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn build(self) -> Result<Client, CoreError> {
        let executor = match self.executor {
            Some(executor) => executor,
            None => RequestExecutor::new(&self.config.transport())?,
        };
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let token_storage = self.token_storage.unwrap_or_else(|| Arc::clone(&storage));
        let reachability = self
            .reachability
            .unwrap_or_else(|| Arc::new(RouteReachability::default()));

        Ok(Client {
            inner: Arc::new(ClientInner {
                config: self.config,
                identity: DeviceIdentity::new(storage),
                credentials: CredentialStore::new(token_storage),
                monitor: ConnectivityMonitor::new(reachability),
                executor,
                session: ArcSwapOption::empty(),
                init_error: ArcSwapOption::empty(),
            }),
        })
    }
}
