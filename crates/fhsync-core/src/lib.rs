// fhsync-core: Client facade between fhsync-api and consumers (CLI, host apps).

pub mod auth;
pub mod client;
pub mod cloud;
pub mod config;
pub mod connectivity;
pub mod credentials;
pub mod error;
pub mod identity;
pub mod properties;
pub mod storage;

// ── Primary re-exports ──────────────────────────────────────────────
pub use auth::{AuthOutcome, AuthRequest, AuthState};
pub use client::{Client, ClientBuilder, InitFailure, Session};
pub use cloud::{CloudRequest, METADATA_KEY, SESSION_TOKEN_HEADER};
pub use config::{ClientConfig, Config, TlsVerification};
pub use connectivity::{
    ConnectionKind, ConnectivityMonitor, ConnectivityState, ManualReachability, Reachability,
    ReachabilityError, ReachabilityNotifier, RouteReachability,
};
pub use credentials::CredentialStore;
pub use error::{CoreError, INIT_REGISTRATION_CODE, MISSING_CONFIGURATION_CODE};
pub use identity::DeviceIdentity;
pub use properties::CloudProperties;
pub use storage::{
    DEVICE_ID_KEY, FileStore, KeyValueStore, MemoryStore, SESSION_TOKEN_KEY, StorageError,
};

// Transport types callers need to issue requests and read responses.
pub use fhsync_api::{Error as TransportError, HttpMethod, Response};
