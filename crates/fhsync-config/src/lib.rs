//! Application manifest for fhsync clients.
//!
//! Loads `fhconfig.toml` (file + `FH_*` environment), resolves where the
//! durable stores live, and translates the manifest into
//! `fhsync_core::ClientConfig`. The CLI layers its flag overrides on top.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use fhsync_core::{ClientConfig, FileStore, KeyValueStore, StorageError, TlsVerification};

/// Manifest file name, looked up in the platform config directory.
pub const MANIFEST_FILE: &str = "fhconfig.toml";
/// File backing the device identifier (and the token, for `token_store = "file"`).
pub const STORE_FILE: &str = "store.json";
/// Keyring service name used for session tokens.
pub const KEYRING_SERVICE: &str = "fhsync";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize manifest: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("manifest loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Manifest ────────────────────────────────────────────────────────

/// Where the session token is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStoreKind {
    /// Alongside the device id in the data directory.
    #[default]
    File,
    /// OS keyring (Keychain, Secret Service, Credential Manager).
    Keyring,
}

/// The application manifest (`fhconfig.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Manifest {
    /// Backend host, e.g. `https://myapp.feedhenry.com`.
    pub host: Option<String>,

    /// Application id, sent as `clientToken` when authenticating.
    pub appid: Option<String>,

    /// Backend environment name.
    pub environment: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Accept self-signed certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    #[serde(default)]
    pub token_store: TokenStoreKind,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            host: None,
            appid: None,
            environment: None,
            timeout: default_timeout(),
            insecure: false,
            ca_cert: None,
            token_store: TokenStoreKind::default(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "feedhenry", "fhsync")
}

/// Resolve the manifest path via XDG / platform conventions.
pub fn manifest_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join(MANIFEST_FILE),
        |dirs| dirs.config_dir().join(MANIFEST_FILE),
    )
}

/// Directory holding the durable key-value store.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("fhsync");
    p
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load the manifest from `path` + `FH_*` environment variables.
///
/// A missing file is not an error: the defaults (no host, no app id)
/// surface later as missing configuration during `init`.
pub fn load_manifest(path: &Path) -> Result<Manifest, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Manifest::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FH_").only(&[
            "host",
            "appid",
            "environment",
            "timeout",
            "insecure",
            "ca_cert",
            "token_store",
        ]));

    let manifest: Manifest = figment.extract()?;
    debug!(path = %path.display(), host = ?manifest.host, "manifest loaded");
    Ok(manifest)
}

/// Serialize the manifest to TOML at `path`, creating parent directories.
pub fn save_manifest(path: &Path, manifest: &Manifest) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(manifest)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ClientConfig` from the manifest.
///
/// The host is passed through unvalidated; an unusable host is reported
/// by `Client::init` as missing configuration.
pub fn manifest_to_client_config(manifest: &Manifest) -> Result<ClientConfig, ConfigError> {
    if manifest.timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least one second".into(),
        });
    }

    let tls = if manifest.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = manifest.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(ClientConfig {
        host: manifest.host.clone(),
        app_id: manifest.appid.clone(),
        environment: manifest.environment.clone(),
        tls,
        timeout: Duration::from_secs(manifest.timeout),
    })
}

// ── Stores ──────────────────────────────────────────────────────────

/// Durable stores for a client: device identity and session token.
pub struct Stores {
    pub device: Arc<dyn KeyValueStore>,
    pub token: Arc<dyn KeyValueStore>,
}

/// Open the stores the manifest asks for under `data_dir`.
pub fn open_stores(manifest: &Manifest, data_dir: &Path) -> Stores {
    let device: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(data_dir.join(STORE_FILE)));
    let token = match manifest.token_store {
        TokenStoreKind::File => Arc::clone(&device),
        TokenStoreKind::Keyring => {
            let account = manifest.appid.clone().unwrap_or_else(|| "default".into());
            Arc::new(KeyringStore::new(KEYRING_SERVICE, account)) as Arc<dyn KeyValueStore>
        }
    };
    Stores { device, token }
}

/// Session token storage in the OS keyring. Each key becomes its own
/// entry under `<account>/<key>`.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
    account: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, StorageError> {
        keyring::Entry::new(&self.service, &format!("{}/{key}", self.account))
            .map_err(|e| StorageError::Backend(e.to_string()))
    }
}

impl KeyValueStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StorageError::Backend(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| StorageError::Backend(e.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StorageError::Backend(e.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = load_manifest(&dir.path().join(MANIFEST_FILE)).unwrap();
        assert_eq!(manifest.timeout, 30);
        assert_eq!(manifest.token_store, TokenStoreKind::File);
        assert!(!manifest.insecure);
    }

    #[test]
    fn loads_toml_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        std::fs::write(
            &path,
            r#"
host = "https://myapp.example.test"
appid = "app-1"
timeout = 5
token_store = "keyring"
"#,
        )
        .unwrap();

        let manifest = load_manifest(&path).unwrap();
        assert_eq!(manifest.host.as_deref(), Some("https://myapp.example.test"));
        assert_eq!(manifest.appid.as_deref(), Some("app-1"));
        assert_eq!(manifest.timeout, 5);
        assert_eq!(manifest.token_store, TokenStoreKind::Keyring);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(MANIFEST_FILE);
        let manifest = Manifest {
            host: Some("https://myapp.example.test".into()),
            appid: Some("app-1".into()),
            environment: Some("dev".into()),
            ..Manifest::default()
        };

        save_manifest(&path, &manifest).unwrap();
        assert_eq!(load_manifest(&path).unwrap(), manifest);
    }

    #[test]
    fn bad_token_store_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        std::fs::write(&path, "token_store = \"cloud\"\n").unwrap();
        assert!(matches!(
            load_manifest(&path).unwrap_err(),
            ConfigError::Figment(_)
        ));
    }

    #[test]
    fn tls_follows_manifest() {
        let insecure = Manifest {
            insecure: true,
            ca_cert: Some("/tmp/ca.pem".into()),
            ..Manifest::default()
        };
        assert_eq!(
            manifest_to_client_config(&insecure).unwrap().tls,
            TlsVerification::DangerAcceptInvalid
        );

        let custom = Manifest {
            ca_cert: Some("/tmp/ca.pem".into()),
            ..Manifest::default()
        };
        assert_eq!(
            manifest_to_client_config(&custom).unwrap().tls,
            TlsVerification::CustomCa("/tmp/ca.pem".into())
        );

        assert_eq!(
            manifest_to_client_config(&Manifest::default()).unwrap().tls,
            TlsVerification::SystemDefaults
        );
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let manifest = Manifest {
            timeout: 0,
            ..Manifest::default()
        };
        assert!(matches!(
            manifest_to_client_config(&manifest).unwrap_err(),
            ConfigError::Validation { ref field, .. } if field == "timeout"
        ));
    }

    #[test]
    fn file_token_store_shares_device_store() {
        let dir = tempfile::tempdir().unwrap();
        let stores = open_stores(&Manifest::default(), dir.path());
        stores.token.set("sessionToken", "tok").unwrap();
        assert_eq!(
            stores.device.get("sessionToken").unwrap().as_deref(),
            Some("tok")
        );
        assert!(dir.path().join(STORE_FILE).exists());
    }
}
