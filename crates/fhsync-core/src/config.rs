// ── Runtime client configuration ──
//
// `ClientConfig` carries the manifest values and transport tuning; it
// never touches disk. `fhsync-config` (or the embedding application)
// builds one and hands it in. `Config` is the per-session view resolved
// during `init`.

use std::collections::BTreeMap;
use std::time::Duration;

use fhsync_api::{TlsMode, TransportConfig};
use url::Url;

const SDK_VERSION: &str = concat!("FH_RUST_SDK/", env!("CARGO_PKG_VERSION"));

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed development clusters).
    DangerAcceptInvalid,
}

/// Manifest values plus transport settings for a [`Client`](crate::Client).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend host from the manifest; `init(uri)` overrides it.
    pub host: Option<String>,
    /// Application id (sent as `clientToken` on auth calls).
    pub app_id: Option<String>,
    /// Backend environment name, forwarded on auth calls when set.
    pub environment: Option<String>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: None,
            app_id: None,
            environment: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}

/// Session configuration: backend host and device identity, plus the
/// manifest values requests need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend_host: Url,
    pub device_id: String,
    pub app_id: Option<String>,
    pub environment: Option<String>,
}

impl Config {
    /// Parameter bag sent with every outbound call.
    pub fn params(&self) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        params.insert("destination", std::env::consts::OS.to_owned());
        params.insert("cuid", self.device_id.clone());
        params.insert("sdk_version", SDK_VERSION.to_owned());
        if let Some(ref app_id) = self.app_id {
            params.insert("appid", app_id.clone());
        }
        params
    }

    /// The parameter bag as `X-FH-<name>` headers.
    pub fn params_as_headers(&self) -> impl Iterator<Item = (String, String)> {
        self.params()
            .into_iter()
            .map(|(name, value)| (format!("X-FH-{name}"), value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(app_id: Option<&str>) -> Config {
        Config {
            backend_host: Url::parse("https://api.example.test").unwrap(),
            device_id: "device-1".into(),
            app_id: app_id.map(String::from),
            environment: None,
        }
    }

    #[test]
    fn params_carry_device_id() {
        let params = config(None).params();
        assert_eq!(params["cuid"], "device-1");
        assert_eq!(params["destination"], std::env::consts::OS);
        assert!(params["sdk_version"].starts_with("FH_RUST_SDK/"));
        assert!(!params.contains_key("appid"));
    }

    #[test]
    fn headers_are_prefixed() {
        let headers: BTreeMap<String, String> = config(Some("app-1")).params_as_headers().collect();
        assert_eq!(headers["X-FH-cuid"], "device-1");
        assert_eq!(headers["X-FH-appid"], "app-1");
    }
}
