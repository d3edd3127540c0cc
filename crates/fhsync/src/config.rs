//! CLI-specific config helpers.
//!
//! Wraps `fhsync_config` manifest loading with `GlobalOpts` overrides and
//! assembles the `Client` every backend command runs against.

use std::path::PathBuf;
use std::time::Duration;

use fhsync_config::{Manifest, open_stores};
use fhsync_core::{Client, ClientConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Manifest path: `--manifest` / `FH_MANIFEST`, else the platform default.
pub fn manifest_path(global: &GlobalOpts) -> PathBuf {
    global
        .manifest
        .clone()
        .unwrap_or_else(fhsync_config::manifest_path)
}

/// Store directory: `--data-dir` / `FH_DATA_DIR`, else the platform default.
pub fn data_dir(global: &GlobalOpts) -> PathBuf {
    global
        .data_dir
        .clone()
        .unwrap_or_else(fhsync_config::data_dir)
}

/// Load the manifest without applying any CLI overrides.
pub fn load_manifest(global: &GlobalOpts) -> Result<Manifest, CliError> {
    Ok(fhsync_config::load_manifest(&manifest_path(global))?)
}

/// Manifest-derived client config with CLI flags applied on top.
pub fn client_config(global: &GlobalOpts, manifest: &Manifest) -> Result<ClientConfig, CliError> {
    let mut config = fhsync_config::manifest_to_client_config(manifest)?;

    if let Some(ref host) = global.host {
        config.host = Some(host.clone());
    }
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least one second".into(),
            });
        }
        config.timeout = Duration::from_secs(secs);
    }
    Ok(config)
}

/// Build a `Client` backed by the on-disk stores.
pub fn build_client(global: &GlobalOpts) -> Result<Client, CliError> {
    let manifest = load_manifest(global)?;
    let config = client_config(global, &manifest)?;
    let stores = open_stores(&manifest, &data_dir(global));

    let client = Client::builder(config)
        .storage(stores.device)
        .token_storage(stores.token)
        .build()?;
    Ok(client)
}
