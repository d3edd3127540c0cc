//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use fhsync_config::ConfigError;
use fhsync_core::{CoreError, TransportError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Init ─────────────────────────────────────────────────────────

    #[error("Offline")]
    #[diagnostic(
        code(fhsync::offline),
        help("No network connection was reported. Check connectivity and retry.")
    )]
    Offline,

    #[error("Init error (code {code}): {reason}")]
    #[diagnostic(code(fhsync::init_error))]
    InitError { code: i32, reason: String },

    #[error("Missing configuration: {field}")]
    #[diagnostic(
        code(fhsync::missing_configuration),
        help(
            "{reason}\n\
             Set `{field}` in the manifest (see: fhsync config path), or run: fhsync config init"
        )
    )]
    MissingConfiguration { field: String, reason: String },

    // ── Requests ─────────────────────────────────────────────────────

    #[error("Could not reach the backend")]
    #[diagnostic(
        code(fhsync::connection_failed),
        help(
            "Check the host in your manifest and your network connection.\n\
             Self-signed clusters need --insecure (-k) or ca_cert in the manifest."
        )
    )]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(fhsync::auth_failed),
        help("Verify the policy id and credentials, then run: fhsync auth <POLICY> --user <USER>")
    )]
    AuthFailed { message: String },

    #[error("Backend returned HTTP {status}")]
    #[diagnostic(code(fhsync::http_status), help("{body}"))]
    HttpStatus { status: u16, body: String },

    #[error("API error: {message}")]
    #[diagnostic(code(fhsync::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fhsync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration / storage ──────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(fhsync::config))]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    #[diagnostic(
        code(fhsync::storage),
        help("Check that the data directory is writable (see --data-dir).")
    )]
    Storage(String),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(fhsync::json), help("The request body must be a JSON object."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Offline | Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::MissingConfiguration { .. } | Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────
//
// Init failures are classified the way a host application reports them:
// offline, structural init error (code > 0), or missing configuration
// (code 0).

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotInitialized => CliError::InitError {
                code: fhsync_core::INIT_REGISTRATION_CODE,
                reason: err.to_string(),
            },

            CoreError::Offline => CliError::Offline,

            CoreError::MissingConfiguration { field, reason } => {
                CliError::MissingConfiguration { field, reason }
            }

            CoreError::InitRegistration { reason } => CliError::InitError {
                code: fhsync_core::INIT_REGISTRATION_CODE,
                reason,
            },

            CoreError::Auth { message } => CliError::AuthFailed { message },

            CoreError::UnexpectedResponse { message } => CliError::ApiError { message },

            CoreError::Transport(TransportError::Status { status, body }) => {
                CliError::HttpStatus { status, body }
            }

            CoreError::Transport(inner) if inner.is_transport() => CliError::ConnectionFailed {
                source: Box::new(inner),
            },

            CoreError::Transport(inner) => CliError::ApiError {
                message: inner.to_string(),
            },

            CoreError::Storage(e) => CliError::Storage(e.to_string()),
        }
    }
}
