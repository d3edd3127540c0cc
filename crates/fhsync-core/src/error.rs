// ── Core error types ──
//
// Errors surfaced by the client facade. Transport failures are passed
// through untouched; the auth and payload-shape variants of
// `fhsync_api::Error` are lifted into domain variants here.

use thiserror::Error;

use crate::storage::StorageError;

/// Error code reported when the manifest host or app id is missing.
pub const MISSING_CONFIGURATION_CODE: i32 = 0;
/// Error code reported when reachability registration fails.
pub const INIT_REGISTRATION_CODE: i32 = 1;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Client is not initialized: call init() before issuing cloud requests")]
    NotInitialized,

    #[error("Missing configuration: {field} ({reason})")]
    MissingConfiguration { field: String, reason: String },

    #[error("Unable to start reachability notifier: {reason}")]
    InitRegistration { reason: String },

    #[error("Device is offline")]
    Offline,

    // ── Requests ─────────────────────────────────────────────────────
    #[error(transparent)]
    Transport(fhsync_api::Error),

    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Unexpected response from backend: {message}")]
    UnexpectedResponse { message: String },

    // ── Storage ──────────────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CoreError {
    /// Numeric code used by hosts to classify init failures.
    ///
    /// `0` means "no host / app id configured", anything greater is a
    /// structural failure. `None` for errors that are not init failures.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::MissingConfiguration { .. } => Some(MISSING_CONFIGURATION_CODE),
            Self::InitRegistration { .. } => Some(INIT_REGISTRATION_CODE),
            _ => None,
        }
    }

    pub(crate) fn missing(field: &str, reason: impl Into<String>) -> Self {
        Self::MissingConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fhsync_api::Error> for CoreError {
    fn from(err: fhsync_api::Error) -> Self {
        match err {
            fhsync_api::Error::Authentication { message } => CoreError::Auth { message },
            fhsync_api::Error::UnexpectedResponse { message, body: _ } => {
                CoreError::UnexpectedResponse { message }
            }
            other => CoreError::Transport(other),
        }
    }
}
