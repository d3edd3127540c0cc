use thiserror::Error;

/// Top-level error type for the `fhsync-api` crate.
///
/// Covers every failure mode of a single backend round trip: transport,
/// HTTP status, and payload shape. `fhsync-core` maps the domain-relevant
/// variants (authentication, unexpected payloads) into its own taxonomy
/// and passes the rest through unchanged.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The auth policy endpoint rejected the credentials
    /// (`{"status": "error", "message": ...}`).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// A caller-supplied header name or value is not valid HTTP.
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    // ── Response ────────────────────────────────────────────────────
    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend answered successfully but the payload shape is not
    /// one this client understands.
    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String, body: String },
}

impl Error {
    /// Returns `true` if the error came from the network layer rather
    /// than from the backend's answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Tls(_))
    }

    /// Returns `true` if this is a transient error a caller-level retry
    /// policy might want to repeat.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The HTTP status code, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
