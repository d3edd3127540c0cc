// fhsync-api: Async HTTP transport for FeedHenry / RHMAP mobile backends.

pub mod auth;
pub mod error;
pub mod executor;
pub mod request;
pub mod transport;

pub use auth::{AUTH_PATH, AuthGrant, AuthParams, AuthPayload, AuthReply};
pub use error::Error;
pub use executor::RequestExecutor;
pub use request::{HttpMethod, HttpRequest, Response};
pub use transport::{TlsMode, TransportConfig};
