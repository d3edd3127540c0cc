// ── Cloud requests ──
//
// Authenticated calls to backend-defined paths. The device parameters go
// out as `X-FH-*` headers and the stored session token, when present, as
// `X-FH-sessionToken`.

use std::collections::BTreeMap;
use std::sync::Arc;

use fhsync_api::{HttpMethod, HttpRequest, RequestExecutor, Response};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::client::Session;
use crate::credentials::CredentialStore;
use crate::error::CoreError;

/// Header carrying the session token.
pub const SESSION_TOKEN_HEADER: &str = "X-FH-sessionToken";
/// Reserved body key for SDK metadata.
pub const METADATA_KEY: &str = "__fh";

/// A single call to `{host}{path}`.
#[derive(Debug, Clone)]
pub struct CloudRequest {
    session: Arc<Session>,
    path: String,
    method: HttpMethod,
    headers: BTreeMap<String, String>,
    body: Option<Value>,
}

impl CloudRequest {
    pub fn new(session: Arc<Session>, path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            session,
            path: path.into(),
            method,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Assemble the HTTP request. SDK headers win over caller headers of
    /// the same name.
    pub(crate) fn build(&self, token: Option<&SecretString>) -> HttpRequest {
        let mut request = HttpRequest::new(
            self.method,
            self.session.properties.host.clone(),
            self.path.clone(),
        )
        .headers(self.headers.clone())
        .headers(self.session.config.params_as_headers());

        if let Some(token) = token {
            request = request.header(SESSION_TOKEN_HEADER, token.expose_secret());
        }
        if let Some(ref body) = self.body {
            request = request.body(body.clone());
        }
        request
    }

    pub async fn exec(
        &self,
        executor: &RequestExecutor,
        credentials: &CredentialStore,
    ) -> Result<Response, CoreError> {
        let token = credentials.session_token()?;
        let request = self.build(token.as_ref());

        debug!(
            method = %self.method,
            path = %self.path,
            authenticated = token.is_some(),
            "cloud request"
        );

        Ok(executor.execute(&request).await?)
    }
}

/// Insert `{"__fh": {"cuid": device_id}}` into a request body.
///
/// A caller body always gets the metadata. A missing body becomes an
/// object holding only the metadata, except for methods without a body.
pub fn inject_metadata(
    body: Option<Map<String, Value>>,
    method: HttpMethod,
    device_id: &str,
) -> Option<Value> {
    let mut body = match body {
        Some(body) => body,
        None if method.has_body() => Map::new(),
        None => return None,
    };
    body.insert(METADATA_KEY.to_owned(), json!({ "cuid": device_id }));
    Some(Value::Object(body))
}
