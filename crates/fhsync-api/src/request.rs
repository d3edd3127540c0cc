// Request and response value types shared by every backend call.

use std::collections::BTreeMap;

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};
use url::Url;

use crate::error::Error;

/// HTTP methods accepted by cloud endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    Get,
    Head,
    Delete,
    #[default]
    Post,
    Put,
}

impl HttpMethod {
    /// Whether requests with this method carry a JSON body.
    pub fn has_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Delete)
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Head => Self::HEAD,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
        }
    }
}

/// A fully described backend call: `(method, host, path, headers, body)`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub host: Url,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, host: Url, path: impl Into<String>) -> Self {
        Self {
            method,
            host,
            path: path.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// The absolute URL: host with `path` appended.
    ///
    /// The host may carry its own path prefix (`https://host/app`); exactly
    /// one `/` separates it from `path`.
    pub fn url(&self) -> Result<Url, Error> {
        let base = self.host.as_str().trim_end_matches('/');
        let path = self.path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }
}

/// Normalized result of a successful (2xx) round trip.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: HeaderMap,
    /// The body parsed as JSON, when it is JSON.
    pub body: Option<Value>,
    /// The raw body text.
    pub text: String,
}

impl Response {
    pub fn parsed_body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Deserialize the body into a concrete type.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let value = self.body.clone().unwrap_or(Value::Null);
        serde_json::from_value(value).map_err(|e| Error::UnexpectedResponse {
            message: e.to_string(),
            body: self.text.clone(),
        })
    }
}

/// Parse a response body: empty → `None`, JSON → `Some(value)`,
/// anything else → `None` (the raw text stays available).
pub(crate) fn parse_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    serde_json::from_str(text).ok()
}
