// Request executor
//
// Wraps `reqwest::Client` with URL construction, header validation and
// response normalization. Every call resolves to exactly one
// `Result<Response, Error>`; nothing is retried here.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, trace};

use crate::error::Error;
use crate::request::{HttpRequest, Response, parse_body};
use crate::transport::TransportConfig;

/// Executes [`HttpRequest`]s against a backend.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    http: reqwest::Client,
}

impl RequestExecutor {
    /// Create an executor from a `TransportConfig`.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }

    /// Create an executor around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Send the request and normalize the answer.
    ///
    /// Non-2xx answers become [`Error::Status`] with the raw body so
    /// callers can still inspect structured error payloads.
    pub async fn execute(&self, request: &HttpRequest) -> Result<Response, Error> {
        let url = request.url()?;
        let headers = header_map(request)?;

        debug!(method = %request.method, %url, "sending request");

        let mut builder = self
            .http
            .request(request.method.into(), url)
            .headers(headers);
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let text = resp.text().await?;

        trace!(status = status.as_u16(), len = text.len(), "response received");

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(Response {
            status: status.as_u16(),
            headers,
            body: parse_body(&text),
            text,
        })
    }
}

fn header_map(request: &HttpRequest) -> Result<HeaderMap, Error> {
    let mut map = HeaderMap::with_capacity(request.headers.len());
    for (name, value) in &request.headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let mut header_value = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        if name.eq_ignore_ascii_case("x-fh-sessiontoken") {
            header_value.set_sensitive(true);
        }
        map.insert(header_name, header_value);
    }
    Ok(map)
}
