// Auth policy endpoint
//
// Wire types for `POST /box/srv/1.1/admin/authpolicy/auth` and the
// executor method that drives it. The reply is validated at this
// boundary into a discriminated type; callers never poke at raw JSON.

use std::collections::BTreeMap;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::executor::RequestExecutor;
use crate::request::{HttpMethod, HttpRequest, parse_body};

/// Path of the auth policy endpoint, relative to the backend host.
pub const AUTH_PATH: &str = "box/srv/1.1/admin/authpolicy/auth";

/// Request body for the auth policy endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    /// Backend auth policy (e.g. `FEEDHENRY`, `OAUTH2`, `MBAAS`).
    pub policy_id: String,
    /// Device identifier (cuid).
    pub device: String,
    /// Application id from the manifest.
    pub client_token: String,
    pub params: AuthParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

/// User credentials nested under `params`. Serializes as `{}` when the
/// policy does not take a username/password.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthParams {
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_secret"
    )]
    pub password: Option<SecretString>,
}

impl AuthParams {
    /// Both halves are required; a lone username or password is dropped.
    pub fn new(user_id: Option<String>, password: Option<SecretString>) -> Self {
        match (user_id, password) {
            (Some(user_id), Some(password)) => Self {
                user_id: Some(user_id),
                password: Some(password),
            },
            _ => Self::default(),
        }
    }
}

#[allow(clippy::ref_option)]
fn serialize_secret<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => serializer.serialize_str(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

/// Reply from the auth policy endpoint, discriminated by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AuthReply {
    Ok {
        #[serde(rename = "sessionToken", default)]
        session_token: Option<String>,
        /// Interactive continuation URL (OAuth-style policies).
        #[serde(default)]
        url: Option<String>,
    },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

impl AuthReply {
    /// Validate a raw body. Anything that is not a recognized shape is
    /// an [`Error::UnexpectedResponse`].
    pub fn parse(body: &str) -> Result<Self, Error> {
        let value = parse_body(body).ok_or_else(|| Error::UnexpectedResponse {
            message: "auth reply is not a JSON document".into(),
            body: body.to_owned(),
        })?;
        serde_json::from_value(value).map_err(|e| Error::UnexpectedResponse {
            message: format!("unrecognized auth reply: {e}"),
            body: body.to_owned(),
        })
    }

    /// Collapse the reply into a grant, turning a rejection into
    /// [`Error::Authentication`]. An empty token counts as no token.
    pub fn into_grant(self) -> Result<AuthGrant, Error> {
        match self {
            Self::Ok { session_token, url } => {
                match (session_token.filter(|t| !t.is_empty()), url) {
                    (Some(token), _) => Ok(AuthGrant::Session { token: Some(token) }),
                    (None, Some(url)) => Ok(AuthGrant::Redirect { url }),
                    (None, None) => Ok(AuthGrant::Session { token: None }),
                }
            }
            Self::Error { message } => Err(Error::Authentication {
                message: message.unwrap_or_default(),
            }),
        }
    }
}

/// What a successful auth round trip handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthGrant {
    /// Authenticated; some policies issue no token.
    Session { token: Option<String> },
    /// The policy wants an interactive (browser) continuation.
    Redirect { url: String },
}

impl RequestExecutor {
    /// Run the auth policy call against `host`, sending `headers` along.
    ///
    /// A `{"status":"error"}` body is honoured whatever the HTTP status,
    /// since some backends pair it with 401.
    pub async fn authenticate(
        &self,
        host: &Url,
        headers: &BTreeMap<String, String>,
        payload: &AuthPayload,
    ) -> Result<AuthGrant, Error> {
        let body = serde_json::to_value(payload).map_err(|e| Error::UnexpectedResponse {
            message: format!("failed to encode auth payload: {e}"),
            body: String::new(),
        })?;
        let request = HttpRequest::new(HttpMethod::Post, host.clone(), AUTH_PATH)
            .headers(headers.clone())
            .body(body);

        debug!(policy = %payload.policy_id, "authenticating");

        match self.execute(&request).await {
            Ok(resp) => AuthReply::parse(&resp.text)?.into_grant(),
            Err(Error::Status { status, body }) => match AuthReply::parse(&body) {
                Ok(reply @ AuthReply::Error { .. }) => reply.into_grant(),
                _ => Err(Error::Status { status, body }),
            },
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(params: AuthParams, environment: Option<&str>) -> AuthPayload {
        AuthPayload {
            policy_id: "FEEDHENRY".into(),
            device: "device-1".into(),
            client_token: "app-1".into(),
            params,
            environment: environment.map(String::from),
        }
    }

    #[test]
    fn payload_with_credentials() {
        let params = AuthParams::new(Some("u".into()), Some(SecretString::from("p".to_owned())));
        let value = serde_json::to_value(payload(params, Some("dev"))).unwrap();
        assert_eq!(
            value,
            json!({
                "policyId": "FEEDHENRY",
                "device": "device-1",
                "clientToken": "app-1",
                "params": { "userId": "u", "password": "p" },
                "environment": "dev"
            })
        );
    }

    #[test]
    fn payload_without_credentials_has_empty_params() {
        let params = AuthParams::new(Some("u".into()), None);
        let value = serde_json::to_value(payload(params, None)).unwrap();
        assert_eq!(value["params"], json!({}));
        assert!(value.get("environment").is_none());
    }

    #[test]
    fn reply_shapes() {
        let ok = AuthReply::parse(r#"{"status":"ok","sessionToken":"tok123"}"#).unwrap();
        assert_eq!(
            ok.into_grant().unwrap(),
            AuthGrant::Session {
                token: Some("tok123".into())
            }
        );

        let redirect = AuthReply::parse(r#"{"status":"ok","url":"https://idp.test/login"}"#).unwrap();
        assert_eq!(
            redirect.into_grant().unwrap(),
            AuthGrant::Redirect {
                url: "https://idp.test/login".into()
            }
        );

        let rejected = AuthReply::parse(r#"{"status":"error","message":"bad creds"}"#).unwrap();
        match rejected.into_grant() {
            Err(Error::Authentication { message }) => assert_eq!(message, "bad creds"),
            other => panic!("expected Authentication error, got: {other:?}"),
        }
    }

    #[test]
    fn empty_token_is_no_token() {
        let reply = AuthReply::parse(r#"{"status":"ok","sessionToken":""}"#).unwrap();
        assert_eq!(reply.into_grant().unwrap(), AuthGrant::Session { token: None });
    }

    #[test]
    fn unknown_shapes_are_unexpected() {
        for body in [r#"{"status":"maybe"}"#, r#"{"token":"x"}"#, "[]", "<html/>", ""] {
            assert!(
                matches!(AuthReply::parse(body), Err(Error::UnexpectedResponse { .. })),
                "body {body:?} should be rejected"
            );
        }
    }
}
