// ── Policy-based login ──
//
// `AuthRequest` drives one login against the auth policy endpoint and
// records where it ended up:
//
//   Idle → Requesting → Authenticated
//                     → Pending { url }   (interactive continuation, reserved)
//                     → Failed
//
// A successful login persists the issued session token; every other
// outcome leaves the credential store untouched.

use std::collections::BTreeMap;

use fhsync_api::{AuthGrant, AuthParams, AuthPayload};
use secrecy::SecretString;
use tracing::{info, warn};

use crate::client::{Client, Session};
use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Idle,
    Requesting,
    Authenticated,
    /// The policy asked for an interactive (browser) continuation at
    /// `url`. The continuation itself is not performed by this crate.
    Pending { url: String },
    Failed,
}

/// Successful end states of [`AuthRequest::exec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Logged in. `token_stored` is false for policies that issue no token.
    Authenticated { token_stored: bool },
    /// Interactive continuation required at `url`.
    Pending { url: String },
}

/// One login attempt against a backend auth policy.
#[derive(Debug)]
pub struct AuthRequest {
    client: Client,
    policy_id: String,
    user_name: Option<String>,
    password: Option<SecretString>,
    state: AuthState,
}

impl AuthRequest {
    /// `policy_id` selects the backend strategy (`FEEDHENRY`, `OAUTH2`, `MBAAS`, ...).
    pub fn new(client: &Client, policy_id: impl Into<String>) -> Self {
        Self {
            client: client.clone(),
            policy_id: policy_id.into(),
            user_name: None,
            password: None,
            state: AuthState::Idle,
        }
    }

    pub fn credentials(mut self, user_name: impl Into<String>, password: SecretString) -> Self {
        self.user_name = Some(user_name.into());
        self.password = Some(password);
        self
    }

    pub fn policy_id(&self) -> &str {
        &self.policy_id
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    fn payload(&self, session: &Session) -> Result<AuthPayload, CoreError> {
        let client_token = session
            .config
            .app_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CoreError::missing("appid", "no application id configured"))?;

        Ok(AuthPayload {
            policy_id: self.policy_id.clone(),
            device: session.config.device_id.clone(),
            client_token,
            params: AuthParams::new(self.user_name.clone(), self.password.clone()),
            environment: session.properties.environment.clone(),
        })
    }

    /// Run the login. Resolves exactly once, into an [`AuthOutcome`] or
    /// an error; `state()` reflects the end state afterwards.
    pub async fn exec(&mut self) -> Result<AuthOutcome, CoreError> {
        let session = self.client.session().ok_or(CoreError::NotInitialized)?;

        let payload = match self.payload(&session) {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail(e)),
        };

        let headers: BTreeMap<String, String> = session.config.params_as_headers().collect();

        self.state = AuthState::Requesting;
        let grant = self
            .client
            .executor()
            .authenticate(&session.properties.host, &headers, &payload)
            .await;

        match grant {
            Ok(AuthGrant::Session { token }) => {
                if let Some(ref token) = token {
                    if let Err(e) = self.client.credentials().set_session_token(token) {
                        return Err(self.fail(e));
                    }
                }
                self.state = AuthState::Authenticated;
                info!(policy = %self.policy_id, "authenticated");
                Ok(AuthOutcome::Authenticated {
                    token_stored: token.is_some(),
                })
            }
            Ok(AuthGrant::Redirect { url }) => {
                info!(policy = %self.policy_id, %url, "interactive authentication requested");
                self.state = AuthState::Pending { url: url.clone() };
                Ok(AuthOutcome::Pending { url })
            }
            Err(e) => Err(self.fail(e.into())),
        }
    }

    fn fail(&mut self, err: CoreError) -> CoreError {
        warn!(policy = %self.policy_id, error = %err, "authentication failed");
        self.state = AuthState::Failed;
        err
    }
}
