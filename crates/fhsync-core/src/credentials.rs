// ── Session credential storage ──
//
// The session token issued by the auth policy endpoint, persisted under
// `sessionToken`. Reads and writes go through one lock so concurrent
// logins and cloud calls never observe a half-written token.

use std::sync::{Arc, RwLock};

use secrecy::SecretString;
use tracing::debug;

use crate::error::CoreError;
use crate::storage::{KeyValueStore, SESSION_TOKEN_KEY};

#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
    lock: Arc<RwLock<()>>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lock: Arc::new(RwLock::new(())),
        }
    }

    /// The stored session token, if any.
    pub fn session_token(&self) -> Result<Option<SecretString>, CoreError> {
        let _guard = self.lock.read().expect("credential lock poisoned");
        Ok(self
            .store
            .get(SESSION_TOKEN_KEY)?
            .filter(|t| !t.is_empty())
            .map(SecretString::from))
    }

    /// Replace the stored session token.
    pub fn set_session_token(&self, token: &str) -> Result<(), CoreError> {
        let _guard = self.lock.write().expect("credential lock poisoned");
        self.store.set(SESSION_TOKEN_KEY, token)?;
        debug!("session token stored");
        Ok(())
    }

    /// Forget the stored session token. Never called implicitly.
    pub fn clear(&self) -> Result<(), CoreError> {
        let _guard = self.lock.write().expect("credential lock poisoned");
        self.store.remove(SESSION_TOKEN_KEY)?;
        debug!("session token cleared");
        Ok(())
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}
