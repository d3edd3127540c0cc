// ── Device identity ──
//
// A per-installation identifier (the "cuid") sent with every request.
// Generated once, persisted under `FHUUID`, never regenerated while the
// stored value exists.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::CoreError;
use crate::storage::{DEVICE_ID_KEY, KeyValueStore};

#[derive(Clone)]
pub struct DeviceIdentity {
    store: Arc<dyn KeyValueStore>,
    cached: Arc<Mutex<Option<String>>>,
}

impl DeviceIdentity {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            cached: Arc::new(Mutex::new(None)),
        }
    }

    /// The device identifier, generating and persisting one on first use.
    ///
    /// A read failure is an error; no id is generated over an unreadable
    /// store. A write failure only logs: the generated id is still
    /// returned and stays stable for the rest of the process.
    pub fn device_id(&self) -> Result<String, CoreError> {
        let mut cached = self.cached.lock().expect("identity lock poisoned");
        if let Some(ref id) = *cached {
            return Ok(id.clone());
        }

        let id = if let Some(id) = self.store.get(DEVICE_ID_KEY)? {
            id
        } else {
            let id = Uuid::new_v4().to_string();
            debug!(device_id = %id, "generated device identifier");
            if let Err(e) = self.store.set(DEVICE_ID_KEY, &id) {
                warn!(error = %e, "failed to persist device identifier");
            }
            id
        };

        *cached = Some(id.clone());
        Ok(id)
    }
}

impl std::fmt::Debug for DeviceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceIdentity")
            .field("cached", &self.cached)
            .finish_non_exhaustive()
    }
}
