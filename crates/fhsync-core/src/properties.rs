use url::Url;
use uuid::Uuid;

/// Server/session metadata captured by `init`.
///
/// Immutable; every `init` builds a new snapshot with a fresh tracking id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudProperties {
    pub host: Url,
    pub tracking_id: Uuid,
    pub environment: Option<String>,
}

impl CloudProperties {
    pub fn new(host: Url, environment: Option<String>) -> Self {
        Self {
            host,
            tracking_id: Uuid::new_v4(),
            environment,
        }
    }
}
