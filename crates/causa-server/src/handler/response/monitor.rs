use causa_completion::{ServiceHealth, ServiceStatus};
use serde::{Deserialize, Serialize};

/// Response body for `GET /health`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorStatusResponse {
    pub status: ServiceStatus,
    pub version: String,
    pub completion: ServiceHealth,
}

impl MonitorStatusResponse {
    pub fn new(completion: ServiceHealth) -> Self {
        Self {
            status: completion.status,
            version: env!("CARGO_PKG_VERSION").to_owned(),
            completion,
        }
    }
}
