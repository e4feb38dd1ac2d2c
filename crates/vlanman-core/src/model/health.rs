// ── Backend health ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last successful answer from the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
    /// Server timestamp, or the time the answer was received.
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") || self.status.eq_ignore_ascii_case("ok")
    }
}
