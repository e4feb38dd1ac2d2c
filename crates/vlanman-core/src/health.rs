// ── Backend health state ──
//
// Published through a `watch` channel on the DataStore. A failed check
// replaces the state with `Unreachable`; nothing downstream panics or
// retries on its own.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::HealthStatus;

/// Connectivity as last observed by a health check.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum HealthState {
    /// No check has completed yet.
    #[default]
    Unknown,
    Healthy(HealthStatus),
    /// The backend answered but did not report itself healthy.
    Degraded(HealthStatus),
    Unreachable {
        error: String,
        at: DateTime<Utc>,
    },
}

impl HealthState {
    pub(crate) fn from_status(status: HealthStatus) -> Self {
        if status.is_healthy() {
            Self::Healthy(status)
        } else {
            Self::Degraded(status)
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy(_))
    }

    pub fn status(&self) -> Option<&HealthStatus> {
        match self {
            Self::Healthy(s) | Self::Degraded(s) => Some(s),
            Self::Unknown | Self::Unreachable { .. } => None,
        }
    }

    /// Short label for status bars.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Healthy(_) => "healthy",
            Self::Degraded(_) => "degraded",
            Self::Unreachable { .. } => "unreachable",
        }
    }
}
