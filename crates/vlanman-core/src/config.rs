// ── Runtime connection configuration ──
//
// These types describe how to reach the IP-management backend and how
// reports judge compliance. They never touch disk: the CLI resolves a
// profile and hands a `ControllerConfig` in.

use std::path::PathBuf;
use std::time::Duration;

use vlanman_api::{TlsMode, TransportConfig};

/// Default base URL of the REST API.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Days after which a zone's firewall review is overdue.
pub const DEFAULT_COMPLIANCE_CHECK_DAYS: u32 = 30;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (lab backends with self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for one backend connection.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Base URL including the API prefix, e.g. `http://localhost:8000/api/v1`.
    pub api_url: String,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Health poll period in seconds. 0 disables the poller.
    pub health_interval_secs: u64,
    pub compliance_check_days: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            health_interval_secs: 0,
            compliance_check_days: DEFAULT_COMPLIANCE_CHECK_DAYS,
        }
    }
}

impl ControllerConfig {
    /// Transport settings for the REST client.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}
