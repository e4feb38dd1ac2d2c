// Shared transport configuration for building reqwest::Client instances.
//
// TLS and timeout settings live here so the REST client and any future
// surface share one builder.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("vlanman/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (lab backends with self-signed certs).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Timeout in whole seconds, for error reporting.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }
}
