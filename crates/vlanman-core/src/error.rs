// ── Core error types ──
//
// User-facing errors from vlanman-core. Consumers never see raw HTTP
// bodies or JSON parse failures; the `From<vlanman_api::Error>` impl
// translates transport-layer errors into these variants.

use thiserror::Error;

use crate::subnet::SubnetError;

/// Coarse error grouping used by front ends to pick presentation and
/// exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network or API failure. Cached data stays valid.
    Connection,
    /// Bad input, fixable by correcting a field.
    Validation,
    /// The action would break a data invariant.
    BusinessRule,
    /// Anything else.
    Internal,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach IP-management API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("IP-management API timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Validation errors ────────────────────────────────────────────
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    // ── Business-rule violations ─────────────────────────────────────
    #[error("Cannot delete {entity}: {count} dependent {dependents} still exist")]
    DependentResources {
        entity: String,
        dependents: String,
        count: usize,
    },

    #[error("IP {ip} is reserved and cannot be assigned, changed or released")]
    ReservedAddress { ip: String },

    #[error("IP {ip} is outside the assignable range {start} - {end}")]
    AddressOutOfRange {
        ip: String,
        start: String,
        end: String,
    },

    #[error("IP {ip} is already assigned to {ci_name}")]
    DuplicateAddress { ip: String, ci_name: String },

    #[error("MAC address {mac} is already assigned to {ci_name}")]
    DuplicateMac { mac: String, ci_name: String },

    #[error("VLAN ID {vlan_id} already exists")]
    DuplicateVlanId { vlan_id: u16 },

    #[error("Domain code '{code}' already exists")]
    DuplicateDomainCode { code: String },

    #[error("Value stream code '{code}' already exists in domain {domain}")]
    DuplicateValueStreamCode { code: String, domain: String },

    #[error("No available IP addresses in VLAN {vlan}")]
    PoolExhausted { vlan: String },

    #[error("Operation rejected by API: {message}")]
    Rejected { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity_type: &str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_owned(),
            identifier: identifier.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout { .. } | Self::Api { .. } => {
                ErrorCategory::Connection
            }
            Self::Validation { .. } | Self::NotFound { .. } | Self::Config { .. } => {
                ErrorCategory::Validation
            }
            Self::DependentResources { .. }
            | Self::ReservedAddress { .. }
            | Self::AddressOutOfRange { .. }
            | Self::DuplicateAddress { .. }
            | Self::DuplicateMac { .. }
            | Self::DuplicateVlanId { .. }
            | Self::DuplicateDomainCode { .. }
            | Self::DuplicateValueStreamCode { .. }
            | Self::PoolExhausted { .. }
            | Self::Rejected { .. } => ErrorCategory::BusinessRule,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }
}

// ── Conversion from calculator errors ────────────────────────────────

impl From<SubnetError> for CoreError {
    fn from(err: SubnetError) -> Self {
        let field = match &err {
            SubnetError::MalformedAddress { .. } | SubnetError::InsufficientSpace { .. } => {
                "subnet"
            }
            SubnetError::InvalidNetmask { .. } | SubnetError::BlockTooLarge { .. } => "netmask",
            SubnetError::InvalidVlanId { .. } => "vlan_id",
        };
        Self::validation(field, err.to_string())
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<vlanman_api::Error> for CoreError {
    fn from(err: vlanman_api::Error) -> Self {
        match err {
            vlanman_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            vlanman_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            vlanman_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            vlanman_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            vlanman_api::Error::Api {
                status, message, ..
            } if (400..500).contains(&status) => CoreError::Rejected { message },
            vlanman_api::Error::Api {
                status, message, ..
            } => CoreError::Api {
                message,
                status: Some(status),
            },
            vlanman_api::Error::Validation { message } => CoreError::Validation {
                field: "request".into(),
                message,
            },
            vlanman_api::Error::NotFound { path } => CoreError::NotFound {
                entity_type: "Resource".into(),
                identifier: path,
            },
            vlanman_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_client_errors_map_to_rejected() {
        let err: CoreError = vlanman_api::Error::Api {
            status: 400,
            message: "VLAN ID 101 already exists".into(),
            kind: None,
        }
        .into();
        assert!(matches!(err, CoreError::Rejected { .. }));
        assert_eq!(err.category(), ErrorCategory::BusinessRule);
    }

    #[test]
    fn server_errors_stay_connection_category() {
        let err: CoreError = vlanman_api::Error::Api {
            status: 503,
            message: "maintenance".into(),
            kind: None,
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Connection);
    }

    #[test]
    fn subnet_errors_become_field_validation() {
        let err: CoreError = SubnetError::InvalidVlanId { id: 5000 }.into();
        match err {
            CoreError::Validation { field, .. } => assert_eq!(field, "vlan_id"),
            other => panic!("unexpected: {other:?}"),
        }

        let err: CoreError = SubnetError::BlockTooLarge { prefix: 8, min: 16 }.into();
        match err {
            CoreError::Validation { field, .. } => assert_eq!(field, "netmask"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
