//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use vlanman_config::ConfigError;
use vlanman_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the IP-management API at {url}")]
    #[diagnostic(
        code(vlanman::connection_failed),
        help(
            "{reason}\n\
             Check that the backend is running, or point --api-url at it.\n\
             Try: vlanman --offline vlans list"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(vlanman::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(vlanman::not_found),
        help("Run: vlanman {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    /// A data rule forbids the change.
    #[error("{message}")]
    #[diagnostic(code(vlanman::conflict), help("{hint}"))]
    Conflict { message: String, hint: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    #[diagnostic(code(vlanman::api_error))]
    ApiError { status: Option<u16>, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(vlanman::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(vlanman::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Add one under [profiles.<name>] in the config file."
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(
        code(vlanman::config),
        help("Inspect the file with: vlanman config path")
    )]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(vlanman::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(vlanman::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(vlanman::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(resource_type: &str, identifier: &str) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
            list_command: list_command(resource_type).into(),
        }
    }
}

fn list_command(resource_type: &str) -> &'static str {
    match resource_type.to_ascii_lowercase().as_str() {
        "domain" => "domains list",
        "zone" => "zones list",
        "value stream" => "zones streams <domain>",
        "vlan" => "vlans list",
        "ip assignment" | "assignment" => "ips list",
        _ => "--help",
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: String::new(),
            },
            other => Self::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },

            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Api { message, status } => Self::ApiError { status, message },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => Self::not_found(&entity_type, &identifier),

            CoreError::Validation { field, message } => Self::Validation {
                field,
                reason: message,
            },

            CoreError::DependentResources { dependents, .. } => Self::Conflict {
                message,
                hint: format!("Remove or release the dependent {dependents} first."),
            },

            CoreError::ReservedAddress { .. } => Self::Conflict {
                message,
                hint: "The first seven and the last two host addresses of every block \
                       belong to network infrastructure."
                    .into(),
            },

            CoreError::AddressOutOfRange { .. } => Self::Conflict {
                message,
                hint: "Run: vlanman vlans next-ip <VLAN> for a free address.".into(),
            },

            CoreError::DuplicateAddress { .. } | CoreError::DuplicateMac { .. } => {
                Self::Conflict {
                    message,
                    hint: "Release or update the existing assignment first.".into(),
                }
            }

            CoreError::DuplicateVlanId { .. }
            | CoreError::DuplicateDomainCode { .. }
            | CoreError::DuplicateValueStreamCode { .. } => {
                Self::Conflict {
                    message,
                    hint: "Pick a value that is not in use yet.".into(),
                }
            }

            CoreError::PoolExhausted { .. } => Self::Conflict {
                message,
                hint: "Release unused addresses or move devices to a larger VLAN.".into(),
            },

            CoreError::Rejected { message } => Self::Conflict {
                message,
                hint: "The API refused the request.".into(),
            },

            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => Self::ApiError {
                status: None,
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rules_exit_with_conflict() {
        let err: CliError = CoreError::DuplicateVlanId { vlan_id: 101 }.into();
        assert_eq!(err.exit_code(), exit_code::CONFLICT);
        assert_eq!(err.to_string(), "VLAN ID 101 already exists");
    }

    #[test]
    fn duplicate_value_stream_is_conflict() {
        let err: CliError = CoreError::DuplicateValueStreamCode {
            code: "A2".into(),
            domain: "MFG".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::CONFLICT);
        assert_eq!(
            err.to_string(),
            "Value stream code 'A2' already exists in domain MFG"
        );
    }

    #[test]
    fn not_found_points_at_list_command() {
        let err: CliError = CoreError::NotFound {
            entity_type: "IP assignment".into(),
            identifier: "10.1.1.99".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        match err {
            CliError::NotFound { list_command, .. } => assert_eq!(list_command, "ips list"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn connection_errors_map_to_connection_code() {
        let err: CliError = CoreError::ConnectionFailed {
            url: "http://localhost:8000".into(),
            reason: "refused".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }
}
