use thiserror::Error;

/// Top-level error type for the `vlanman-api` crate.
///
/// Covers every failure mode of the REST surface: transport, URL handling,
/// structured backend errors, request validation, and payload decoding.
/// `vlanman-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or HTTP client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// Structured error returned by the backend (`{"detail": ...}` or
    /// `{"error", "message", "type"}`).
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        /// Exception class name reported by the backend, when present.
        kind: Option<String>,
    },

    /// Request payload rejected by backend validation (HTTP 422).
    #[error("Request validation failed: {message}")]
    Validation { message: String },

    /// The requested resource does not exist (HTTP 404).
    #[error("Not found: {path}")]
    NotFound { path: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::NotFound { .. } | Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status code, if this error came from an HTTP response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Validation { .. } => Some(422),
            Self::NotFound { .. } => Some(404),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
