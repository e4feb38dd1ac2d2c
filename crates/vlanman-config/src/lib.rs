//! Shared configuration for vlanman tools.
//!
//! Layered loading (built-in defaults, TOML file, `VLANMAN_*` variables and
//! the plain deployment variables `API_URL`, `PLANT_CODE`, `ORGANIZATION`),
//! named backend profiles, and translation to
//! `vlanman_core::ControllerConfig`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use vlanman_core::config::{DEFAULT_API_URL, DEFAULT_COMPLIANCE_CHECK_DAYS};
use vlanman_core::{ControllerConfig, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown profile '{name}'")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Base URL of the REST API, including its version prefix.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_plant_code")]
    pub plant_code: String,

    #[serde(default = "default_organization")]
    pub organization: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Days after which a zone's firewall review counts as overdue.
    #[serde(default = "default_check_days")]
    pub compliance_check_days: u32,

    /// Utilization highlighted in tables. VLAN status thresholds are fixed.
    #[serde(default = "default_warning_pct")]
    pub utilization_warning_pct: u32,

    /// Path to a custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default)]
    pub insecure: bool,

    /// Profile used when `--profile` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backends, e.g. one per plant or a staging instance.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            plant_code: default_plant_code(),
            organization: default_organization(),
            timeout_secs: default_timeout(),
            compliance_check_days: default_check_days(),
            utilization_warning_pct: default_warning_pct(),
            ca_cert: None,
            insecure: false,
            default_profile: None,
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

/// Output presentation defaults for the CLI.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

/// A named backend. Unset fields fall back to the top-level values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    pub api_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}
fn default_plant_code() -> String {
    "BURSA".into()
}
fn default_organization() -> String {
    "Bosch Rexroth".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_check_days() -> u32 {
    DEFAULT_COMPLIANCE_CHECK_DAYS
}
fn default_warning_pct() -> u32 {
    85
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "vlanman", "vlanman").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("vlanman");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full config from the canonical file plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config layered over the TOML file at `path` (a missing file is fine).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("VLANMAN_").split("__"))
        .merge(Env::raw().only(&["API_URL", "PLANT_CODE", "ORGANIZATION"]));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// The backend settings after profile selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBackend {
    pub profile: Option<String>,
    pub api_url: String,
    pub plant_code: String,
    pub ca_cert: Option<PathBuf>,
    pub insecure: bool,
    pub timeout_secs: u64,
}

impl Config {
    /// Pick the named profile, else `default_profile`, else the top level.
    ///
    /// An explicitly requested profile must exist; a dangling
    /// `default_profile` falls back to the top-level settings.
    pub fn resolve(&self, profile: Option<&str>) -> Result<ResolvedBackend, ConfigError> {
        let selected = match profile {
            Some(name) => {
                let p = self
                    .profiles
                    .get(name)
                    .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })?;
                Some((name, p))
            }
            None => self
                .default_profile
                .as_deref()
                .and_then(|name| self.profiles.get(name).map(|p| (name, p))),
        };

        Ok(match selected {
            Some((name, p)) => ResolvedBackend {
                profile: Some(name.to_owned()),
                api_url: p.api_url.clone(),
                plant_code: p.plant_code.clone().unwrap_or_else(|| self.plant_code.clone()),
                ca_cert: p.ca_cert.clone().or_else(|| self.ca_cert.clone()),
                insecure: p.insecure.unwrap_or(self.insecure),
                timeout_secs: p.timeout_secs.unwrap_or(self.timeout_secs),
            },
            None => ResolvedBackend {
                profile: None,
                api_url: self.api_url.clone(),
                plant_code: self.plant_code.clone(),
                ca_cert: self.ca_cert.clone(),
                insecure: self.insecure,
                timeout_secs: self.timeout_secs,
            },
        })
    }
}

/// Validate a resolved backend and build the core connection config.
pub fn to_controller_config(
    cfg: &Config,
    backend: &ResolvedBackend,
) -> Result<ControllerConfig, ConfigError> {
    let url = Url::parse(&backend.api_url).map_err(|e| ConfigError::Validation {
        field: "api_url".into(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    if backend.timeout_secs == 0 {
        return Err(ConfigError::Validation {
            field: "timeout_secs".into(),
            reason: "must be at least 1".into(),
        });
    }
    if cfg.compliance_check_days == 0 {
        return Err(ConfigError::Validation {
            field: "compliance_check_days".into(),
            reason: "must be at least 1".into(),
        });
    }

    let tls = if backend.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca) = backend.ca_cert {
        TlsVerification::CustomCa(ca.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(ControllerConfig {
        api_url: backend.api_url.trim_end_matches('/').to_owned(),
        tls,
        timeout: Duration::from_secs(backend.timeout_secs),
        health_interval_secs: 0,
        compliance_check_days: cfg.compliance_check_days,
    })
}
