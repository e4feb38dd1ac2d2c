//! CLI configuration: thin wrapper around `vlanman_config`.
//!
//! Adds the resolution steps that respect `GlobalOpts` overrides
//! (`--api-url`, `--timeout`, `--insecure`, `--output`, `--color`).

use clap::ValueEnum;
use tracing::warn;

use vlanman_core::ControllerConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use vlanman_config::{Config, config_path, load_config};

/// Fill `--output` and `--color` from the config file when not given.
pub fn apply_defaults(global: &mut GlobalOpts, cfg: &Config) {
    if global.output.is_none() {
        global.output = parse_setting::<OutputFormat>("defaults.output", &cfg.defaults.output);
    }
    if global.color.is_none() {
        global.color = parse_setting::<ColorMode>("defaults.color", &cfg.defaults.color);
    }
}

fn parse_setting<T: ValueEnum>(key: &str, raw: &str) -> Option<T> {
    T::from_str(raw, true)
        .inspect_err(|_| warn!(key, value = raw, "ignoring unknown config value"))
        .ok()
}

/// Translate the selected profile plus global flags into a `ControllerConfig`.
///
/// CLI flags take priority over profile and file values.
pub fn build_controller_config(
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<ControllerConfig, CliError> {
    let mut backend = cfg.resolve(global.profile.as_deref()).map_err(|e| match e {
        vlanman_config::ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
            name,
            available: available_profiles(cfg),
        },
        other => other.into(),
    })?;

    if let Some(url) = &global.api_url {
        backend.api_url.clone_from(url);
    }
    if let Some(secs) = global.timeout {
        backend.timeout_secs = secs;
    }
    backend.insecure |= global.insecure;

    Ok(vlanman_config::to_controller_config(cfg, &backend)?)
}

fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort_unstable();
    names.join(", ")
}
