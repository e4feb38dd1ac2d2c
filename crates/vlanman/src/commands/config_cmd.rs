//! Config subcommand handlers.

use dialoguer::Input;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::validation("interactive", format!("prompt failed: {e}"))
}

fn prompt(label: &str, default: String) -> Result<String, CliError> {
    Input::new()
        .with_prompt(label)
        .default(default)
        .interact_text()
        .map_err(prompt_err)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts, current: &Config) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => {
            let path = config::config_path();
            if path.exists()
                && !util::confirm(
                    "config init",
                    &format!("Overwrite {}?", path.display()),
                    global.yes,
                )?
            {
                return Ok(());
            }
            eprintln!("vlanman configuration");
            eprintln!("  Config path: {}\n", path.display());

            let api_url = prompt("API base URL", current.api_url.clone())?;
            let plant_code = prompt("Plant code", current.plant_code.clone())?;
            let organization = prompt("Organization", current.organization.clone())?;
            let days = prompt(
                "Firewall review interval (days)",
                current.compliance_check_days.to_string(),
            )?;
            let compliance_check_days = days
                .parse()
                .map_err(|_| CliError::validation("compliance_check_days", "must be a number"))?;

            let cfg = Config {
                api_url,
                plant_code,
                organization,
                compliance_check_days,
                ..current.clone()
            };
            // Catch a bad URL or interval before it lands on disk
            let resolved = cfg.resolve(None)?;
            vlanman_config::to_controller_config(&cfg, &resolved)?;

            let written = vlanman_config::save_config(&cfg)?;
            eprintln!("\nConfiguration written to {}", written.display());
            eprintln!("  Test it: vlanman health");
            Ok(())
        }

        ConfigCommand::Show => {
            let out = output::render_single(global.format(), current, render_toml, |c| {
                c.api_url.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), false);
            Ok(())
        }
    }
}

fn render_toml(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# unable to render config: {e}"))
}
