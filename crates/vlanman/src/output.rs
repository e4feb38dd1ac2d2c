//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use vlanman_core::{DeviceStatus, VlanStatus};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Colors status and utilization cells in table output.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    enabled: bool,
    warning_pct: u32,
}

impl Painter {
    pub fn new(mode: ColorMode, warning_pct: u32) -> Self {
        Self {
            enabled: should_color(mode),
            warning_pct,
        }
    }

    pub fn vlan_status(self, status: VlanStatus) -> String {
        let text = status.to_string();
        if !self.enabled {
            return text;
        }
        match status {
            VlanStatus::Active => text.green().to_string(),
            VlanStatus::Inactive => text.dimmed().to_string(),
            VlanStatus::Warning => text.yellow().to_string(),
            VlanStatus::Error => text.red().bold().to_string(),
        }
    }

    pub fn device_status(self, status: DeviceStatus) -> String {
        let text = status.to_string();
        if !self.enabled {
            return text;
        }
        match status {
            DeviceStatus::Active => text.green().to_string(),
            DeviceStatus::Inactive => text.dimmed().to_string(),
            DeviceStatus::Reserved => text.blue().to_string(),
            DeviceStatus::Conflict => text.red().bold().to_string(),
        }
    }

    /// `used/total (pct%)`, highlighted at or above the warning threshold.
    pub fn usage(self, used: u32, total: u32, pct: u32) -> String {
        let text = format!("{used}/{total} ({pct}%)");
        if self.enabled && pct >= self.warning_pct {
            text.yellow().to_string()
        } else {
            text
        }
    }

    pub fn flag(self, overdue: bool) -> String {
        match (overdue, self.enabled) {
            (true, true) => "OVERDUE".red().bold().to_string(),
            (true, false) => "OVERDUE".into(),
            (false, true) => "ok".green().to_string(),
            (false, false) => "ok".into(),
        }
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(data)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(data)?),
        OutputFormat::Plain => Ok(data.iter().map(id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted
/// string, since single-item detail views don't use `Tabled` derive.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(data)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(data)?),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Status line on stderr, suppressed by `--quiet`.
pub fn notice(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{message}");
    }
}

// ── Format-specific renderers ────────────────────────────────────────

pub fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// `-` for missing values in detail views.
pub fn or_dash(value: Option<impl ToString>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, Tabled)]
    struct Row {
        name: &'static str,
        tag: u16,
    }

    fn rows() -> Vec<Row> {
        vec![Row { name: "A2", tag: 101 }, Row { name: "A4", tag: 102 }]
    }

    #[test]
    fn plain_emits_one_id_per_line() {
        let out = render_list(OutputFormat::Plain, &rows(), |_| Row { name: "", tag: 0 }, |r| {
            r.tag.to_string()
        })
        .unwrap();
        assert_eq!(out, "101\n102");
    }

    #[test]
    fn compact_json_is_single_line() {
        let out = render_list(
            OutputFormat::JsonCompact,
            &rows(),
            |r| Row { name: r.name, tag: r.tag },
            |r| r.tag.to_string(),
        )
        .unwrap();
        assert_eq!(out, r#"[{"name":"A2","tag":101},{"name":"A4","tag":102}]"#);
    }

    #[test]
    fn painter_without_color_is_plain_text() {
        let p = Painter::new(ColorMode::Never, 85);
        assert_eq!(p.usage(212, 248, 85), "212/248 (85%)");
        assert_eq!(p.vlan_status(VlanStatus::Warning), "warning");
        assert_eq!(p.flag(true), "OVERDUE");
    }
}
