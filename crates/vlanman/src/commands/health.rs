//! Backend health check.

use vlanman_core::{Backend, Controller, HealthState};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn detail(state: &HealthState) -> String {
    match state.status() {
        Some(s) => [
            format!("State:   {}", state.label()),
            format!("Status:  {}", s.status),
            format!("Service: {}", s.service),
            format!("Version: {}", s.version),
            format!("Time:    {}", s.timestamp.format("%Y-%m-%d %H:%M:%S UTC")),
        ]
        .join("\n"),
        None => format!("State:   {}", state.label()),
    }
}

/// An unreachable backend fails the command so scripts can test the exit
/// code. A degraded one still prints its report.
pub async fn handle<B: Backend>(
    controller: &Controller<B>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let state = controller.check_health().await;
    if let HealthState::Unreachable { error, .. } = &state {
        return Err(CliError::ConnectionFailed {
            url: controller.config().api_url.clone(),
            reason: error.clone(),
        });
    }
    let out = output::render_single(global.format(), &state, detail, |s| s.label().to_owned())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
