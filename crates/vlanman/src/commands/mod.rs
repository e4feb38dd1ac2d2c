//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod config_cmd;
pub mod domains;
pub mod health;
pub mod ips;
pub mod reports;
pub mod util;
pub mod vlans;
pub mod zones;

use vlanman_config::Config;
use vlanman_core::{Backend, Controller};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch<B: Backend>(
    cmd: Command,
    controller: &Controller<B>,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(), CliError> {
    match cmd {
        Command::Domains(args) => domains::handle(controller, args, global).await,
        Command::Zones(args) => zones::handle(controller, args, global).await,
        Command::Vlans(args) => vlans::handle(controller, args, global, cfg).await,
        Command::Ips(args) => ips::handle(controller, args, global, cfg).await,
        Command::Reports(args) => reports::handle(controller, args, global, cfg).await,
        Command::Health => health::handle(controller, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
