mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vlanman_core::{Controller, MemoryBackend};

use crate::cli::{Cli, Command, VlansArgs, VlansCommand};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(mut cli: Cli) -> Result<(), CliError> {
    let cfg = config::load_config()?;
    config::apply_defaults(&mut cli.global, &cfg);

    match cli.command {
        // Local commands never touch a backend
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global, &cfg),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "vlanman", &mut std::io::stdout());
            Ok(())
        }

        Command::Vlans(VlansArgs {
            command: VlansCommand::Preview(args),
        }) => commands::vlans::preview(&args, &cli.global),

        // Everything else goes through a controller
        cmd => {
            let controller_config = config::build_controller_config(&cli.global, &cfg)?;
            tracing::debug!(command = ?cmd, offline = cli.global.offline, "dispatching command");

            if cli.global.offline {
                let controller =
                    Controller::new(controller_config, MemoryBackend::with_sample_data());
                commands::dispatch(cmd, &controller, &cli.global, &cfg).await
            } else {
                let controller = Controller::connect(controller_config)?;
                commands::dispatch(cmd, &controller, &cli.global, &cfg).await
            }
        }
    }
}
