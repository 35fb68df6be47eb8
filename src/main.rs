//! Kicklab CLI
//!
//! Command-line interface for the Kicklab control plane.

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kicklab::cli::commands::{self, Login};
use kicklab::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("KICKLAB_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("kicklab={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Kicklab v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => {
            let login = Login {
                username: cli.username,
                password: cli.password,
            };
            handle_command(cmd, cli.config.as_deref(), &login)
        }
        None => {
            println!("Kicklab v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(
    cmd: Commands,
    config_path: Option<&std::path::Path>,
    login: &Login,
) -> anyhow::Result<()> {
    match cmd {
        Commands::Map {
            param,
            value,
            reverse,
        } => commands::map(&param, value, reverse)?,
        Commands::Params => commands::params()?,
        Commands::Presets => commands::presets(load(config_path)?, login)?,
        Commands::Kicks => commands::kicks(load(config_path)?, login)?,
        Commands::Generate => commands::generate(load(config_path)?, login)
            .context("kick generation failed")?,
        Commands::DeleteKick { id, confirm } => {
            commands::delete_kick(load(config_path)?, login, id, confirm)
                .with_context(|| format!("could not delete kick {id}"))?
        }
    }
    Ok(())
}

fn load(path: Option<&std::path::Path>) -> anyhow::Result<kicklab::config::KicklabConfig> {
    commands::load_config(path).context("invalid configuration")
}
