//! ecosys CLI library.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use ecosys_core::observability::{init_tracing, TracingMode};

/// Parse args and dispatch to command handlers.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(if cli.verbose {
        TracingMode::Verbose
    } else {
        TracingMode::Default
    });

    match cli.command {
        Commands::Resolve {
            env_name,
            resolver,
            json,
        } => {
            commands::resolve::cmd_resolve(&env_name, &resolver, json)?;
        }
        Commands::Render {
            config,
            output,
            resolver,
        } => {
            commands::render::cmd_render(&config, output.as_deref(), &resolver)?;
        }
        Commands::Check { config, json } => {
            commands::check::cmd_check(&config, json)?;
        }
    }

    Ok(())
}
