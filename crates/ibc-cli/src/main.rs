#![doc = include_str!("../README.md")]

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Search { k_max } => commands::search::run_search_command(&cli, *k_max),
        Commands::Verify { broken, diagnose } => {
            commands::verify::run_verify_command(&cli, *broken, *diagnose)
        }
        Commands::DumpSmt { k, output } => {
            commands::dump_smt::run_dump_smt_command(&cli, *k, output.as_deref())
        }
    }
}
