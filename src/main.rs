mod cli;
mod command_handlers;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::cli::Cli;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let manifest = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("insbin.toml"));
    let code = command_handlers::dispatch::dispatch(cli.command, &manifest, cli.quiet)?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
