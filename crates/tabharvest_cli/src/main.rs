mod cli;
mod commands;
mod config;

use std::process::ExitCode;

use clap::Parser;
use engine_logging::{initialize, LogDestination};
use log::LevelFilter;

use cli::{Cli, Command};
use config::HarvestConfig;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let destination = match cli.log_file.clone() {
        Some(path) => LogDestination::Both(path),
        None => LogDestination::Terminal,
    };
    initialize(destination, level);

    let config = match &cli.config {
        Some(path) => HarvestConfig::load(path)?,
        None => HarvestConfig::default(),
    };

    match cli.command {
        Command::Fetch(args) => {
            let report = commands::fetch(args, &config)?;
            return Ok(ExitCode::from(commands::fetch_status(&report)));
        }
        Command::Coverage(args) => commands::coverage(args)?,
        Command::Merge(args) => commands::merge(args)?,
    }
    Ok(ExitCode::SUCCESS)
}
