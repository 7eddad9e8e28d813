//! Command-line surface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{ConfigCommands, ForecastCommands, SubmitCommands};

#[derive(Debug, Parser)]
#[command(
    name = "asset-control",
    version,
    about = "Record equipment counts and push forecast alerts to the team chat"
)]
pub struct Cli {
    /// Config file (default: <config dir>/asset-control/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Submit equipment counts for a location
    Submit(SubmitCommands),
    /// Show the forecast alert for a location without recording anything
    Forecast(ForecastCommands),
    /// Inspect or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}
