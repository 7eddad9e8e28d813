use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};
use std::process::ExitCode;

use asset_control::cli::commands::{
    handle_config_command, handle_forecast_command, handle_submit_command,
};
use asset_control::cli::{Cli, Commands};
use asset_control::config::Config;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // .env values become process environment before config is resolved
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Config(command) => {
            handle_config_command(command, cli.config.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Submit(args) => {
            let config = Config::load(cli.config.as_deref())?;
            debug!("Configuration source: {:?}", config.source());
            handle_submit_command(args, &config).await
        }
        Commands::Forecast(args) => {
            let config = Config::load(cli.config.as_deref())?;
            handle_forecast_command(args, &config).await
        }
    }
}

/// RUST_LOG wins over -v flags
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_secs()
        .init();
}
