//! Forecast command handler

use anyhow::{Context, Result};
use colored::*;
use std::process::ExitCode;

use super::ForecastCommands;
use crate::api::forecast::ForecastClient;
use crate::cli::output;
use crate::config::Config;
use crate::services::submission;

/// Handle `forecast`: fetch and print the alert for a location, sending nothing
pub async fn handle_forecast_command(args: ForecastCommands, config: &Config) -> Result<ExitCode> {
    let endpoint = config.require_forecast_endpoint()?;
    let client = ForecastClient::new(endpoint, &config.http_config())
        .context("Failed to build forecast client")?;

    match submission::preview(&client, args.location, &config.message.title).await {
        Ok((record, message)) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&record).context("Failed to format JSON output")?
                );
            } else {
                println!("{}", message.title.bold());
                println!("{}", message.text.trim_end());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            output::print_error(&err.to_string());
            Ok(ExitCode::FAILURE)
        }
    }
}
