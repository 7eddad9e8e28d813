//! Submit command handler

use anyhow::Result;
use colored::*;
use std::process::ExitCode;

use super::{SubmitCommands, form};
use crate::cli::output;
use crate::config::Config;
use crate::services::submission::SubmissionWorkflow;

/// Handle `submit`: open the session, capture the form, run the workflow once
pub async fn handle_submit_command(args: SubmitCommands, config: &Config) -> Result<ExitCode> {
    // Session setup comes first so credential problems surface before the form
    let workflow = match SubmissionWorkflow::connect(config).await {
        Ok(workflow) => workflow,
        Err(err) => {
            output::print_error(&err.to_string());
            return Ok(ExitCode::FAILURE);
        }
    };

    let form = form::capture(&args, &config.limits)?;
    let report = workflow.run(form).await;

    output::print_report(&report);

    if args.show_message {
        if let Some(message) = &report.notification {
            println!();
            println!("{}", message.title.bold());
            println!("{}", message.text.trim_end());
        }
    }

    Ok(output::exit_code(&report))
}
