//! Terminal rendering of workflow outcomes

use colored::*;
use std::process::ExitCode;

use crate::services::submission::{MessageLevel, StageMessage, SubmissionReport};

pub fn print_report(report: &SubmissionReport) {
    for message in &report.messages {
        print_stage_message(message);
    }
}

pub fn print_stage_message(message: &StageMessage) {
    match message.level {
        MessageLevel::Success => println!("{} {}", "✓".green().bold(), message.text.green()),
        MessageLevel::Notice => println!("{} {}", "!".yellow().bold(), message.text.yellow()),
        MessageLevel::Error => eprintln!("{} {}", "✗".red().bold(), message.text.red()),
    }
}

pub fn print_error(text: &str) {
    eprintln!("{} {}", "✗".red().bold(), text.red());
}

/// 0 only when every stage succeeded
pub fn exit_code(report: &SubmissionReport) -> ExitCode {
    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
