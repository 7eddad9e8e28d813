//! Form capture: turns arguments and prompts into a SubmissionForm

use super::SubmitCommands;
use crate::config::Limits;
use crate::models::{Location, Quantities, SubmissionForm};
use anyhow::{Result, bail};
use dialoguer::{Input, Select};
use is_terminal::IsTerminal;

/// Source of values the user did not pass on the command line
pub trait FormPrompter {
    fn location(&self) -> Result<Location>;
    fn count(&self, label: &str, max: u32) -> Result<u32>;
}

/// Terminal prompts via dialoguer
pub struct TerminalPrompter;

impl FormPrompter for TerminalPrompter {
    fn location(&self) -> Result<Location> {
        let labels: Vec<&str> = Location::ALL.iter().map(|l| l.as_str()).collect();
        let index = Select::new()
            .with_prompt("Select location")
            .items(&labels[..])
            .default(0)
            .interact()?;
        Ok(Location::ALL[index])
    }

    fn count(&self, label: &str, max: u32) -> Result<u32> {
        let value = Input::<u32>::new()
            .with_prompt(label)
            .default(0)
            .validate_with(move |v: &u32| -> Result<(), String> {
                if *v > max {
                    Err(format!("{} must be between 0 and {}", label, max))
                } else {
                    Ok(())
                }
            })
            .interact_text()?;
        Ok(value)
    }
}

/// Capture the form, prompting on a terminal unless `--no-input` was given
pub fn capture(args: &SubmitCommands, limits: &Limits) -> Result<SubmissionForm> {
    let interactive = !args.no_input && std::io::stdin().is_terminal();
    let prompter: Option<&dyn FormPrompter> = if interactive {
        Some(&TerminalPrompter)
    } else {
        None
    };
    resolve(args, limits, prompter)
}

/// Fill gaps from the prompter (or defaults), then enforce the configured bounds
pub fn resolve(
    args: &SubmitCommands,
    limits: &Limits,
    prompter: Option<&dyn FormPrompter>,
) -> Result<SubmissionForm> {
    let location = match (args.location, prompter) {
        (Some(location), _) => location,
        (None, Some(prompter)) => prompter.location()?,
        (None, None) => bail!("--location is required when not prompting (SSW or TPK)"),
    };

    let [bag, small_cage, big_cage, pallet] = [
        (args.bag, "BAG", limits.bag_max),
        (args.small_cage, "SMALL CAGE", limits.small_cage_max),
        (args.big_cage, "BIG CAGE", limits.big_cage_max),
        (args.pallet, "PALLET", limits.pallet_max),
    ]
    .map(|(given, label, max)| match (given, prompter) {
        (Some(value), _) => Ok(value),
        (None, Some(prompter)) => prompter.count(label, max),
        (None, None) => Ok(0),
    });

    let quantities = Quantities {
        bag: bag?,
        small_cage: small_cage?,
        big_cage: big_cage?,
        pallet: pallet?,
    };
    limits.check(&quantities)?;

    Ok(SubmissionForm::new(location, quantities))
}
