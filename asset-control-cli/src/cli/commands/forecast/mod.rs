pub mod handler;

pub use handler::handle_forecast_command;

use crate::models::Location;
use clap::Args;

#[derive(Debug, Clone, Args)]
pub struct ForecastCommands {
    /// Location to look up
    #[arg(short, long, value_enum, ignore_case = true)]
    pub location: Location,

    /// Print the raw forecast record as JSON instead of the alert text
    #[arg(long)]
    pub json: bool,
}
