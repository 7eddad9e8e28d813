pub mod form;
pub mod handler;

pub use handler::handle_submit_command;

use crate::models::Location;
use clap::Args;

/// Arguments for `submit`. Values left out are prompted for when stdin is a terminal.
#[derive(Debug, Clone, Default, Args)]
pub struct SubmitCommands {
    /// Location the counts belong to
    #[arg(short, long, value_enum, ignore_case = true)]
    pub location: Option<Location>,

    /// Number of bags (required, non-zero)
    #[arg(long)]
    pub bag: Option<u32>,

    /// Number of small cages (required, non-zero)
    #[arg(long)]
    pub small_cage: Option<u32>,

    /// Number of big cages
    #[arg(long)]
    pub big_cage: Option<u32>,

    /// Number of pallets
    #[arg(long)]
    pub pallet: Option<u32>,

    /// Never prompt; missing counts default to 0
    #[arg(long)]
    pub no_input: bool,

    /// Print the alert text after sending it
    #[arg(long)]
    pub show_message: bool,
}
