pub mod handler;

pub use handler::handle_config_command;

use clap::Subcommand;

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration with secrets masked
    Show,
    /// Print the config file location
    Path,
    /// Write a commented config template
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
