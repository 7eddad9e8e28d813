//! Config command handler

use anyhow::{Context, Result, anyhow, bail};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};

use super::ConfigCommands;
use crate::config::{Config, RULE_SET_VERSION};

/// Handle `config` subcommands. `path` and `init` work without a valid config.
pub fn handle_config_command(command: ConfigCommands, explicit: Option<&Path>) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let config = Config::load(explicit)?;
            match config.source() {
                Some(path) => println!("# loaded from {}", path.display()),
                None => println!("# no config file found; defaults and environment only"),
            }
            println!("# rule set v{}", RULE_SET_VERSION);
            print!("{}", config.redacted().to_toml().context("Failed to format configuration")?);
            Ok(())
        }
        ConfigCommands::Path => {
            let path = resolve_path(explicit)?;
            let state = if path.exists() { "exists".green() } else { "missing".yellow() };
            println!("{} ({})", path.display(), state);
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = resolve_path(explicit)?;
            write_template(&path, force)?;
            println!("Wrote config template to {}", path.display().to_string().bright_green());
            Ok(())
        }
    }
}

fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::default_path()
            .ok_or_else(|| anyhow!("Could not determine the config directory; pass --config")),
    }
}

fn write_template(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("Config file already exists: {} (use --force to overwrite)", path.display());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, Config::template())
        .with_context(|| format!("Failed to write config file: {}", path.display()))
}
