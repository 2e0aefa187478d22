//! CLI command implementations.

pub mod directive;
pub mod init;
pub mod reset;
pub mod run;
pub mod session;
pub mod stats;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use formica::prelude::{load_session, save_session, Colony};

use crate::config::{current_session_path, Config};

/// Found a colony from the project configuration.
pub(crate) fn found_colony(config: &Config) -> Result<Colony> {
    let mut colony = formica::create_colony_with(config.colony.clone())
        .context("Invalid [colony] section in formica.toml")?;
    if !config.tuning.is_empty() {
        colony.tune(&config.tuning);
    }
    Ok(colony)
}

/// Load the current colony, or bail when the project has none yet.
pub(crate) fn load_current() -> Result<Colony> {
    let path = current_session_path()?;
    if !path.exists() {
        bail!("No colony found. Run {} first.", "formica init".cyan());
    }
    load_session(&path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Write the colony back as the current checkpoint.
pub(crate) fn save_current(colony: &Colony) -> Result<()> {
    let path = current_session_path()?;
    save_session(colony, &path).with_context(|| format!("Failed to save {}", path.display()))
}
