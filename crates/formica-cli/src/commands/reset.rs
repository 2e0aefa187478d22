//! Replace the current colony with a freshly founded one.

use anyhow::Result;
use colored::Colorize;
use tracing::info;

use crate::config::Config;

pub fn run() -> Result<()> {
    let config = Config::load()?;
    let colony = super::found_colony(&config)?;
    super::save_current(&colony)?;
    info!(session = colony.session_id(), "Colony reset");

    println!("{} Founded a new colony", "✓".green().bold());
    println!(
        "  Queen and {} workers, {} food stored",
        config.colony.initial_workers, config.colony.initial_stored_food
    );

    Ok(())
}
