//! Initialize a new Formica project.

use anyhow::{Context, Result};
use colored::Colorize;
use formica::prelude::save_session;
use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE, DATA_DIR};

pub fn run(path: Option<String>) -> Result<()> {
    let base_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };

    println!("{} Initializing Formica project...", "→".blue());

    let data_dir = base_path.join(DATA_DIR);
    let sessions_dir = data_dir.join("sessions");
    std::fs::create_dir_all(&sessions_dir)
        .with_context(|| format!("Failed to create {}", sessions_dir.display()))?;
    println!("  {} Created {}", "✓".green(), sessions_dir.display());

    let config_path = base_path.join(CONFIG_FILE);
    let config = if config_path.exists() {
        println!("  {} {} already exists", "•".yellow(), config_path.display());
        Config::load_from(&config_path)?
    } else {
        let config = Config::default();
        config.save(&config_path)?;
        println!("  {} Created {}", "✓".green(), config_path.display());
        config
    };

    let gitignore_path = data_dir.join(".gitignore");
    if !gitignore_path.exists() {
        std::fs::write(&gitignore_path, "current.json\nsessions/\n")?;
        println!("  {} Created {}", "✓".green(), gitignore_path.display());
    }

    let current = data_dir.join("current.json");
    if current.exists() {
        println!("  {} {} already exists", "•".yellow(), current.display());
    } else {
        let colony = super::found_colony(&config)?;
        save_session(&colony, &current)
            .with_context(|| format!("Failed to write {}", current.display()))?;
        println!(
            "  {} Founded a colony: queen and {} workers",
            "✓".green(),
            config.colony.initial_workers
        );
    }

    println!();
    println!("{} Formica project initialized!", "✓".green().bold());
    println!();
    println!("Next steps:");
    println!("  {} formica run --ticks 18000", "1.".blue());
    println!("  {} formica stats", "2.".blue());
    println!("  {} formica directive advice.json", "3.".blue());

    Ok(())
}
