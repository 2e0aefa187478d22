//! Session management commands.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use formica::prelude::{list_sessions, load_session, save_session, session_path};

use crate::config::sessions_dir;

pub fn save(name: &str) -> Result<()> {
    let colony = super::load_current()?;
    let path = session_path(&sessions_dir()?, name);
    save_session(&colony, &path).with_context(|| format!("Failed to save session: {name}"))?;

    println!("{} Session saved: {}", "✓".green().bold(), name.cyan());
    println!("  Day {}, frame {}", colony.sim_day(), colony.frame());

    Ok(())
}

pub fn load(name: &str) -> Result<()> {
    let path = session_path(&sessions_dir()?, name);
    if !path.exists() {
        bail!("Session not found: {name}");
    }

    let colony = load_session(&path).with_context(|| format!("Failed to load session: {name}"))?;
    super::save_current(&colony)?;

    println!("{} Session loaded: {}", "✓".green().bold(), name.cyan());
    println!("  Day:    {}", colony.sim_day().to_string().cyan());
    println!("  Frame:  {}", colony.frame().to_string().cyan());
    println!("  Agents: {}", colony.agents().len().to_string().cyan());

    Ok(())
}

pub fn list() -> Result<()> {
    let sessions = list_sessions(&sessions_dir()?)?;

    if sessions.is_empty() {
        println!("{} No saved sessions.", "•".yellow());
        return Ok(());
    }

    println!("{} Saved sessions:", "→".blue());
    println!();
    for info in sessions {
        println!(
            "  {} {} (day {}, frame {}, {} agents)",
            "•".blue(),
            info.name.white().bold(),
            info.sim_day,
            info.frame,
            info.agent_count
        );
    }

    Ok(())
}
