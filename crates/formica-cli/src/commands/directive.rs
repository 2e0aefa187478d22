//! Apply a directive document to the current colony.

use anyhow::{Context, Result};
use colored::Colorize;

pub fn run(file: &str) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read directive: {file}"))?;
    let directive = formica::parse_directive(&text)
        .with_context(|| format!("Failed to parse directive: {file}"))?;

    let mut colony = super::load_current()?;
    let shifts: u32 = directive.role_shifts.iter().map(|s| s.count).sum();
    let focus: Vec<String> = directive
        .focus
        .iter()
        .map(|(focus, weight)| format!("{focus:?} {weight:.2}").to_lowercase())
        .collect();
    let note = directive.note.clone();

    formica::apply_directive(&mut colony, directive);
    super::save_current(&colony)?;

    println!(
        "{} Directive applied at frame {}",
        "✓".green().bold(),
        colony.frame().to_string().cyan()
    );
    if let Some(note) = note {
        println!("  Note:         {}", note.yellow());
    }
    if !focus.is_empty() {
        println!("  Focus:        {}", focus.join(", "));
    }
    if shifts > 0 {
        println!("  Role shifts:  {shifts} workers, staggered");
    }
    println!("  Dig priority: {:.2}", colony.goals().dig_priority);

    Ok(())
}
