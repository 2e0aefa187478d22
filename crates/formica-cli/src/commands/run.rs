//! Run the colony simulation.

use anyhow::{Context, Result};
use colored::Colorize;
use formica::prelude::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::Config;

/// Frames between wall-clock checks.
const BUDGET_STRIDE: u64 = 64;

pub fn run(ticks: Option<u64>, budget_ms: Option<u64>, verbose: bool) -> Result<()> {
    let config = Config::load()?;
    let ticks = ticks.unwrap_or(config.run.ticks);
    let budget = budget_ms.or(config.run.budget_ms).map(Duration::from_millis);

    println!("{} Loading colony...", "→".blue());
    let mut colony = super::load_current()?;
    let before = colony.stats();
    println!(
        "  Loaded: day {}, frame {}, {} agents",
        before.sim_day.to_string().cyan(),
        before.frame.to_string().cyan(),
        before.agents_alive.to_string().cyan()
    );

    println!("{} Running {} ticks...", "→".blue(), ticks.to_string().cyan());

    let pb = ProgressBar::new(ticks);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ticks")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let started = Instant::now();
    let mut ran = 0;
    while ran < ticks {
        if ran % BUDGET_STRIDE == 0 {
            if let Some(budget) = budget {
                if started.elapsed() >= budget {
                    debug!(ran, budget_ms = budget.as_millis() as u64, "Wall-clock budget spent");
                    break;
                }
            }
        }
        for event in colony.tick() {
            if let Some(line) = describe(&event, verbose) {
                pb.println(line);
            }
        }
        ran += 1;
        pb.inc(1);
    }
    pb.finish_and_clear();

    super::save_current(&colony)?;

    let after = colony.stats();
    println!();
    if ran < ticks {
        println!(
            "{} Budget reached after {} of {} ticks",
            "•".yellow(),
            ran.to_string().yellow(),
            ticks
        );
    }
    println!("{} Simulation complete!", "✓".green().bold());
    println!(
        "  Frame:   {} → {}",
        before.frame.to_string().yellow(),
        after.frame.to_string().green()
    );
    println!(
        "  Agents:  {} → {}",
        before.agents_alive.to_string().yellow(),
        after.agents_alive.to_string().green()
    );
    println!(
        "  Dug:     {} → {}",
        before.total_dug.to_string().yellow(),
        after.total_dug.to_string().green()
    );
    println!("  Phase:   {}", after.phase.as_str().cyan());
    println!("  Elapsed: {:.2?}", started.elapsed());

    Ok(())
}

/// Progress line for an event worth showing. Routine agent events only
/// appear with `--verbose`.
fn describe(event: &ColonyEvent, verbose: bool) -> Option<String> {
    match event {
        ColonyEvent::DayStarted { day } => Some(format!("  {} Day {} begins", "☀".yellow(), day)),
        ColonyEvent::PhaseChanged { from, to } => Some(format!(
            "  {} Phase {} → {}",
            "→".blue(),
            from.as_str(),
            to.as_str().cyan()
        )),
        ColonyEvent::Emerged { agent } => Some(format!("  {} Worker {} emerged", "✓".green(), agent)),
        ColonyEvent::BroodStarved { brood } => Some(format!("  {} Larva #{} starved", "✗".red(), brood.0)),
        ColonyEvent::DirectiveExpired => Some(format!("  {} Directive expired", "•".yellow())),
        ColonyEvent::Agent(AgentEvent::Died { agent, cause }) => {
            Some(format!("  {} Agent {} died ({:?})", "✗".red(), agent, cause))
        }
        other if verbose => Some(format!("  {other:?}")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routine_events_need_verbose() {
        let egg = ColonyEvent::EggLaid { brood: BroodId(4) };
        assert!(describe(&egg, false).is_none());
        assert!(describe(&egg, true).is_some());
        let day = ColonyEvent::DayStarted { day: 3 };
        assert!(describe(&day, false).is_some_and(|s| s.contains("Day 3")));
    }
}
