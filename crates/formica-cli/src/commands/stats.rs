//! Show colony statistics.

use anyhow::{Context, Result};
use colored::Colorize;
use formica::prelude::ColonySnapshot;

pub fn run(json: bool) -> Result<()> {
    let colony = super::load_current()?;
    let snap = formica::get_snapshot(&colony);

    if json {
        let text = serde_json::to_string_pretty(&snap).context("Failed to encode snapshot")?;
        println!("{text}");
        return Ok(());
    }

    print_report(&snap);
    Ok(())
}

fn print_report(snap: &ColonySnapshot) {
    println!("{}", "Formica Colony Statistics".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("{}", "Colony".blue().bold());
    println!("  Day:               {}", snap.sim_day.to_string().cyan());
    println!("  Frame:             {}", snap.frame.to_string().cyan());
    println!("  Phase:             {}", snap.phase.as_str().cyan());
    println!("  Dig priority:      {:.2}", snap.dig_priority);
    let queen = if snap.has_queen { "alive".green() } else { "lost".red() };
    println!("  Queen:             {queen}");
    if let Some(note) = &snap.directive {
        println!("  Directive:         {}", note.yellow());
    }
    println!();

    println!("{}", "Workers".blue().bold());
    println!("  Population:        {}", snap.population.to_string().cyan());
    for (role, count) in &snap.roles {
        println!("  {:<18} {}", format!("{role}:"), count);
    }
    println!("  Avg energy:        {:.0}%", snap.avg_energy * 100.0);
    if snap.stuck_agents > 0 {
        println!("  Stuck:             {}", snap.stuck_agents.to_string().yellow());
    }
    println!();

    println!("{}", "Nest".blue().bold());
    println!("  Excavated:         {:.1}% ({} cells)", snap.dig_percent, snap.total_dug);
    println!("  Shaft depth:       {}", snap.shaft_depth);
    println!("  Galleries:         {}", snap.galleries);
    if snap.chambers.is_empty() {
        println!("  Chambers:          {}", "none yet".dimmed());
    } else {
        for (kind, count) in &snap.chambers {
            println!("  {:<18} {}", format!("{kind} chambers:"), count);
        }
    }
    println!();

    println!("{}", "Brood & Food".blue().bold());
    println!(
        "  Brood:             {} eggs, {} larvae ({} hungry), {} pupae",
        snap.brood.eggs, snap.brood.larvae, snap.brood.hungry_larvae, snap.brood.pupae
    );
    println!("  Stored food:       {}", snap.food_reserves.to_string().green());
    println!("  Sources outside:   {}", snap.forage_sources);
    println!();

    let c = &snap.counters;
    println!("{}", "Lifetime".blue().bold());
    println!("  Eggs laid:         {}", c.eggs_laid);
    println!("  Workers born:      {}", c.workers_born);
    println!("  Starved:           {} workers, {} larvae", c.starvation_deaths, c.brood_starved);
    println!("  Food collected:    {}", c.food_collected);
    println!("  Larvae fed:        {}", c.larvae_fed);

    println!();
    println!("{}", "═".repeat(40).dimmed());
}
