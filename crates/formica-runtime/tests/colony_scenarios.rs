//! Whole-colony scenarios: long runs, deaths, directives and checkpoints.

use formica_core::agent::{role_of, Role};
use formica_core::context::SimulationContext;
use formica_core::goals::{Directive, Phase, RoleShift};
use formica_core::params::TuningPatch;
use formica_core::terrain::BEDROCK;
use formica_runtime::checkpoint::{deserialize, serialize};
use formica_runtime::colony::{Colony, ColonyConfig, ColonyEvent};
use formica_runtime::goals::apply_pending_shifts;
use formica_runtime::snapshot::ColonySnapshot;

fn seeded(seed: u64) -> Colony {
    Colony::with_context(ColonyConfig::default(), SimulationContext::seeded(seed)).expect("colony")
}

#[test]
fn fresh_colony_starts_at_day_one() {
    let colony = seeded(1);
    assert_eq!(colony.agents().iter().filter(|a| a.is_queen).count(), 1);
    assert_eq!(colony.agents().iter().filter(|a| !a.is_queen).count(), 8);
    assert_eq!(colony.total_dug(), 0);
    assert_eq!(colony.frame(), 0);
    assert_eq!(colony.sim_day(), 1);
    assert_eq!(colony.goals().phase, Phase::Shaft);
}

#[test]
fn one_day_of_digging() {
    let mut colony = seeded(2);
    let mut last_dug = 0;
    let mut days = Vec::new();
    for _ in 0..18_000 {
        for event in colony.tick() {
            if let ColonyEvent::DayStarted { day } = event {
                days.push(day);
            }
        }
        let dug = colony.total_dug();
        assert!(dug >= last_dug, "total dug went backwards");
        last_dug = dug;
    }
    assert_eq!(colony.frame(), 18_000);
    assert_eq!(colony.sim_day(), 2);
    assert_eq!(days, vec![2]);
    assert!(colony.total_dug() > 0);
    assert!(colony.terrain().cells().iter().all(|&h| h <= BEDROCK));
    assert!(colony.agents().len() + colony.brood().len() <= colony.config().population_cap + 1);

    // The frame stays intact.
    let rows = colony.terrain().rows() as i32;
    let cols = colony.terrain().cols() as i32;
    for col in 0..cols {
        assert_eq!(colony.terrain().hardness(col, rows - 1), BEDROCK);
    }
}

#[test]
fn colonies_do_not_panic_across_seeds() {
    for seed in 10..16 {
        let mut colony = seeded(seed);
        colony.run(3_000);
        for agent in colony.agents() {
            assert!(agent.position.x.is_finite() && agent.position.y.is_finite());
            assert!(colony.terrain().in_bounds(agent.position.cell().0, agent.position.cell().1));
        }
    }
}

#[test]
fn dead_queen_lays_no_more_eggs() {
    let mut colony = seeded(3);
    for agent in colony.agents_mut().iter_mut().filter(|a| a.is_queen) {
        agent.energy = 0.0;
    }
    colony.tick();
    assert!(!colony.has_queen());
    let eggs_before = colony.counters().eggs_laid;
    colony.run(2_500);
    assert_eq!(colony.counters().eggs_laid, eggs_before);
}

#[test]
fn queen_lays_on_schedule() {
    let mut colony = seeded(4);
    let interval = colony.params().queen_spawn_interval;
    colony.run(interval);
    assert_eq!(colony.counters().eggs_laid, 1);
    assert_eq!(colony.brood().len(), 1);
}

#[test]
fn directive_overrides_then_expires() {
    let mut colony = seeded(5);
    let interval = colony.config().goals_interval;
    colony.apply_directive(Directive {
        dig_priority: Some(0.2),
        duration: Some(interval),
        tuning: TuningPatch { forage_radius: Some(12.0), ..Default::default() },
        note: Some("stock up".to_string()),
        ..Default::default()
    });
    assert!((colony.goals().dig_priority - 0.2).abs() < 1e-9);
    assert_eq!(colony.params().forage_radius, 12.0);
    assert_eq!(ColonySnapshot::capture(&colony).directive.as_deref(), Some("stock up"));

    let mut expired = false;
    for _ in 0..interval {
        expired |= colony.tick().iter().any(|e| matches!(e, ColonyEvent::DirectiveExpired));
    }
    assert!(expired);
    assert!(colony.goals().directive.is_none());
    assert!(colony.goals().dig_priority > 0.2);
    // Tuning stays after the directive is gone.
    assert_eq!(colony.params().forage_radius, 12.0);
}

#[test]
fn dig_priority_override_is_clamped() {
    let mut colony = seeded(6);
    colony.apply_directive(Directive { dig_priority: Some(3.0), ..Default::default() });
    assert_eq!(colony.goals().dig_priority, 1.0);
}

#[test]
fn role_shifts_are_staggered() {
    let mut colony = seeded(7);
    colony.apply_directive(Directive {
        role_shifts: vec![RoleShift { from: None, to: Role::Forager, count: 3 }],
        ..Default::default()
    });
    let foragers = |c: &Colony| c.agents().iter().filter(|a| role_of(a) == Role::Forager).count();

    apply_pending_shifts(&mut colony);
    assert_eq!(foragers(&colony), 2);
    apply_pending_shifts(&mut colony);
    assert_eq!(foragers(&colony), 3);
    let pending = colony.goals().directive.as_ref().map(|d| d.pending_shifts.len());
    assert_eq!(pending, Some(0));
}

#[test]
fn checkpoint_mid_run_resumes() {
    let mut colony = seeded(8);
    colony.run(2_000);
    let json = serialize(&colony).expect("serialize");
    let mut restored = deserialize(&json);

    assert_eq!(restored.frame(), colony.frame());
    assert_eq!(restored.terrain().cells(), colony.terrain().cells());
    assert_eq!(restored.counters(), colony.counters());
    assert_eq!(restored.goals().phase, colony.goals().phase);
    assert_eq!(restored.brood(), colony.brood());
    assert_eq!(restored.food(), colony.food());

    restored.run(500);
    assert_eq!(restored.frame(), 2_500);
    assert!(restored.total_dug() >= colony.total_dug());
}

#[test]
fn snapshot_tracks_population() {
    let mut colony = seeded(9);
    colony.run(600);
    let snap = ColonySnapshot::capture(&colony);
    assert_eq!(snap.population, colony.agents().iter().filter(|a| !a.is_queen).count());
    assert_eq!(snap.roles.values().sum::<usize>(), snap.population);
    assert_eq!(snap.brood.total(), colony.brood().len());
    assert!(snap.avg_energy > 0.0 && snap.avg_energy <= 1.0);
    assert!(!snap.to_string().is_empty());
}
