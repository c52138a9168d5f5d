use std::collections::BTreeMap;

use anyhow::{bail, Result};
use arena_director::ArenaDirector;
use arena_director_core::{Command, EnemyFactory, Event, LootKind, WaveNumber};
use arena_director_world::query;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Parameters of a headless run.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Options {
    /// Seed for the arena and for the order in which enemies are defeated.
    pub(crate) seed: u64,
    /// Simulated seconds per tick.
    pub(crate) tick_seconds: f32,
    /// Upper bound on ticks before the run is abandoned.
    pub(crate) max_ticks: u64,
    /// Start each wave as soon as the previous one clears instead of waiting for the director.
    pub(crate) manual: bool,
}

/// Summary of a finished or abandoned run.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Outcome {
    pub(crate) ticks: u64,
    pub(crate) waves_cleared: u32,
    pub(crate) enemies_defeated: u32,
    pub(crate) run_completed: bool,
    /// Loot kept because the run completed.
    pub(crate) inventory: BTreeMap<LootKind, u64>,
    /// Loot lost because the run was abandoned.
    pub(crate) forfeited: u64,
}

/// Plays a run where one living enemy falls every tick.
pub(crate) fn run<F: EnemyFactory>(
    director: &mut ArenaDirector<F>,
    options: &Options,
) -> Result<Outcome> {
    let mut rng = ChaCha8Rng::seed_from_u64(options.seed);
    let mut outcome = Outcome::default();
    let mut events = Vec::new();

    let _ = director.generate(options.seed);
    if !director.start_wave(WaveNumber::new(1), &mut events) {
        bail!("the first wave could not start; the arena has no spawn points");
    }

    while outcome.ticks < options.max_ticks && !outcome.run_completed {
        let living = query::living_enemies(director.world());
        if let Some(&enemy) = living.choose(&mut rng) {
            director.apply(Command::KillEnemy { enemy }, &mut events);
        }
        director.tick(options.tick_seconds, &mut events);
        outcome.ticks += 1;

        let mut next_wave = None;
        for event in events.drain(..) {
            match event {
                Event::WaveStarted { wave, spawned } => {
                    log::info!("wave {wave} started with {spawned} enemies");
                }
                Event::EnemyDied { enemy, kind, .. } => {
                    outcome.enemies_defeated += 1;
                    log::debug!("{kind} {enemy:?} defeated");
                }
                Event::WaveCompleted { wave } => {
                    outcome.waves_cleared += 1;
                    if options.manual {
                        next_wave = Some(wave.next());
                    }
                }
                Event::TransitionStarted { next, delay } => {
                    log::info!("wave {next} begins in {delay:.1}s");
                }
                Event::RunCompleted { wave } => {
                    log::info!("run completed at wave {wave}");
                    outcome.run_completed = true;
                }
                _ => {}
            }
        }

        if let Some(wave) = next_wave.filter(|_| !outcome.run_completed) {
            let _ = director.start_wave(wave, &mut events);
        }
    }

    let ledger = director.take_ledger();
    if outcome.run_completed {
        ledger.finalize(&mut outcome.inventory);
    } else {
        log::warn!("run abandoned after {} ticks", outcome.ticks);
        outcome.forfeited = ledger.discard();
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use arena_director::DirectorConfig;
    use arena_director_system_run_state::Config as RunConfig;
    use arena_director_wave_catalog::Bestiary;

    use super::*;

    fn director(auto_progress: bool) -> ArenaDirector {
        ArenaDirector::new(
            DirectorConfig {
                run: RunConfig {
                    total_waves: 3,
                    auto_progress,
                    transition_delay: 0.5,
                },
                ..DirectorConfig::default()
            },
            Bestiary::default(),
        )
    }

    fn options(manual: bool, max_ticks: u64) -> Options {
        Options {
            seed: 7,
            tick_seconds: 0.1,
            max_ticks,
            manual,
        }
    }

    #[test]
    fn completed_run_keeps_its_loot() {
        let outcome = run(&mut director(true), &options(false, 10_000)).expect("run starts");

        assert!(outcome.run_completed);
        assert_eq!(outcome.waves_cleared, 3);
        // 3 + 6 + 6 enemies across the first three default waves.
        assert_eq!(outcome.enemies_defeated, 15);
        assert_eq!(outcome.inventory.get(&LootKind::new("credits")), Some(&169));
        assert_eq!(outcome.inventory.get(&LootKind::new("seeds")), Some(&3));
        assert_eq!(outcome.forfeited, 0);
    }

    #[test]
    fn manual_run_completes_without_auto_progress() {
        let outcome = run(&mut director(false), &options(true, 10_000)).expect("run starts");

        assert!(outcome.run_completed);
        assert_eq!(outcome.waves_cleared, 3);
    }

    #[test]
    fn abandoned_run_forfeits_its_loot() {
        let outcome = run(&mut director(true), &options(false, 2)).expect("run starts");

        assert!(!outcome.run_completed);
        assert!(outcome.inventory.is_empty());
        assert_eq!(outcome.forfeited, 20);
    }

    #[test]
    fn same_seed_same_outcome() {
        let first = run(&mut director(true), &options(false, 10_000)).expect("run starts");
        let second = run(&mut director(true), &options(false, 10_000)).expect("run starts");
        assert_eq!(first, second);
    }
}
