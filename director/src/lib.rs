#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Arena and combat-run director.
//!
//! [`ArenaDirector`] is the single entry point a host loop talks to. It owns
//! the layout generator, the wave catalog, the enemy host, and the run state
//! machine, routes the commands systems emit into the host, and feeds the
//! host's replies back into the state machine. Hosts drive it with
//! [`ArenaDirector::generate`] once per run, [`ArenaDirector::start_wave`] for
//! the first wave, and [`ArenaDirector::tick`] every frame, draining the
//! [`Event`] batches each call appends to.

use arena_director_core::{
    ActiveEnemyHandle, ArenaLayout, Command, EnemyFactory, Event, WaveNumber,
};
use arena_director_system_layout::{LayoutGenerator, LayoutTuning};
use arena_director_system_run_state::{
    Config as RunConfig, LootLedger, RunPhase, RunState, RunStateMachine,
};
use arena_director_system_wave_director::{register, WaveDirector, WaveOrders};
use arena_director_wave_catalog::{Bestiary, WaveCatalog};
use arena_director_world::{self as world, query, World};
use serde::{Deserialize, Serialize};

/// Everything needed to construct a director besides the enemy factory.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// Run length and pacing.
    pub run: RunConfig,
    /// Placement constraints for generated arenas.
    pub layout: LayoutTuning,
    /// Wave compositions.
    pub catalog: WaveCatalog,
}

/// Host-facing facade over layout generation, wave spawning, and run tracking.
#[derive(Debug)]
pub struct ArenaDirector<F = Bestiary> {
    generator: LayoutGenerator,
    catalog: WaveCatalog,
    factory: F,
    world: World,
    waves: WaveDirector,
    run: RunStateMachine,
    layout: Option<ArenaLayout>,
    // Every enemy the latest wave spawned, dead or alive, so corpses are swept too.
    spawned: Vec<ActiveEnemyHandle>,
    pending: Vec<Command>,
}

impl Default for ArenaDirector<Bestiary> {
    fn default() -> Self {
        Self::new(DirectorConfig::default(), Bestiary::default())
    }
}

impl<F: EnemyFactory> ArenaDirector<F> {
    /// Creates a director with no arena. Waves cannot start until [`Self::generate`] runs.
    #[must_use]
    pub fn new(config: DirectorConfig, factory: F) -> Self {
        Self {
            generator: LayoutGenerator::new(config.layout),
            catalog: config.catalog,
            factory,
            world: World::new(),
            waves: WaveDirector::new(),
            run: RunStateMachine::new(config.run),
            layout: None,
            spawned: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Generates the arena for `seed`, discarding every enemy and all run progress.
    pub fn generate(&mut self, seed: u64) -> &ArenaLayout {
        let _ = self.run.reset();
        self.despawn_everything();

        let layout = self.generator.generate(seed);
        let report = layout.report();
        log::info!(
            "generated `{}` arena for seed {seed}: {}/{} cover, {}/{} spawn points",
            layout.template().name(),
            report.placed_cover,
            report.requested_cover,
            report.placed_spawn_points,
            report.requested_spawn_points,
        );
        self.layout.insert(layout)
    }

    /// Starts `wave`, despawning whatever the previous wave left behind.
    ///
    /// Invalid requests are logged and ignored; the return value reports
    /// whether the wave started.
    pub fn start_wave(&mut self, wave: WaveNumber, out_events: &mut Vec<Event>) -> bool {
        self.try_start_wave(wave, out_events).is_some()
    }

    fn try_start_wave(
        &mut self,
        wave: WaveNumber,
        out_events: &mut Vec<Event>,
    ) -> Option<WaveOrders> {
        if let Err(error) = self.run.check_wave(wave) {
            log::warn!("ignoring start of wave {wave}: {error}");
            return None;
        }

        let spawn_points = self
            .layout
            .as_ref()
            .map(ArenaLayout::spawn_points)
            .unwrap_or_default();
        let mut commands = Vec::new();
        let orders = match self.waves.start_wave(
            wave,
            spawn_points,
            &self.catalog,
            &self.factory,
            &self.spawned,
            &self.world,
            &mut commands,
        ) {
            Ok(orders) => orders,
            Err(error) => {
                log::warn!("ignoring start of wave {wave}: {error}");
                return None;
            }
        };

        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        self.run.handle_events(&events);

        let handles = register(&events);
        self.spawned.clone_from(&handles);
        match self.run.begin_wave(wave, handles) {
            Ok(stale) => {
                if !stale.is_empty() {
                    log::debug!("dropped {} stale handles from the previous wave", stale.len());
                }
            }
            Err(error) => {
                log::warn!("ignoring start of wave {wave}: {error}");
                return None;
            }
        }

        out_events.extend(events);
        out_events.push(Event::WaveStarted {
            wave,
            spawned: orders.spawned,
        });
        Some(orders)
    }

    /// Advances the run by `dt` seconds.
    pub fn tick(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        world::apply(&mut self.world, Command::Tick { dt }, out_events);

        self.pending.clear();
        self.run
            .tick(dt, &self.world, &mut self.pending, out_events);

        let commands = std::mem::take(&mut self.pending);
        for command in commands {
            self.apply(command, out_events);
        }
    }

    /// Routes a command to the system that owns it.
    ///
    /// Host commands reach the enemy host and their replies update the run;
    /// `StartWave` goes through [`Self::start_wave`].
    pub fn apply(&mut self, command: Command, out_events: &mut Vec<Event>) {
        match command {
            Command::StartWave { wave } => {
                let _ = self.start_wave(wave, out_events);
            }
            command => {
                let mut events = Vec::new();
                world::apply(&mut self.world, command, &mut events);
                self.run.handle_events(&events);
                out_events.extend(events);
            }
        }
    }

    /// Prunes the active roster and reports whether no live enemy remains.
    pub fn is_wave_complete(&mut self) -> bool {
        self.run.is_wave_complete(&self.world)
    }

    /// Returns to [`RunPhase::NoWave`] without regenerating the arena.
    pub fn reset_run_state(&mut self) {
        let _ = self.run.reset();
        self.despawn_everything();
    }

    /// Enables or disables automatic wave progression.
    pub fn set_auto_progress(&mut self, enabled: bool) {
        self.run.set_auto_progress(enabled);
    }

    /// Sets the countdown between waves, clamped to zero or more.
    pub fn set_transition_delay(&mut self, delay: f32) {
        self.run.set_transition_delay(delay);
    }

    /// Progress of the current run.
    #[must_use]
    pub fn run_state(&self) -> &RunState {
        self.run.state()
    }

    /// Phase of the current run.
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.run.phase()
    }

    /// Arena produced by the latest [`Self::generate`] call.
    #[must_use]
    pub fn layout(&self) -> Option<&ArenaLayout> {
        self.layout.as_ref()
    }

    /// Loot accumulated during the current run.
    #[must_use]
    pub fn ledger(&self) -> &LootLedger {
        self.run.ledger()
    }

    /// Hands the run's loot to the orchestrator, which decides whether to keep it.
    pub fn take_ledger(&mut self) -> LootLedger {
        self.run.take_ledger()
    }

    /// Wave compositions used by the director.
    #[must_use]
    pub fn catalog(&self) -> &WaveCatalog {
        &self.catalog
    }

    /// Read-only access to the enemy host.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the enemy host for systems outside the director.
    ///
    /// Changes made here are not reported to the run; the next poll picks them up.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn despawn_everything(&mut self) {
        self.spawned.clear();
        let mut discarded = Vec::new();
        for snapshot in query::enemy_view(&self.world).into_vec() {
            world::apply(
                &mut self.world,
                Command::DespawnEnemy { enemy: snapshot.id },
                &mut discarded,
            );
        }
    }
}
