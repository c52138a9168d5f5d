#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Run and wave state machine for a combat run.
//!
//! The machine polls the active-enemy roster once per tick. When the roster
//! empties it acknowledges the wave, announces it exactly once, and then either
//! completes the run, schedules the next wave after a countdown, or idles until
//! the host starts the next wave itself. Starting a wave is requested through
//! [`Command::StartWave`] so that the machine never reaches into the spawner.

pub mod ledger;
pub mod roster;

use arena_director_core::{ActiveEnemyHandle, Command, Event, LivenessProbe, WaveNumber};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ledger::{LootLedger, LootSink};
pub use roster::ActiveRoster;

/// Seconds between a cleared wave and the next one when auto-progress is on.
pub const DEFAULT_TRANSITION_DELAY: f32 = 3.0;

/// Number of waves in a run unless configured otherwise.
pub const DEFAULT_TOTAL_WAVES: u32 = 5;

/// Configuration parameters required to construct the run state machine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Waves that make up a run. Clamped to at least one.
    pub total_waves: u32,
    /// Whether cleared waves schedule the next one automatically.
    pub auto_progress: bool,
    /// Countdown between a cleared wave and the next one.
    pub transition_delay: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            total_waves: DEFAULT_TOTAL_WAVES,
            auto_progress: true,
            transition_delay: DEFAULT_TRANSITION_DELAY,
        }
    }
}

impl Config {
    /// Creates a configuration for a run of `total_waves` with default pacing.
    #[must_use]
    pub fn new(total_waves: u32) -> Self {
        Self {
            total_waves,
            ..Self::default()
        }
    }
}

/// Reasons the machine refuses to begin a wave.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum BeginWaveError {
    /// Wave numbers are one-based.
    #[error("wave numbers start at 1")]
    InvalidWave,
    /// The wave index never moves backwards within a run.
    #[error("cannot begin wave {requested} after wave {current}; reset the run first")]
    WaveRegression {
        /// Wave currently in progress.
        current: WaveNumber,
        /// Wave that was requested.
        requested: WaveNumber,
    },
    /// A cleared wave is announced once; restarting it would announce it again.
    #[error("wave {0} was already cleared this run")]
    WaveAlreadyCleared(WaveNumber),
}

/// Observable phase of a run, derived from [`RunState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// No wave has started since the arena was generated or the run reset.
    NoWave,
    /// Enemies of the current wave are still alive.
    WaveActive,
    /// The current wave is cleared and the next one waits for the host.
    WaveCleared,
    /// The countdown to the next wave is running.
    WaveTransition,
    /// The final wave was cleared.
    RunComplete,
}

/// Progress of a single run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunState {
    current_wave: WaveNumber,
    total_waves: u32,
    wave_acknowledged: bool,
    transitioning: bool,
    transition_remaining: f32,
    run_completed: bool,
    completion_acknowledged: bool,
}

impl RunState {
    fn new(total_waves: u32) -> Self {
        Self {
            current_wave: WaveNumber::NONE,
            total_waves,
            wave_acknowledged: false,
            transitioning: false,
            transition_remaining: 0.0,
            run_completed: false,
            completion_acknowledged: false,
        }
    }

    /// Wave currently in progress, or [`WaveNumber::NONE`] before the first one.
    #[must_use]
    pub const fn current_wave(&self) -> WaveNumber {
        self.current_wave
    }

    /// Waves that make up the run.
    #[must_use]
    pub const fn total_waves(&self) -> u32 {
        self.total_waves
    }

    /// Whether the current wave's completion has been announced.
    #[must_use]
    pub const fn wave_acknowledged(&self) -> bool {
        self.wave_acknowledged
    }

    /// Whether the countdown to the next wave is running.
    #[must_use]
    pub const fn transitioning(&self) -> bool {
        self.transitioning
    }

    /// Seconds left on the countdown.
    #[must_use]
    pub const fn transition_remaining(&self) -> f32 {
        self.transition_remaining
    }

    /// Whether the final wave has been cleared.
    #[must_use]
    pub const fn run_completed(&self) -> bool {
        self.run_completed
    }

    /// Whether the run's completion has been announced.
    #[must_use]
    pub const fn completion_acknowledged(&self) -> bool {
        self.completion_acknowledged
    }

    /// Phase derived from the flags above.
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        if self.current_wave.is_none() {
            RunPhase::NoWave
        } else if self.transitioning {
            RunPhase::WaveTransition
        } else if !self.wave_acknowledged {
            RunPhase::WaveActive
        } else if self.run_completed {
            RunPhase::RunComplete
        } else {
            RunPhase::WaveCleared
        }
    }
}

/// State machine that detects wave and run completion.
#[derive(Debug)]
pub struct RunStateMachine {
    state: RunState,
    roster: ActiveRoster,
    ledger: LootLedger,
    auto_progress: bool,
    transition_delay: f32,
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl RunStateMachine {
    /// Creates a machine in the [`RunPhase::NoWave`] phase.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            state: RunState::new(config.total_waves.max(1)),
            roster: ActiveRoster::new(),
            ledger: LootLedger::new(),
            auto_progress: config.auto_progress,
            transition_delay: sanitize_delay(config.transition_delay),
        }
    }

    /// Current run progress.
    #[must_use]
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Phase derived from the current run progress.
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.state.phase()
    }

    /// Handles of the enemies the current wave is waiting on.
    #[must_use]
    pub fn roster(&self) -> &ActiveRoster {
        &self.roster
    }

    /// Loot accumulated during the run.
    #[must_use]
    pub fn ledger(&self) -> &LootLedger {
        &self.ledger
    }

    /// Hands the accumulated loot to the caller, leaving an empty ledger behind.
    pub fn take_ledger(&mut self) -> LootLedger {
        std::mem::take(&mut self.ledger)
    }

    /// Whether cleared waves schedule the next one automatically.
    #[must_use]
    pub const fn auto_progress(&self) -> bool {
        self.auto_progress
    }

    /// Enables or disables automatic wave progression.
    pub fn set_auto_progress(&mut self, enabled: bool) {
        self.auto_progress = enabled;
    }

    /// Countdown applied between waves.
    #[must_use]
    pub const fn transition_delay(&self) -> f32 {
        self.transition_delay
    }

    /// Sets the countdown between waves, clamping negative or non-finite values to zero.
    ///
    /// A countdown that is already running keeps its remaining time.
    pub fn set_transition_delay(&mut self, delay: f32) {
        self.transition_delay = sanitize_delay(delay);
    }

    /// Changes the number of waves in the run.
    pub fn set_total_waves(&mut self, total_waves: u32) {
        self.state.total_waves = total_waves.max(1);
    }

    /// Checks whether `wave` may begin without mutating anything.
    pub fn check_wave(&self, wave: WaveNumber) -> Result<(), BeginWaveError> {
        if wave.is_none() {
            return Err(BeginWaveError::InvalidWave);
        }
        if wave < self.state.current_wave {
            return Err(BeginWaveError::WaveRegression {
                current: self.state.current_wave,
                requested: wave,
            });
        }
        if wave == self.state.current_wave && self.state.wave_acknowledged {
            return Err(BeginWaveError::WaveAlreadyCleared(wave));
        }
        Ok(())
    }

    /// Records that `wave` started with the provided enemies.
    ///
    /// Clears per-wave bookkeeping, cancels any running countdown, and returns
    /// the handles the previous wave still held.
    pub fn begin_wave(
        &mut self,
        wave: WaveNumber,
        handles: Vec<ActiveEnemyHandle>,
    ) -> Result<Vec<ActiveEnemyHandle>, BeginWaveError> {
        self.check_wave(wave)?;

        self.state.current_wave = wave;
        self.state.wave_acknowledged = false;
        self.state.transitioning = false;
        self.state.transition_remaining = 0.0;
        log::info!(
            "wave {wave}/{} started with {} enemies",
            self.state.total_waves,
            handles.len()
        );
        Ok(self.roster.replace(handles))
    }

    /// Returns to [`RunPhase::NoWave`], clearing the roster and ledger.
    ///
    /// The drained handles are returned so the caller can remove their enemies.
    pub fn reset(&mut self) -> Vec<ActiveEnemyHandle> {
        self.state = RunState::new(self.state.total_waves);
        self.ledger = LootLedger::new();
        self.roster.drain()
    }

    /// Consumes host events: defeats feed the ledger and both defeats and
    /// despawns unregister their handle.
    pub fn handle_events(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemyDied { enemy, loot, .. } => {
                    self.ledger.record_drop(loot);
                    if !self.roster.unregister(*enemy) {
                        log::debug!("defeated enemy {enemy:?} was not in the active roster");
                    }
                }
                Event::EnemyDespawned { enemy } => {
                    if !self.roster.unregister(*enemy) {
                        log::debug!("despawned enemy {enemy:?} was not in the active roster");
                    }
                }
                _ => {}
            }
        }
    }

    /// Prunes the roster and reports whether the current wave has no live enemies left.
    ///
    /// Never announces anything, so it is safe to call any number of times.
    pub fn is_wave_complete<P: LivenessProbe + ?Sized>(&mut self, probe: &P) -> bool {
        let _ = self.roster.prune(probe);
        self.roster.is_empty()
    }

    /// Advances the machine by `dt` seconds.
    pub fn tick<P: LivenessProbe + ?Sized>(
        &mut self,
        dt: f32,
        probe: &P,
        out_commands: &mut Vec<Command>,
        out_events: &mut Vec<Event>,
    ) {
        if self.state.transitioning {
            self.advance_transition(sanitize_delay(dt), out_commands);
            return;
        }

        if self.state.current_wave.is_none() || self.state.wave_acknowledged {
            return;
        }

        if !self.is_wave_complete(probe) {
            return;
        }

        let wave = self.state.current_wave;
        self.state.wave_acknowledged = true;
        log::info!("wave {wave} cleared");
        out_events.push(Event::WaveCompleted { wave });

        if wave.get() == self.state.total_waves {
            if !self.state.completion_acknowledged {
                self.state.run_completed = true;
                self.state.completion_acknowledged = true;
                log::info!("run completed after wave {wave}");
                out_events.push(Event::RunCompleted { wave });
            }
        } else if self.auto_progress && wave.get() < self.state.total_waves {
            self.state.transitioning = true;
            self.state.transition_remaining = self.transition_delay;
            log::debug!(
                "next wave in {:.2}s",
                self.state.transition_remaining
            );
            out_events.push(Event::TransitionStarted {
                next: wave.next(),
                delay: self.transition_delay,
            });
        }
    }

    fn advance_transition(&mut self, dt: f32, out_commands: &mut Vec<Command>) {
        self.state.transition_remaining -= dt;
        if self.state.transition_remaining > 0.0 {
            return;
        }

        self.state.transitioning = false;
        self.state.transition_remaining = 0.0;
        let current = self.state.current_wave;
        if self.auto_progress && current.get() < self.state.total_waves {
            out_commands.push(Command::StartWave {
                wave: current.next(),
            });
        }
    }
}

fn sanitize_delay(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
