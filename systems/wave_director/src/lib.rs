#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave director that turns a wave number into despawn and spawn commands.
//!
//! The director never touches the enemy host directly. It clears whatever the
//! previous wave left behind, resolves every composition entry through the
//! entity factory, and hands out spawn points round-robin. Handles are built
//! afterwards from the host's `EnemySpawned` replies via [`register`].

use arena_director_core::{
    ActiveEnemyHandle, Command, EnemyFactory, EnemyKind, Event, Liveness, LivenessProbe,
    SpawnPoint, WaveNumber,
};
use arena_director_wave_catalog::WaveCatalog;
use thiserror::Error;

/// Reasons a wave cannot start. Callers log these and carry on.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StartWaveError {
    /// Wave numbers are one-based.
    #[error("wave numbers start at 1")]
    InvalidWave,
    /// No arena has been generated yet, or it holds no spawn points.
    #[error("no spawn points available for wave {0}; generate an arena first")]
    NoSpawnPoints(WaveNumber),
    /// The catalog holds no compositions.
    #[error("wave catalog has no composition for wave {0}")]
    NoComposition(WaveNumber),
}

/// Summary of the commands issued for a wave.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WaveOrders {
    /// Wave the orders belong to.
    pub wave: WaveNumber,
    /// Catalog index the composition was taken from.
    pub catalog_index: usize,
    /// Enemies requested by the composition.
    pub requested: u32,
    /// Spawn commands issued.
    pub spawned: u32,
    /// Leftover enemies from the previous wave that were despawned.
    pub despawned: u32,
    /// Composition kinds the factory did not recognise.
    pub skipped: Vec<EnemyKind>,
}

/// Issues the commands that populate a wave.
#[derive(Debug, Default)]
pub struct WaveDirector {
    scratch: Vec<Command>,
}

impl WaveDirector {
    /// Creates a wave director with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits the commands that start `wave`.
    ///
    /// Nothing is emitted when the wave cannot start. Otherwise every handle in
    /// `previous` whose enemy is still present is despawned first, then one
    /// spawn command per enemy is appended, cycling through `spawn_points`
    /// from the first one.
    #[allow(clippy::too_many_arguments)]
    pub fn start_wave<F, P>(
        &mut self,
        wave: WaveNumber,
        spawn_points: &[SpawnPoint],
        catalog: &WaveCatalog,
        factory: &F,
        previous: &[ActiveEnemyHandle],
        probe: &P,
        out: &mut Vec<Command>,
    ) -> Result<WaveOrders, StartWaveError>
    where
        F: EnemyFactory + ?Sized,
        P: LivenessProbe + ?Sized,
    {
        if wave.is_none() {
            return Err(StartWaveError::InvalidWave);
        }
        if spawn_points.is_empty() {
            return Err(StartWaveError::NoSpawnPoints(wave));
        }
        let catalog_index = catalog
            .index_for(wave)
            .ok_or(StartWaveError::NoComposition(wave))?;
        let composition = &catalog.waves()[catalog_index];

        self.scratch.clear();
        let mut orders = WaveOrders {
            wave,
            catalog_index,
            requested: composition.size(),
            ..WaveOrders::default()
        };

        for handle in previous {
            if probe.liveness(handle.enemy()) != Liveness::Missing {
                self.scratch.push(Command::DespawnEnemy {
                    enemy: handle.enemy(),
                });
                orders.despawned += 1;
            }
        }

        let mut cursor = 0usize;
        for entry in composition.entries() {
            let Some(prototype) = factory.prototype(&entry.kind) else {
                log::warn!(
                    "unknown enemy kind `{}` in wave {wave}; skipping {} spawns",
                    entry.kind,
                    entry.count
                );
                orders.skipped.push(entry.kind.clone());
                continue;
            };

            for _ in 0..entry.count {
                let spawn_point = cursor % spawn_points.len();
                cursor = cursor.wrapping_add(1);
                self.scratch.push(Command::SpawnEnemy {
                    prototype: prototype.clone(),
                    position: spawn_points[spawn_point].position,
                    spawn_point,
                });
                orders.spawned += 1;
            }
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
        Ok(orders)
    }
}

/// Builds active-enemy handles from the host's `EnemySpawned` replies.
#[must_use]
pub fn register(events: &[Event]) -> Vec<ActiveEnemyHandle> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned {
                enemy,
                kind,
                spawn_point,
                ..
            } => Some(ActiveEnemyHandle::new(*enemy, kind.clone(), *spawn_point)),
            _ => None,
        })
        .collect()
}
