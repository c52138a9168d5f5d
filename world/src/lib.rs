#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative enemy host for the arena director.
//!
//! The world owns every spawned enemy in a generational slot map. Handles that
//! outlive their enemy, whether it was despawned by the director or removed by
//! an unrelated system, resolve to [`Liveness::Missing`] in constant time
//! instead of aliasing whatever occupies the reused slot.

use arena_director_core::{
    Command, EnemyId, EnemyKind, Event, Liveness, LivenessProbe, LootDrop, Vec2,
};
use slotmap::SlotMap;

/// Enemy stored inside the world.
#[derive(Clone, Debug)]
struct Enemy {
    kind: EnemyKind,
    position: Vec2,
    spawn_point: usize,
    health: u32,
    loot: LootDrop,
    dead: bool,
}

/// Represents the authoritative state of every enemy in the arena.
#[derive(Debug, Default)]
pub struct World {
    enemies: SlotMap<EnemyId, Enemy>,
    clock: f32,
    tick_index: u64,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn kill(&mut self, enemy: EnemyId, out_events: &mut Vec<Event>) {
        let Some(state) = self.enemies.get_mut(enemy) else {
            log::debug!("ignoring kill for missing enemy {enemy:?}");
            return;
        };
        if state.dead {
            return;
        }

        state.dead = true;
        state.health = 0;
        out_events.push(Event::EnemyDied {
            enemy,
            kind: state.kind.clone(),
            loot: state.loot.clone(),
        });
    }
}

impl LivenessProbe for World {
    fn liveness(&self, enemy: EnemyId) -> Liveness {
        match self.enemies.get(enemy) {
            Some(state) if state.dead => Liveness::Dead,
            Some(_) => Liveness::Alive,
            None => Liveness::Missing,
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
            world.clock += dt;
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnEnemy {
            prototype,
            position,
            spawn_point,
        } => {
            let kind = prototype.kind().clone();
            let enemy = world.enemies.insert(Enemy {
                kind: kind.clone(),
                position,
                spawn_point,
                health: prototype.health().max(1),
                loot: prototype.loot().clone(),
                dead: false,
            });
            out_events.push(Event::EnemySpawned {
                enemy,
                kind,
                position,
                spawn_point,
            });
        }
        Command::DamageEnemy { enemy, amount } => {
            let Some(state) = world.enemies.get_mut(enemy) else {
                return;
            };
            if state.dead || amount == 0 {
                return;
            }

            state.health = state.health.saturating_sub(amount);
            if state.health == 0 {
                world.kill(enemy, out_events);
            } else {
                out_events.push(Event::EnemyDamaged {
                    enemy,
                    remaining: state.health,
                });
            }
        }
        Command::KillEnemy { enemy } => world.kill(enemy, out_events),
        Command::DespawnEnemy { enemy } => {
            if world.enemies.remove(enemy).is_some() {
                out_events.push(Event::EnemyDespawned { enemy });
            }
        }
        Command::StartWave { .. } => {}
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use arena_director_core::{EnemyId, EnemyKind, Liveness, LivenessProbe, Vec2};

    /// Immutable representation of a single enemy's state used for queries.
    #[derive(Clone, Debug, PartialEq)]
    pub struct EnemySnapshot {
        /// Identifier of the enemy.
        pub id: EnemyId,
        /// Type of the enemy.
        pub kind: EnemyKind,
        /// Floor position of the enemy.
        pub position: Vec2,
        /// Spawn point index the enemy came from.
        pub spawn_point: usize,
        /// Remaining health.
        pub health: u32,
        /// Indicates whether the enemy has been defeated.
        pub dead: bool,
    }

    /// Read-only snapshot describing every enemy in the world.
    #[derive(Clone, Debug, Default)]
    pub struct EnemyView {
        snapshots: Vec<EnemySnapshot>,
    }

    impl EnemyView {
        /// Iterator over the captured snapshots in deterministic order.
        pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<EnemySnapshot> {
            self.snapshots
        }
    }

    /// Captures a read-only view of the enemies in the arena.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let mut snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .map(|(id, enemy)| EnemySnapshot {
                id,
                kind: enemy.kind.clone(),
                position: enemy.position,
                spawn_point: enemy.spawn_point,
                health: enemy.health,
                dead: enemy.dead,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        EnemyView { snapshots }
    }

    /// Identifiers of every enemy that has not been defeated, in deterministic order.
    #[must_use]
    pub fn living_enemies(world: &World) -> Vec<EnemyId> {
        let mut living: Vec<EnemyId> = world
            .enemies
            .iter()
            .filter(|(_, enemy)| !enemy.dead)
            .map(|(id, _)| id)
            .collect();
        living.sort();
        living
    }

    /// Reports the liveness of the provided enemy.
    #[must_use]
    pub fn liveness(world: &World, enemy: EnemyId) -> Liveness {
        world.liveness(enemy)
    }

    /// Number of enemies stored in the world, including defeated ones.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Total simulated seconds the world has advanced.
    #[must_use]
    pub fn clock(world: &World) -> f32 {
        world.clock
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
