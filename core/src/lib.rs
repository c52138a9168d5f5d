#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the arena director.
//!
//! This crate defines the message surface that connects the director facade,
//! the authoritative enemy host, and pure systems. Systems emit [`Command`]
//! values describing desired mutations, the host executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Arena geometry produced by the layout generator
//! is expressed with the plain value types declared here so that presentation
//! layers can attach materials and collision without depending on any system.

use std::{collections::BTreeMap, fmt};

pub use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Generational handle identifying an enemy spawned into the host.
    pub struct EnemyId;
}

/// Commands that express all permissible mutations of a combat run.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Simulated seconds that elapsed since the previous tick.
        dt: f32,
    },
    /// Requests that the host instantiate an enemy from a resolved prototype.
    SpawnEnemy {
        /// Prototype resolved by the entity factory.
        prototype: EnemyPrototype,
        /// Floor position the enemy appears at.
        position: Vec2,
        /// Index of the spawn point that produced the position.
        spawn_point: usize,
    },
    /// Applies damage to an enemy, killing it once its health reaches zero.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Amount of health removed.
        amount: u32,
    },
    /// Kills an enemy outright, releasing its loot.
    KillEnemy {
        /// Enemy that should die.
        enemy: EnemyId,
    },
    /// Removes an enemy from the host without a defeat.
    DespawnEnemy {
        /// Enemy that should be removed.
        enemy: EnemyId,
    },
    /// Requests that the director begin the provided wave.
    StartWave {
        /// One-based wave number to start.
        wave: WaveNumber,
    },
}

/// Events broadcast after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Simulated seconds that elapsed in the tick.
        dt: f32,
    },
    /// Confirms that an enemy entered the arena.
    EnemySpawned {
        /// Identifier assigned by the host.
        enemy: EnemyId,
        /// Type of the spawned enemy.
        kind: EnemyKind,
        /// Floor position the enemy occupies.
        position: Vec2,
        /// Index of the spawn point that was used.
        spawn_point: usize,
    },
    /// Reports that an enemy took damage but survived.
    EnemyDamaged {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Health left after the hit.
        remaining: u32,
    },
    /// Announces that an enemy was defeated.
    EnemyDied {
        /// Enemy that died.
        enemy: EnemyId,
        /// Type of the defeated enemy.
        kind: EnemyKind,
        /// Loot released by the defeat.
        loot: LootDrop,
    },
    /// Announces that an enemy left the host without being defeated.
    EnemyDespawned {
        /// Enemy that was removed.
        enemy: EnemyId,
    },
    /// Confirms that a wave began and reports how many enemies were requested.
    WaveStarted {
        /// Wave that began.
        wave: WaveNumber,
        /// Number of spawn commands issued for the wave.
        spawned: u32,
    },
    /// Announces that every enemy of the wave is gone.
    WaveCompleted {
        /// Wave that was cleared.
        wave: WaveNumber,
    },
    /// Announces that the timed delay before the next wave began.
    TransitionStarted {
        /// Wave that will start once the delay elapses.
        next: WaveNumber,
        /// Length of the delay in seconds.
        delay: f32,
    },
    /// Announces that the final wave of the run was cleared.
    RunCompleted {
        /// Wave that completed the run.
        wave: WaveNumber,
    },
}

/// One-based index of a wave within a run. Zero means no wave has started.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct WaveNumber(u32);

impl WaveNumber {
    /// Sentinel used before the first wave starts.
    pub const NONE: Self = Self(0);

    /// Creates a new wave number with the provided value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the wave number.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Wave that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Reports whether this is the pre-run sentinel.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for WaveNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier naming a type of enemy, such as `meleeA`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnemyKind(String);

impl EnemyKind {
    /// Creates a new enemy kind from the provided name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name of the enemy kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EnemyKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier naming a resource released as loot, such as `credits`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LootKind(String);

impl LootKind {
    /// Creates a new loot kind from the provided name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name of the loot kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LootKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for LootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Loot an enemy declares it releases when defeated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LootDrop {
    amounts: BTreeMap<LootKind, u32>,
}

impl LootDrop {
    /// Creates an empty loot drop.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` of `kind` to the drop, merging with any existing entry.
    #[must_use]
    pub fn with(mut self, kind: impl Into<LootKind>, amount: u32) -> Self {
        let entry = self.amounts.entry(kind.into()).or_insert(0);
        *entry = entry.saturating_add(amount);
        self
    }

    /// Amount of `kind` carried by the drop.
    #[must_use]
    pub fn amount(&self, kind: &LootKind) -> u32 {
        self.amounts.get(kind).copied().unwrap_or(0)
    }

    /// Iterator over the drop entries in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (&LootKind, u32)> {
        self.amounts.iter().map(|(kind, amount)| (kind, *amount))
    }

    /// Reports whether the drop carries nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amounts.values().all(|amount| *amount == 0)
    }
}

/// Template returned by the entity factory for a given enemy kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyPrototype {
    kind: EnemyKind,
    health: u32,
    #[serde(default)]
    loot: LootDrop,
}

impl EnemyPrototype {
    /// Creates a new prototype. Health is raised to at least one.
    #[must_use]
    pub fn new(kind: EnemyKind, health: u32, loot: LootDrop) -> Self {
        Self {
            kind,
            health: health.max(1),
            loot,
        }
    }

    /// Type of enemy the prototype produces.
    #[must_use]
    pub fn kind(&self) -> &EnemyKind {
        &self.kind
    }

    /// Starting health of the enemy.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Loot released when the enemy is defeated.
    #[must_use]
    pub fn loot(&self) -> &LootDrop {
        &self.loot
    }
}

/// Resolves enemy kinds into spawnable prototypes.
pub trait EnemyFactory {
    /// Returns the prototype for `kind`, or `None` when the kind is unknown.
    fn prototype(&self, kind: &EnemyKind) -> Option<EnemyPrototype>;
}

/// Liveness of an enemy as observed by the host at query time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Liveness {
    /// The enemy exists and has not been defeated.
    Alive,
    /// The enemy still exists but has been defeated.
    Dead,
    /// The handle no longer refers to an enemy in the host.
    Missing,
}

impl Liveness {
    /// Reports whether the enemy still counts toward its wave.
    #[must_use]
    pub const fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }
}

/// Read-only access to enemy liveness, implemented by the host.
pub trait LivenessProbe {
    /// Reports the liveness of the provided enemy.
    fn liveness(&self, enemy: EnemyId) -> Liveness;
}

/// Handle registered for every enemy spawned by a wave.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ActiveEnemyHandle {
    enemy: EnemyId,
    kind: EnemyKind,
    spawn_point: usize,
}

impl ActiveEnemyHandle {
    /// Creates a handle for an enemy spawned at the provided spawn point index.
    #[must_use]
    pub fn new(enemy: EnemyId, kind: EnemyKind, spawn_point: usize) -> Self {
        Self {
            enemy,
            kind,
            spawn_point,
        }
    }

    /// Generational identifier of the enemy.
    #[must_use]
    pub const fn enemy(&self) -> EnemyId {
        self.enemy
    }

    /// Type of the enemy.
    #[must_use]
    pub fn kind(&self) -> &EnemyKind {
        &self.kind
    }

    /// Index of the spawn point the enemy appeared at.
    #[must_use]
    pub const fn spawn_point(&self) -> usize {
        self.spawn_point
    }
}

/// Single `{kind, count}` entry of a wave composition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveEntry {
    /// Type of enemy to spawn.
    pub kind: EnemyKind,
    /// Number of enemies of that type.
    pub count: u32,
}

impl WaveEntry {
    /// Creates a new wave entry.
    #[must_use]
    pub fn new(kind: impl Into<EnemyKind>, count: u32) -> Self {
        Self {
            kind: kind.into(),
            count,
        }
    }
}

/// Ordered list of enemies that make up a wave.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaveComposition {
    entries: Vec<WaveEntry>,
}

impl WaveComposition {
    /// Creates a composition from the provided entries, preserving order.
    #[must_use]
    pub fn new(entries: Vec<WaveEntry>) -> Self {
        Self { entries }
    }

    /// Entries of the composition in spawn order.
    #[must_use]
    pub fn entries(&self) -> &[WaveEntry] {
        &self.entries
    }

    /// Total number of enemies requested by the composition.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |total, entry| total.saturating_add(entry.count))
    }

    /// Reports whether the composition requests no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

/// Full floor dimensions of an arena centred on the origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArenaExtents {
    width: f32,
    depth: f32,
}

impl ArenaExtents {
    /// Creates new extents. Negative dimensions are treated as zero.
    #[must_use]
    pub fn new(width: f32, depth: f32) -> Self {
        Self {
            width: width.max(0.0),
            depth: depth.max(0.0),
        }
    }

    /// Size along the x axis.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Size along the floor's second axis.
    #[must_use]
    pub const fn depth(&self) -> f32 {
        self.depth
    }

    /// Half of the width, the distance from the origin to the east or west wall.
    #[must_use]
    pub fn half_width(&self) -> f32 {
        self.width * 0.5
    }

    /// Half of the depth, the distance from the origin to the north or south wall.
    #[must_use]
    pub fn half_depth(&self) -> f32 {
        self.depth * 0.5
    }

    /// Distance from `position` to the nearest boundary, negative when outside.
    #[must_use]
    pub fn margin_of(&self, position: Vec2) -> f32 {
        let horizontal = self.half_width() - position.x.abs();
        let vertical = self.half_depth() - position.y.abs();
        horizontal.min(vertical)
    }
}

/// Immutable arena description chosen once per generation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArenaTemplate {
    name: &'static str,
    extents: ArenaExtents,
    cover_count: u32,
    spawn_point_count: u32,
}

impl ArenaTemplate {
    /// Creates a new arena template.
    #[must_use]
    pub const fn new(
        name: &'static str,
        extents: ArenaExtents,
        cover_count: u32,
        spawn_point_count: u32,
    ) -> Self {
        Self {
            name,
            extents,
            cover_count,
            spawn_point_count,
        }
    }

    /// Human readable template name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Floor dimensions of the arena.
    #[must_use]
    pub const fn extents(&self) -> ArenaExtents {
        self.extents
    }

    /// Number of cover volumes the template asks for.
    #[must_use]
    pub const fn cover_count(&self) -> u32 {
        self.cover_count
    }

    /// Number of spawn points the template asks for.
    #[must_use]
    pub const fn spawn_point_count(&self) -> u32 {
        self.spawn_point_count
    }
}

/// Side of the arena a boundary wall guards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WallSide {
    /// Wall along the negative depth edge.
    North,
    /// Wall along the positive width edge.
    East,
    /// Wall along the positive depth edge.
    South,
    /// Wall along the negative width edge.
    West,
}

impl WallSide {
    /// Every side in clockwise order starting from the north.
    pub const ALL: [WallSide; 4] = [Self::North, Self::East, Self::South, Self::West];
}

/// Rectangular area covered on the arena floor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
    /// Size along the x axis.
    pub width: f32,
    /// Size along the floor's second axis.
    pub depth: f32,
}

impl Footprint {
    /// Creates a new footprint.
    #[must_use]
    pub const fn new(width: f32, depth: f32) -> Self {
        Self { width, depth }
    }
}

/// Collision volume the presentation layer registers for a cover volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CollisionShape {
    /// Axis-aligned box.
    Box {
        /// Size along the x axis.
        width: f32,
        /// Vertical size.
        height: f32,
        /// Size along the floor's second axis.
        depth: f32,
    },
    /// Upright cylinder.
    Pillar {
        /// Radius of the cylinder.
        radius: f32,
        /// Vertical size.
        height: f32,
    },
}

impl CollisionShape {
    /// Vertical size of the shape.
    #[must_use]
    pub const fn height(&self) -> f32 {
        match self {
            Self::Box { height, .. } | Self::Pillar { height, .. } => *height,
        }
    }
}

/// One of the four walls enclosing the arena.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryWall {
    /// Side of the arena the wall guards.
    pub side: WallSide,
    /// Centre of the wall on the floor plane.
    pub position: Vec2,
    /// Floor area covered by the wall.
    pub footprint: Footprint,
    /// Vertical size of the wall.
    pub height: f32,
}

/// Obstacle scattered across the arena interior.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverVolume {
    /// Centre of the volume on the floor plane.
    pub position: Vec2,
    /// Floor area covered by the volume.
    pub footprint: Footprint,
    /// Collision volume to register.
    pub shape: CollisionShape,
}

/// Location enemies enter the arena from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPoint {
    /// Position of the spawn point on the floor plane.
    pub position: Vec2,
}

/// Requested versus placed geometry for a generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PlacementReport {
    /// Cover volumes the template asked for.
    pub requested_cover: u32,
    /// Cover volumes that satisfied every constraint.
    pub placed_cover: u32,
    /// Spawn points the template asked for.
    pub requested_spawn_points: u32,
    /// Spawn points that satisfied every constraint.
    pub placed_spawn_points: u32,
}

impl PlacementReport {
    /// Cover volumes abandoned after exhausting the attempt budget.
    #[must_use]
    pub const fn cover_shortfall(&self) -> u32 {
        self.requested_cover.saturating_sub(self.placed_cover)
    }

    /// Spawn points abandoned after exhausting the attempt budget.
    #[must_use]
    pub const fn spawn_point_shortfall(&self) -> u32 {
        self.requested_spawn_points
            .saturating_sub(self.placed_spawn_points)
    }

    /// Reports whether every requested volume and spawn point was placed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.cover_shortfall() == 0 && self.spawn_point_shortfall() == 0
    }
}

/// Complete arena geometry generated from a seed.
#[derive(Clone, Debug, PartialEq)]
pub struct ArenaLayout {
    seed: u64,
    template: ArenaTemplate,
    boundary: [BoundaryWall; 4],
    cover: Vec<CoverVolume>,
    spawn_points: Vec<SpawnPoint>,
}

impl ArenaLayout {
    /// Assembles a layout from generated parts.
    #[must_use]
    pub fn new(
        seed: u64,
        template: ArenaTemplate,
        boundary: [BoundaryWall; 4],
        cover: Vec<CoverVolume>,
        spawn_points: Vec<SpawnPoint>,
    ) -> Self {
        Self {
            seed,
            template,
            boundary,
            cover,
            spawn_points,
        }
    }

    /// Seed the layout was generated from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Template selected for the layout.
    #[must_use]
    pub const fn template(&self) -> &ArenaTemplate {
        &self.template
    }

    /// Floor dimensions of the arena.
    #[must_use]
    pub const fn extents(&self) -> ArenaExtents {
        self.template.extents()
    }

    /// Walls enclosing the arena.
    #[must_use]
    pub const fn boundary(&self) -> &[BoundaryWall; 4] {
        &self.boundary
    }

    /// Cover volumes placed in the interior.
    #[must_use]
    pub fn cover(&self) -> &[CoverVolume] {
        &self.cover
    }

    /// Spawn points placed in the interior.
    #[must_use]
    pub fn spawn_points(&self) -> &[SpawnPoint] {
        &self.spawn_points
    }

    /// Requested versus placed counts for this layout.
    #[must_use]
    pub fn report(&self) -> PlacementReport {
        PlacementReport {
            requested_cover: self.template.cover_count(),
            placed_cover: u32::try_from(self.cover.len()).unwrap_or(u32::MAX),
            requested_spawn_points: self.template.spawn_point_count(),
            placed_spawn_points: u32::try_from(self.spawn_points.len()).unwrap_or(u32::MAX),
        }
    }
}
