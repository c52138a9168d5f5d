#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic arena layout generation.
//!
//! A single seed selects an [`ArenaTemplate`], encloses it with four boundary
//! walls, and scatters cover volumes and spawn points by rejection sampling.
//! Every candidate slot gets a fixed attempt budget; slots that exhaust it are
//! abandoned rather than retried, so layouts may carry fewer volumes than the
//! template requests. The shortfall is visible through
//! [`ArenaLayout::report`].

use arena_director_core::{
    ArenaExtents, ArenaLayout, ArenaTemplate, BoundaryWall, CollisionShape, CoverVolume,
    Footprint, SpawnPoint, Vec2, WallSide,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of candidates drawn for a single cover or spawn slot before it is abandoned.
pub const DEFAULT_ATTEMPT_BUDGET: u32 = 20;

const RNG_STREAM_TEMPLATE: &str = "arena.template";
const RNG_STREAM_COVER: &str = "arena.cover";
const RNG_STREAM_SPAWN: &str = "arena.spawn";

/// Template catalog used when no custom templates are supplied.
#[must_use]
pub fn default_templates() -> Vec<ArenaTemplate> {
    vec![
        ArenaTemplate::new("courtyard", ArenaExtents::new(40.0, 40.0), 8, 6),
        ArenaTemplate::new("long_hall", ArenaExtents::new(60.0, 30.0), 10, 8),
        ArenaTemplate::new("pit", ArenaExtents::new(30.0, 30.0), 5, 4),
    ]
}

/// Geometric constraints applied while placing cover and spawn points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutTuning {
    /// Cover never lands closer than this to the arena centre.
    pub min_distance_from_center: f32,
    /// Minimum distance between the centres of two cover volumes.
    pub min_cover_spacing: f32,
    /// Spawn points never land closer than this to the arena centre.
    pub spawn_exclusion_radius: f32,
    /// Minimum distance between a spawn point and the nearest boundary.
    pub wall_margin: f32,
    /// Thickness of the boundary walls.
    pub wall_thickness: f32,
    /// Height of the boundary walls.
    pub wall_height: f32,
    /// Smallest edge length of a cover footprint.
    pub cover_size_min: f32,
    /// Largest edge length of a cover footprint.
    pub cover_size_max: f32,
    /// Lowest cover volume.
    pub cover_height_min: f32,
    /// Tallest cover volume.
    pub cover_height_max: f32,
    /// Probability that a cover volume is a pillar rather than a box.
    pub pillar_chance: f64,
    /// Candidates drawn per slot before the slot is abandoned.
    pub attempt_budget: u32,
}

impl Default for LayoutTuning {
    fn default() -> Self {
        Self {
            min_distance_from_center: 6.0,
            min_cover_spacing: 4.0,
            spawn_exclusion_radius: 10.0,
            wall_margin: 2.0,
            wall_thickness: 1.0,
            wall_height: 4.0,
            cover_size_min: 1.5,
            cover_size_max: 3.5,
            cover_height_min: 1.0,
            cover_height_max: 2.5,
            pillar_chance: 0.25,
            attempt_budget: DEFAULT_ATTEMPT_BUDGET,
        }
    }
}

impl LayoutTuning {
    /// Replaces non-finite values with their defaults so sampling ranges stay bounded.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let finite_or = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };
        Self {
            min_distance_from_center: finite_or(
                self.min_distance_from_center,
                defaults.min_distance_from_center,
            ),
            min_cover_spacing: finite_or(self.min_cover_spacing, defaults.min_cover_spacing),
            spawn_exclusion_radius: finite_or(
                self.spawn_exclusion_radius,
                defaults.spawn_exclusion_radius,
            ),
            wall_margin: finite_or(self.wall_margin, defaults.wall_margin),
            wall_thickness: finite_or(self.wall_thickness, defaults.wall_thickness),
            wall_height: finite_or(self.wall_height, defaults.wall_height),
            cover_size_min: finite_or(self.cover_size_min, defaults.cover_size_min),
            cover_size_max: finite_or(self.cover_size_max, defaults.cover_size_max),
            cover_height_min: finite_or(self.cover_height_min, defaults.cover_height_min),
            cover_height_max: finite_or(self.cover_height_max, defaults.cover_height_max),
            pillar_chance: if self.pillar_chance.is_finite() {
                self.pillar_chance
            } else {
                defaults.pillar_chance
            },
            attempt_budget: self.attempt_budget,
        }
    }
}

/// Pure generator that turns a seed into arena geometry.
#[derive(Clone, Debug)]
pub struct LayoutGenerator {
    tuning: LayoutTuning,
    templates: Vec<ArenaTemplate>,
}

impl Default for LayoutGenerator {
    fn default() -> Self {
        Self::new(LayoutTuning::default())
    }
}

impl LayoutGenerator {
    /// Creates a generator over the default template catalog.
    #[must_use]
    pub fn new(tuning: LayoutTuning) -> Self {
        Self::with_templates(tuning, default_templates())
    }

    /// Creates a generator over a custom template catalog.
    ///
    /// An empty catalog falls back to [`default_templates`]. Non-finite tuning
    /// values fall back to their defaults.
    #[must_use]
    pub fn with_templates(tuning: LayoutTuning, templates: Vec<ArenaTemplate>) -> Self {
        let sanitized = tuning.clone().sanitized();
        if sanitized != tuning {
            log::warn!("non-finite layout tuning values replaced with defaults");
        }
        let tuning = sanitized;
        let templates = if templates.is_empty() {
            log::warn!("empty arena template catalog; using the default catalog");
            default_templates()
        } else {
            templates
        };
        Self { tuning, templates }
    }

    /// Constraints applied during placement.
    #[must_use]
    pub fn tuning(&self) -> &LayoutTuning {
        &self.tuning
    }

    /// Templates the generator selects from.
    #[must_use]
    pub fn templates(&self) -> &[ArenaTemplate] {
        &self.templates
    }

    /// Generates the arena for `seed`. Equal seeds always produce equal layouts.
    #[must_use]
    pub fn generate(&self, seed: u64) -> ArenaLayout {
        let mut template_rng = stream(seed, RNG_STREAM_TEMPLATE);
        let template = self.templates[template_rng.gen_range(0..self.templates.len())];
        let extents = template.extents();

        let boundary = boundary_walls(extents, &self.tuning);
        let cover = self.place_cover(&template, &mut stream(seed, RNG_STREAM_COVER));
        let spawn_points = self.place_spawn_points(&template, &mut stream(seed, RNG_STREAM_SPAWN));

        let layout = ArenaLayout::new(seed, template, boundary, cover, spawn_points);
        let report = layout.report();
        if !report.is_complete() {
            log::debug!(
                "arena `{}` for seed {seed} is under-placed: {} cover and {} spawn points abandoned",
                template.name(),
                report.cover_shortfall(),
                report.spawn_point_shortfall(),
            );
        }
        layout
    }

    fn place_cover(&self, template: &ArenaTemplate, rng: &mut ChaCha8Rng) -> Vec<CoverVolume> {
        let tuning = &self.tuning;
        let (size_min, size_max) = ordered(tuning.cover_size_min, tuning.cover_size_max);
        let interior_margin = size_max * 0.5;
        let mut placed: Vec<CoverVolume> = Vec::with_capacity(template.cover_count() as usize);

        for _ in 0..template.cover_count() {
            let accepted = sample_position(
                rng,
                template.extents(),
                interior_margin,
                tuning.attempt_budget,
                |candidate| {
                    candidate.length() >= tuning.min_distance_from_center
                        && placed.iter().all(|cover| {
                            cover.position.distance(candidate) >= tuning.min_cover_spacing
                        })
                },
            );

            if let Some(position) = accepted {
                placed.push(self.cover_at(position, size_min, size_max, rng));
            }
        }

        placed
    }

    fn cover_at(
        &self,
        position: Vec2,
        size_min: f32,
        size_max: f32,
        rng: &mut ChaCha8Rng,
    ) -> CoverVolume {
        let tuning = &self.tuning;
        let (height_min, height_max) = ordered(tuning.cover_height_min, tuning.cover_height_max);
        let height = rng.gen_range(height_min..=height_max);
        let pillar_chance = if tuning.pillar_chance.is_nan() {
            0.0
        } else {
            tuning.pillar_chance.clamp(0.0, 1.0)
        };

        if rng.gen_bool(pillar_chance) {
            let radius = rng.gen_range(size_min..=size_max) * 0.5;
            CoverVolume {
                position,
                footprint: Footprint::new(radius * 2.0, radius * 2.0),
                shape: CollisionShape::Pillar { radius, height },
            }
        } else {
            let width = rng.gen_range(size_min..=size_max);
            let depth = rng.gen_range(size_min..=size_max);
            CoverVolume {
                position,
                footprint: Footprint::new(width, depth),
                shape: CollisionShape::Box {
                    width,
                    height,
                    depth,
                },
            }
        }
    }

    fn place_spawn_points(&self, template: &ArenaTemplate, rng: &mut ChaCha8Rng) -> Vec<SpawnPoint> {
        let tuning = &self.tuning;
        let extents = template.extents();
        let mut placed = Vec::with_capacity(template.spawn_point_count() as usize);

        for _ in 0..template.spawn_point_count() {
            let accepted = sample_position(
                rng,
                extents,
                tuning.wall_margin,
                tuning.attempt_budget,
                |candidate| {
                    candidate.length() >= tuning.spawn_exclusion_radius
                        && extents.margin_of(candidate) >= tuning.wall_margin
                },
            );

            if let Some(position) = accepted {
                placed.push(SpawnPoint { position });
            }
        }

        placed
    }
}

/// Builds the four walls enclosing `extents`, each sitting just outside the floor.
fn boundary_walls(extents: ArenaExtents, tuning: &LayoutTuning) -> [BoundaryWall; 4] {
    let thickness = tuning.wall_thickness.max(0.0);
    let half_width = extents.half_width();
    let half_depth = extents.half_depth();
    let offset = thickness * 0.5;

    WallSide::ALL.map(|side| {
        let (position, footprint) = match side {
            WallSide::North => (
                Vec2::new(0.0, -(half_depth + offset)),
                Footprint::new(extents.width() + thickness * 2.0, thickness),
            ),
            WallSide::South => (
                Vec2::new(0.0, half_depth + offset),
                Footprint::new(extents.width() + thickness * 2.0, thickness),
            ),
            WallSide::East => (
                Vec2::new(half_width + offset, 0.0),
                Footprint::new(thickness, extents.depth()),
            ),
            WallSide::West => (
                Vec2::new(-(half_width + offset), 0.0),
                Footprint::new(thickness, extents.depth()),
            ),
        };
        BoundaryWall {
            side,
            position,
            footprint,
            height: tuning.wall_height,
        }
    })
}

/// Draws up to `budget` interior candidates, returning the first one `accept` allows.
fn sample_position(
    rng: &mut ChaCha8Rng,
    extents: ArenaExtents,
    margin: f32,
    budget: u32,
    accept: impl Fn(Vec2) -> bool,
) -> Option<Vec2> {
    let half_x = extents.half_width() - margin.max(0.0);
    let half_y = extents.half_depth() - margin.max(0.0);
    if !(half_x > 0.0 && half_y > 0.0) {
        return None;
    }

    for _ in 0..budget {
        let candidate = Vec2::new(rng.gen_range(-half_x..half_x), rng.gen_range(-half_y..half_y));
        if accept(candidate) {
            return Some(candidate);
        }
    }
    None
}

fn stream(seed: u64, label: &str) -> ChaCha8Rng {
    ChaCha8Rng::from_seed(derive_labeled_seed(seed, label))
}

fn derive_labeled_seed(seed: u64, label: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    bytes
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    let a = a.max(0.0);
    let b = b.max(0.0);
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
