use arena_director_core::{ArenaExtents, ArenaTemplate, CollisionShape, Vec2};
use arena_director_system_layout::{LayoutGenerator, LayoutTuning, DEFAULT_ATTEMPT_BUDGET};

#[test]
fn same_seed_reproduces_spawn_points() {
    let generator = LayoutGenerator::default();

    let first = generator.generate(12_345);
    let second = generator.generate(12_345);

    assert_eq!(first.spawn_points().len(), second.spawn_points().len());
    assert!(!first.spawn_points().is_empty());
    assert_eq!(
        first.spawn_points()[0].position,
        second.spawn_points()[0].position
    );
}

#[test]
fn generation_is_deterministic_across_many_seeds() {
    let generator = LayoutGenerator::default();

    for seed in [0, 1, 42, 12_345, 0xdead_beef, u64::MAX] {
        let first = generator.generate(seed);
        let second = generator.generate(seed);
        assert_eq!(first, second, "layout diverged for seed {seed}");
        assert_eq!(first.report(), second.report());
    }
}

#[test]
fn seeds_select_every_template() {
    let generator = LayoutGenerator::default();
    let mut names: Vec<&str> = (0..64)
        .map(|seed| generator.generate(seed).template().name())
        .collect();
    names.sort_unstable();
    names.dedup();

    assert_eq!(names, vec!["courtyard", "long_hall", "pit"]);
}

#[test]
fn placements_honor_every_constraint() {
    let tuning = LayoutTuning::default();
    let generator = LayoutGenerator::new(tuning.clone());

    for seed in 0..200 {
        let layout = generator.generate(seed);
        let extents = layout.extents();

        for (index, cover) in layout.cover().iter().enumerate() {
            assert!(cover.position.length() >= tuning.min_distance_from_center);
            assert!(extents.margin_of(cover.position) > 0.0);
            for other in &layout.cover()[index + 1..] {
                assert!(cover.position.distance(other.position) >= tuning.min_cover_spacing);
            }
            match cover.shape {
                CollisionShape::Box { width, depth, .. } => {
                    assert!(width >= tuning.cover_size_min && width <= tuning.cover_size_max);
                    assert!(depth >= tuning.cover_size_min && depth <= tuning.cover_size_max);
                }
                CollisionShape::Pillar { radius, .. } => {
                    assert!(radius * 2.0 <= tuning.cover_size_max + f32::EPSILON);
                }
            }
        }

        for spawn in layout.spawn_points() {
            assert!(spawn.position.length() >= tuning.spawn_exclusion_radius);
            assert!(extents.margin_of(spawn.position) >= tuning.wall_margin);
        }

        let report = layout.report();
        assert!(report.placed_cover <= report.requested_cover);
        assert!(report.placed_spawn_points <= report.requested_spawn_points);
    }
}

#[test]
fn cramped_template_reports_shortfall_instead_of_failing() {
    let tuning = LayoutTuning {
        spawn_exclusion_radius: 100.0,
        min_cover_spacing: 50.0,
        ..LayoutTuning::default()
    };
    let templates = vec![ArenaTemplate::new(
        "closet",
        ArenaExtents::new(20.0, 20.0),
        6,
        4,
    )];
    let generator = LayoutGenerator::with_templates(tuning, templates);

    let layout = generator.generate(9);
    let report = layout.report();

    assert!(layout.spawn_points().is_empty());
    assert_eq!(report.spawn_point_shortfall(), 4);
    assert!(report.placed_cover <= 1, "spacing admits at most one cover");
    assert!(!report.is_complete());
    assert_eq!(layout.boundary().len(), 4);
}

#[test]
fn template_smaller_than_margins_places_nothing() {
    let templates = vec![ArenaTemplate::new("crate", ArenaExtents::new(2.0, 2.0), 3, 3)];
    let generator = LayoutGenerator::with_templates(LayoutTuning::default(), templates);

    let layout = generator.generate(77);

    assert!(layout.cover().is_empty());
    assert!(layout.spawn_points().is_empty());
    assert_eq!(layout.boundary().len(), 4);
}

#[test]
fn zero_attempt_budget_abandons_every_slot() {
    let tuning = LayoutTuning {
        attempt_budget: 0,
        ..LayoutTuning::default()
    };
    let generator = LayoutGenerator::new(tuning);

    let layout = generator.generate(3);

    assert_eq!(layout.report().placed_cover, 0);
    assert_eq!(layout.report().placed_spawn_points, 0);
}

#[test]
fn empty_catalog_falls_back_to_defaults() {
    let generator = LayoutGenerator::with_templates(LayoutTuning::default(), Vec::new());
    assert_eq!(generator.templates().len(), 3);
    assert_eq!(DEFAULT_ATTEMPT_BUDGET, generator.tuning().attempt_budget);
}

#[test]
fn spawn_points_stay_on_the_floor() {
    let generator = LayoutGenerator::default();
    let layout = generator.generate(2_024);
    let half = Vec2::new(layout.extents().half_width(), layout.extents().half_depth());

    for spawn in layout.spawn_points() {
        assert!(spawn.position.abs().cmplt(half).all());
    }
}
