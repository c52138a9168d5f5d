use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use arena_director::DirectorConfig;
use arena_director_system_layout::LayoutTuning;
use arena_director_system_run_state::Config as RunConfig;
use arena_director_wave_catalog::{Bestiary, WaveCatalog};
use serde::Deserialize;

/// Settings read from a TOML file. Missing sections fall back to defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SimulationConfig {
    /// Run length and pacing.
    pub(crate) run: RunConfig,
    /// Arena placement constraints.
    pub(crate) layout: LayoutTuning,
    /// Wave compositions, one entry per wave.
    pub(crate) catalog: WaveCatalog,
    /// Enemy prototypes keyed by kind.
    pub(crate) bestiary: Bestiary,
}

impl SimulationConfig {
    /// Reads and validates the configuration stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid config at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse config toml contents")?;
        if config.catalog.is_empty() {
            bail!("catalog must contain at least one wave");
        }
        if config.bestiary.prototypes().is_empty() {
            bail!("bestiary must contain at least one enemy");
        }
        Ok(config)
    }

    /// Splits the file into the director's configuration and its enemy factory.
    pub(crate) fn into_parts(self) -> (DirectorConfig, Bestiary) {
        (
            DirectorConfig {
                run: self.run,
                layout: self.layout,
                catalog: self.catalog,
            },
            self.bestiary,
        )
    }
}

#[cfg(test)]
mod tests {
    use arena_director_core::{EnemyFactory, EnemyKind, LootKind, WaveNumber};
    use arena_director_system_layout::LayoutGenerator;

    use super::*;

    #[test]
    fn bundled_config_parses() {
        let config = SimulationConfig::parse(include_str!("../arena.toml")).expect("valid config");

        assert_eq!(config.run.total_waves, 5);
        assert_eq!(config.catalog.len(), 5);
        let brute = config
            .bestiary
            .prototype(&EnemyKind::new("brute"))
            .expect("brute is defined");
        assert_eq!(brute.health(), 40);
        assert_eq!(brute.loot().amount(&LootKind::new("scrap")), 1);
    }

    #[test]
    fn bundled_config_matches_defaults() {
        let config = SimulationConfig::parse(include_str!("../arena.toml")).expect("valid config");
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = SimulationConfig::parse("[run]\ntotal_waves = 2\n").expect("valid config");

        assert_eq!(config.run.total_waves, 2);
        assert!(config.run.auto_progress);
        assert_eq!(config.layout, LayoutTuning::default());
        assert_eq!(
            config.catalog.composition_for(WaveNumber::new(1)),
            WaveCatalog::default().composition_for(WaveNumber::new(1))
        );
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let error = SimulationConfig::parse("catalog = []\n").expect_err("empty catalog");
        assert!(error.to_string().contains("catalog"));
    }

    #[test]
    fn infinite_layout_values_do_not_break_generation() {
        let config = SimulationConfig::parse("[layout]\ncover_height_max = inf\n").expect("valid config");
        assert!(config.layout.cover_height_max.is_infinite());

        let layout = LayoutGenerator::new(config.layout).generate(1);
        assert!(layout
            .cover()
            .iter()
            .all(|cover| cover.shape.height().is_finite()));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(SimulationConfig::parse("speed = 3\n").is_err());
    }
}
