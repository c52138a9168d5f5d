#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Static wave compositions and the default enemy bestiary.

use arena_director_core::{
    EnemyFactory, EnemyKind, EnemyPrototype, LootDrop, WaveComposition, WaveEntry, WaveNumber,
};
use serde::{Deserialize, Serialize};

/// Read-only table mapping wave numbers to enemy compositions.
///
/// Wave `n` uses entry `(n - 1) mod len`, so runs longer than the table repeat
/// it verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaveCatalog {
    waves: Vec<WaveComposition>,
}

impl Default for WaveCatalog {
    fn default() -> Self {
        Self::new(vec![
            WaveComposition::new(vec![WaveEntry::new("meleeA", 3)]),
            WaveComposition::new(vec![WaveEntry::new("meleeA", 4), WaveEntry::new("meleeB", 2)]),
            WaveComposition::new(vec![WaveEntry::new("meleeA", 3), WaveEntry::new("ranged", 3)]),
            WaveComposition::new(vec![
                WaveEntry::new("meleeB", 4),
                WaveEntry::new("ranged", 3),
                WaveEntry::new("brute", 1),
            ]),
            WaveComposition::new(vec![
                WaveEntry::new("meleeA", 4),
                WaveEntry::new("meleeB", 3),
                WaveEntry::new("ranged", 3),
                WaveEntry::new("brute", 2),
            ]),
        ])
    }
}

impl WaveCatalog {
    /// Creates a catalog from compositions ordered by wave.
    #[must_use]
    pub fn new(waves: Vec<WaveComposition>) -> Self {
        Self { waves }
    }

    /// Number of distinct compositions before the table wraps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    /// Reports whether the catalog holds no compositions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Compositions in wave order.
    #[must_use]
    pub fn waves(&self) -> &[WaveComposition] {
        &self.waves
    }

    /// Table index used for `wave`, or `None` for wave zero or an empty table.
    #[must_use]
    pub fn index_for(&self, wave: WaveNumber) -> Option<usize> {
        if wave.is_none() || self.waves.is_empty() {
            return None;
        }
        let zero_based = usize::try_from(wave.get() - 1).ok()?;
        Some(zero_based % self.waves.len())
    }

    /// Composition used for `wave`.
    #[must_use]
    pub fn composition_for(&self, wave: WaveNumber) -> Option<&WaveComposition> {
        self.index_for(wave).map(|index| &self.waves[index])
    }
}

/// Enemy factory backed by a fixed list of prototypes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bestiary {
    prototypes: Vec<EnemyPrototype>,
}

impl Default for Bestiary {
    fn default() -> Self {
        Self::new(vec![
            EnemyPrototype::new(
                EnemyKind::new("meleeA"),
                10,
                LootDrop::new().with("credits", 10),
            ),
            EnemyPrototype::new(
                EnemyKind::new("meleeB"),
                14,
                LootDrop::new().with("credits", 12),
            ),
            EnemyPrototype::new(
                EnemyKind::new("ranged"),
                8,
                LootDrop::new().with("credits", 15).with("seeds", 1),
            ),
            EnemyPrototype::new(
                EnemyKind::new("brute"),
                40,
                LootDrop::new()
                    .with("credits", 30)
                    .with("seeds", 2)
                    .with("scrap", 1),
            ),
        ])
    }
}

impl Bestiary {
    /// Creates a bestiary. Later prototypes never shadow earlier ones of the same kind.
    #[must_use]
    pub fn new(prototypes: Vec<EnemyPrototype>) -> Self {
        Self { prototypes }
    }

    /// Prototypes known to the bestiary.
    #[must_use]
    pub fn prototypes(&self) -> &[EnemyPrototype] {
        &self.prototypes
    }
}

impl EnemyFactory for Bestiary {
    fn prototype(&self, kind: &EnemyKind) -> Option<EnemyPrototype> {
        self.prototypes
            .iter()
            .find(|prototype| prototype.kind() == kind)
            .cloned()
    }
}
