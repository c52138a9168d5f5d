//! Run-scoped loot accumulation.

use std::collections::BTreeMap;

use arena_director_core::{LootDrop, LootKind};

/// Destination for loot once the orchestrator decides to keep a run's rewards.
pub trait LootSink {
    /// Adds `amount` of `kind` to the sink.
    fn deposit(&mut self, kind: &LootKind, amount: u64);
}

impl LootSink for BTreeMap<LootKind, u64> {
    fn deposit(&mut self, kind: &LootKind, amount: u64) {
        let entry = self.entry(kind.clone()).or_insert(0);
        *entry = entry.saturating_add(amount);
    }
}

/// Loot accumulated from every enemy defeated during the current run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LootLedger {
    totals: BTreeMap<LootKind, u64>,
}

impl LootLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `amount` of `kind` into the ledger.
    pub fn record(&mut self, kind: &LootKind, amount: u64) {
        self.totals.deposit(kind, amount);
    }

    /// Merges every entry of a defeated enemy's drop into the ledger.
    pub fn record_drop(&mut self, drop: &LootDrop) {
        for (kind, amount) in drop.iter() {
            self.record(kind, u64::from(amount));
        }
    }

    /// Amount of `kind` accumulated so far.
    #[must_use]
    pub fn get(&self, kind: &LootKind) -> u64 {
        self.totals.get(kind).copied().unwrap_or(0)
    }

    /// Sum of every kind accumulated so far.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.totals
            .values()
            .fold(0u64, |total, amount| total.saturating_add(*amount))
    }

    /// Reports whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Iterator over accumulated totals in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (&LootKind, u64)> {
        self.totals.iter().map(|(kind, amount)| (kind, *amount))
    }

    /// Removes and returns every accumulated total.
    pub fn drain(&mut self) -> BTreeMap<LootKind, u64> {
        std::mem::take(&mut self.totals)
    }

    /// Transfers every total into `sink`.
    pub fn finalize<S: LootSink + ?Sized>(mut self, sink: &mut S) {
        for (kind, amount) in self.drain() {
            sink.deposit(&kind, amount);
        }
    }

    /// Drops every total, returning how much was forfeited.
    pub fn discard(self) -> u64 {
        self.total()
    }
}
