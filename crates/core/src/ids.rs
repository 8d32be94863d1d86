//! Identifier generation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use ulid::{Generator, Ulid};
use uuid::Uuid;

/// Record type an identifier is minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    /// [`crate::model::Distribution`] ids, prefixed `dist-`.
    Distribution,
    /// [`crate::model::ActivityEntry`] ids, prefixed `act-`.
    Activity,
}

impl IdKind {
    /// Prefix that distinguishes the record type.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Distribution => "dist",
            Self::Activity => "act",
        }
    }
}

/// Mints identifiers. Two calls never return the same value.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh `<prefix>-<suffix>` identifier.
    fn next_id(&self, kind: IdKind) -> String;
}

/// Selects an [`IdGenerator`] implementation by name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Monotonic ULIDs.
    #[default]
    Ulid,
    /// Random v4 UUIDs.
    Uuid,
}

impl IdStrategy {
    /// Builds the generator for this strategy.
    pub fn build(self) -> Box<dyn IdGenerator> {
        match self {
            Self::Ulid => Box::new(UlidIdGenerator::new()),
            Self::Uuid => Box::new(UuidIdGenerator),
        }
    }
}

impl std::str::FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ulid" => Ok(Self::Ulid),
            "uuid" => Ok(Self::Uuid),
            other => Err(format!("unknown id strategy: {other} (expected ulid|uuid)")),
        }
    }
}

/// Monotonic ULID generator.
///
/// ULIDs minted within the same millisecond increment their random part, so
/// ids stay unique and sortable under bursts.
pub struct UlidIdGenerator {
    inner: Mutex<Generator>,
}

impl UlidIdGenerator {
    /// Fresh generator.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Generator::new()),
        }
    }

    fn next_ulid(&self) -> Ulid {
        let mut generator = match self.inner.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Overflow only happens after 2^80 ids in one millisecond.
        generator.generate().unwrap_or_else(|_| Ulid::new())
    }
}

impl Default for UlidIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UlidIdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UlidIdGenerator").finish_non_exhaustive()
    }
}

impl IdGenerator for UlidIdGenerator {
    fn next_id(&self, kind: IdKind) -> String {
        format!("{}-{}", kind.prefix(), self.next_ulid())
    }
}

/// Random v4 UUID generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self, kind: IdKind) -> String {
        format!("{}-{}", kind.prefix(), Uuid::new_v4())
    }
}

/// Deterministic counter-backed generator: `dist-1`, `act-2`, ...
///
/// The counter is shared across kinds.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Generator starting at 1.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self, kind: IdKind) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{n}", kind.prefix())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn ulid_ids_are_unique_under_burst() {
        let ids_gen = UlidIdGenerator::new();
        let ids: HashSet<_> = (0..1_000).map(|_| ids_gen.next_id(IdKind::Distribution)).collect();
        assert_eq!(ids.len(), 1_000);
        assert!(ids.iter().all(|id| id.starts_with("dist-")));
    }

    #[test]
    fn ulid_ids_are_unique_across_threads() {
        let ids_gen = UlidIdGenerator::new();
        let batches: Vec<Vec<String>> = std::thread::scope(|s| {
            let workers: Vec<_> = (0..4)
                .map(|_| s.spawn(|| (0..500).map(|_| ids_gen.next_id(IdKind::Distribution)).collect::<Vec<_>>()))
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        let ids: HashSet<_> = batches.into_iter().flatten().collect();
        assert_eq!(ids.len(), 4 * 500);
    }

    #[test]
    fn ulid_ids_sort_in_mint_order() {
        let ids_gen = UlidIdGenerator::new();
        let a = ids_gen.next_id(IdKind::Activity);
        let b = ids_gen.next_id(IdKind::Activity);
        assert!(a < b, "{a} should sort before {b}");
    }

    #[test]
    fn uuid_ids_carry_prefix() {
        let id = UuidIdGenerator.next_id(IdKind::Activity);
        let suffix = id.strip_prefix("act-").expect("act- prefix");
        assert!(Uuid::parse_str(suffix).is_ok());
    }

    #[test]
    fn sequential_ids_share_one_counter() {
        let ids_gen = SequentialIdGenerator::new();
        assert_eq!(ids_gen.next_id(IdKind::Distribution), "dist-1");
        assert_eq!(ids_gen.next_id(IdKind::Activity), "act-2");
        assert_eq!(ids_gen.next_id(IdKind::Distribution), "dist-3");
    }

    #[test]
    fn id_strategy_parses_names() {
        assert_eq!("ulid".parse::<IdStrategy>(), Ok(IdStrategy::Ulid));
        assert_eq!("uuid".parse::<IdStrategy>(), Ok(IdStrategy::Uuid));
        assert!("snowflake".parse::<IdStrategy>().is_err());
    }
}
