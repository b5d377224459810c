//! In-memory keyed store of markets.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;

use super::types::Market;

#[derive(Debug)]
struct Entry {
    /// Insertion sequence, kept across replacement.
    seq: u64,
    market: Market,
}

/// Keyed store of all markets.
///
/// Each entry is guarded by its shard lock: [`MarketRegistry::update`] runs
/// with exclusive access to one market, readers see whole snapshots.
#[derive(Debug, Default)]
pub struct MarketRegistry {
    markets: DashMap<String, Entry>,
    next_seq: AtomicU64,
}

impl MarketRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a market, replacing any market with the same id.
    ///
    /// Replacement keeps the original insertion position.
    pub fn insert(&self, market: Market) {
        match self.markets.entry(market.id.clone()) {
            MapEntry::Occupied(mut existing) => existing.get_mut().market = market,
            MapEntry::Vacant(slot) => {
                slot.insert(Entry {
                    seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
                    market,
                });
            }
        }
    }

    /// Insert a market only if its id is unused. Returns false on collision.
    pub fn insert_new(&self, market: Market) -> bool {
        match self.markets.entry(market.id.clone()) {
            MapEntry::Occupied(_) => false,
            MapEntry::Vacant(slot) => {
                slot.insert(Entry {
                    seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
                    market,
                });
                true
            }
        }
    }

    /// Snapshot of a market by id.
    pub fn get(&self, id: &str) -> Option<Market> {
        self.markets.get(id).map(|entry| entry.market.clone())
    }

    /// Run `f` with shared access to one market.
    ///
    /// Returns `None` if the id is unknown.
    pub fn view<R>(&self, id: &str, f: impl FnOnce(&Market) -> R) -> Option<R> {
        self.markets.get(id).map(|entry| f(&entry.market))
    }

    /// Run `f` with exclusive access to one market.
    ///
    /// Returns `None` if the id is unknown.
    pub fn update<R>(&self, id: &str, f: impl FnOnce(&mut Market) -> R) -> Option<R> {
        self.markets.get_mut(id).map(|mut entry| f(&mut entry.market))
    }

    /// Snapshots of markets matching `filter`, in insertion order.
    pub fn filter(&self, filter: impl Fn(&Market) -> bool) -> Vec<Market> {
        let mut matched: Vec<(u64, Market)> = self
            .markets
            .iter()
            .filter(|entry| filter(&entry.market))
            .map(|entry| (entry.seq, entry.market.clone()))
            .collect();

        matched.sort_by_key(|(seq, _)| *seq);
        matched.into_iter().map(|(_, market)| market).collect()
    }

    /// Snapshots of all markets, in insertion order.
    pub fn all(&self) -> Vec<Market> {
        self.filter(|_| true)
    }

    /// Count markets matching `filter`.
    pub fn count(&self, filter: impl Fn(&Market) -> bool) -> usize {
        self.markets.iter().filter(|entry| filter(&entry.market)).count()
    }

    /// Number of markets.
    pub fn len(&self) -> usize {
        self.markets.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}
