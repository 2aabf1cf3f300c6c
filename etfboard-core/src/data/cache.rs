//! In-process cache of aggregated price tables.
//!
//! Keyed on `(start, end, ticker set)`. Entries live for the life of the
//! process; there is no invalidation. The cache is bounded: once `capacity`
//! entries are held, the oldest insertion is evicted to make room. Inserting
//! an existing key overwrites it (last writer wins).

use super::table::PriceTable;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

pub const DEFAULT_CAPACITY: usize = 64;

/// Cache key for one aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub tickers: BTreeSet<String>,
}

impl CacheKey {
    pub fn new(start: NaiveDate, end: NaiveDate, tickers: BTreeSet<String>) -> Self {
        Self {
            start,
            end,
            tickers,
        }
    }
}

#[derive(Debug, Default)]
struct Slots {
    entries: HashMap<CacheKey, Arc<PriceTable>>,
    order: VecDeque<CacheKey>,
}

/// Bounded, thread-safe table cache.
#[derive(Debug)]
pub struct TableCache {
    slots: Mutex<Slots>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TableCache {
    /// Create a cache holding at most `capacity` tables (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(Slots::default()),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    // Every write leaves the slots consistent, so a poisoned lock is reused.
    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<PriceTable>> {
        let found = self.lock().entries.get(key).cloned();
        match found {
            Some(table) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(start = %key.start, end = %key.end, "aggregation cache hit");
                Some(table)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(start = %key.start, end = %key.end, "aggregation cache miss");
                None
            }
        }
    }

    pub fn insert(&self, key: CacheKey, table: Arc<PriceTable>) {
        let mut slots = self.lock();
        if slots.entries.insert(key.clone(), table).is_some() {
            return;
        }
        slots.order.push_back(key);
        while slots.order.len() > self.capacity {
            if let Some(oldest) = slots.order.pop_front() {
                slots.entries.remove(&oldest);
                debug!(start = %oldest.start, end = %oldest.end, "evicted aggregation cache entry");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

impl Default for TableCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
