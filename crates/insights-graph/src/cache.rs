//! Analysis cache (§4.10, §5): keyed by `(DataHash, AnalysisConfig)`, a hit
//! returns the exact [`DerivedStats`] used for a prior emission.
//!
//! [`AnalysisConfig`] is a pure function of `(SizeTier, force_full)`
//! (§4.5), so the key only needs those two fields plus the data hash —
//! carrying the whole config (with its `f64` density threshold, which has
//! no [`Eq`]/[`Hash`] impl) would add nothing a cache hit could miss on.
//!
//! A single `Mutex` guards both the entry map and the LRU eviction order
//! together (§5: "a `std::sync::Mutex<HashMap<...>>` guarding an
//! `LruCache`-shaped eviction list"), since Phase 2 publishes into the
//! cache only once per analysis, after `wait_phase2()` — contention here is
//! never a bottleneck.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use insights_core::config::{AnalysisConfig, CacheSection, SizeTier};
use insights_core::hash::DataHash;

use crate::analyzer::DerivedStats;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    data_hash: String,
    tier: SizeTier,
    force_full: bool,
}

impl CacheKey {
    fn new(hash: &DataHash, config: &AnalysisConfig) -> Self {
        Self {
            data_hash: hash.as_str().to_string(),
            tier: config.tier,
            force_full: config.force_full,
        }
    }
}

struct CacheEntry {
    value: DerivedStats,
    inserted_at: Instant,
}

struct State {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Least-recently-used at the front, most-recently-used at the back.
    lru: VecDeque<CacheKey>,
}

/// A concurrent, TTL-expiring, optionally size-capped analysis cache.
pub struct Cache {
    ttl: Duration,
    max_entries: Option<usize>,
    state: Mutex<State>,
}

impl Cache {
    #[must_use]
    pub fn new(section: &CacheSection) -> Self {
        Self {
            ttl: Duration::from_secs(section.ttl_secs),
            max_entries: section.max_entries,
            state: Mutex::new(State {
                entries: HashMap::new(),
                lru: VecDeque::new(),
            }),
        }
    }

    /// Look up a cached [`DerivedStats`] for `hash`/`config`. Returns
    /// `None` on a miss or an expired entry (which is evicted eagerly).
    #[must_use]
    pub fn get(&self, hash: &DataHash, config: &AnalysisConfig) -> Option<DerivedStats> {
        let key = CacheKey::new(hash, config);
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        let expired = state
            .entries
            .get(&key)
            .is_some_and(|entry| entry.inserted_at.elapsed() >= self.ttl);
        if expired {
            state.entries.remove(&key);
            state.lru.retain(|k| k != &key);
            return None;
        }

        let value = state.entries.get(&key).map(|entry| entry.value.clone())?;
        touch(&mut state.lru, &key);
        Some(value)
    }

    /// Insert or replace the cached value for `hash`/`config`, evicting the
    /// least-recently-used entry if `max_entries` is now exceeded.
    pub fn insert(&self, hash: &DataHash, config: &AnalysisConfig, value: DerivedStats) {
        let key = CacheKey::new(hash, config);
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        state.entries.insert(
            key.clone(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
        touch(&mut state.lru, &key);

        if let Some(max) = self.max_entries {
            while state.entries.len() > max {
                let Some(oldest) = state.lru.pop_front() else { break };
                state.entries.remove(&oldest);
            }
        }
    }

    /// Number of live (not necessarily unexpired) entries, for diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner).entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn touch(lru: &mut VecDeque<CacheKey>, key: &CacheKey) {
    lru.retain(|k| k != key);
    lru.push_back(key.clone());
}
