//! In-memory TTL cache of fetched tables.
//!
//! Entries are keyed by the ordered symbol list and expire a fixed wall-clock
//! duration after insertion. Reads never extend an entry's life.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use super::orchestrator::FetchWarning;
use crate::domain::FinancialTable;

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for tests. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Content hash of an ordered symbol list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_symbols<S: AsRef<str>>(symbols: &[S]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for symbol in symbols {
            hasher.update(symbol.as_ref().as_bytes());
            // Separator keeps ["AB","C"] and ["A","BC"] apart
            hasher.update(&[0]);
        }
        Self(hasher.finalize().to_hex().to_string())
    }

}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0[..12.min(self.0.len())])
    }
}

/// A cached table, the symbols skipped while building it, and when it was stored.
#[derive(Debug, Clone)]
pub struct CachedTable {
    pub table: FinancialTable,
    pub warnings: Vec<FetchWarning>,
    pub fetched_at: DateTime<Utc>,
}

/// TTL cache of fetched tables.
pub struct TableCache<C: Clock = SystemClock> {
    entries: HashMap<CacheKey, CachedTable>,
    ttl: Duration,
    clock: C,
}

impl TableCache<SystemClock> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<C: Clock> TableCache<C> {
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            clock,
        }
    }

    fn is_fresh(&self, entry: &CachedTable, now: DateTime<Utc>) -> bool {
        now - entry.fetched_at < self.ttl
    }

    /// Fresh entry for `key`, if any.
    pub fn get(&self, key: &CacheKey) -> Option<&CachedTable> {
        let now = self.clock.now();
        self.entries.get(key).filter(|e| self.is_fresh(e, now))
    }

    /// Store `table`, stamped with the current time. Replaces any previous entry.
    pub fn put(&mut self, key: CacheKey, table: FinancialTable, warnings: Vec<FetchWarning>) -> &CachedTable {
        let entry = CachedTable {
            table,
            warnings,
            fetched_at: self.clock.now(),
        };
        self.entries.insert(key.clone(), entry);
        &self.entries[&key]
    }

    /// Drop the entry for `key`. Returns whether one existed.
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now();
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, e| now - e.fetched_at < ttl);
        before - self.entries.len()
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
