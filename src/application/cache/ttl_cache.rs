//! Bounded TTL cache with lazy expiry.
//!
//! Entries expire only when read: a `get` that finds `now - last_access > ttl`
//! deletes the entry and reports a miss. There is no background sweep, so an
//! expired entry that is never read again keeps occupying a slot until it is
//! evicted. Only the entry *count* is bounded, never the age of what is held.
//!
//! When `set` finds the cache full it evicts the single entry with the oldest
//! `last_access` (linear scan) before inserting.

use crate::application::cache::fingerprint::Fingerprint;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Millisecond wall clock, injectable so expiry can be tested without sleeping.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

struct CacheEntry<V> {
    value: V,
    #[allow(dead_code)]
    created_at: i64,
    last_access: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub count: usize,
    pub expired_count: usize,
    pub capacity: usize,
    pub ttl_seconds: u64,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub struct TtlCache<V = serde_json::Value> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    max_size: usize,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

// Manual Debug implementation for TtlCache
impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &"<Mutex>")
            .field("max_size", &self.max_size)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        Self::with_clock(max_size, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(max_size: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_size: max_size.max(1),
            ttl,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("TtlCache: Lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn ttl_millis(&self) -> i64 {
        i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }

    fn is_expired(&self, entry: &CacheEntry<V>, now: i64) -> bool {
        now.saturating_sub(entry.last_access) > self.ttl_millis()
    }

    /// Returns the cached value and refreshes its access time, or `None` on a
    /// miss. An expired entry is removed and counted as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_millis();
        let mut entries = self.lock();

        let expired = match entries.get(key) {
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
            Some(entry) => self.is_expired(entry, now),
        };

        if expired {
            entries.remove(key);
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!("TtlCache: Entry expired on read");
            return None;
        }

        let entry = entries.get_mut(key)?;
        entry.last_access = now;
        self.hits.fetch_add(1, Ordering::Relaxed);
        Some(entry.value.clone())
    }

    pub fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let now = self.clock.now_millis();
        let mut entries = self.lock();

        if !entries.contains_key(&key) && entries.len() >= self.max_size {
            Self::evict_oldest(&mut entries);
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                created_at: now,
                last_access: now,
            },
        );
    }

    pub fn delete(&self, key: &str) {
        self.lock().remove(key);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now_millis();
        let entries = self.lock();
        CacheStats {
            count: entries.len(),
            expired_count: entries
                .values()
                .filter(|e| self.is_expired(e, now))
                .count(),
            capacity: self.max_size,
            ttl_seconds: self.ttl.as_secs(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn evict_oldest(entries: &mut HashMap<String, CacheEntry<V>>) {
        let oldest = entries
            .iter()
            .min_by_key(|(_, e)| e.last_access)
            .map(|(k, _)| k.clone());
        if let Some(key) = oldest {
            entries.remove(&key);
            debug!("TtlCache: Evicted least recently accessed entry");
        }
    }
}

impl TtlCache<serde_json::Value> {
    /// Typed read. A payload that no longer deserializes is dropped and treated as a miss.
    pub fn get_as<T: DeserializeOwned>(&self, key: &Fingerprint) -> Option<T> {
        let value = self.get(key.as_str())?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("TtlCache: Discarding undecodable entry: {}", e);
                self.delete(key.as_str());
                None
            }
        }
    }

    pub fn set_as<T: Serialize>(&self, key: &Fingerprint, value: &T) {
        match serde_json::to_value(value) {
            Ok(v) => self.set(key.as_str(), v),
            Err(e) => warn!("TtlCache: Skipping unserializable value: {}", e),
        }
    }

    /// Returns the cached result for `key` or computes and stores it. A missing
    /// key (unfingerprintable arguments) computes without caching.
    pub fn memoize<T, F>(&self, key: Option<Fingerprint>, compute: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        let Some(key) = key else {
            return compute();
        };
        if let Some(hit) = self.get_as::<T>(&key) {
            return hit;
        }
        let value = compute();
        self.set_as(&key, &value);
        value
    }
}

#[cfg(test)]
pub(crate) mod test_clock {
    use super::Clock;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[derive(Debug, Default)]
    pub struct ManualClock {
        now: AtomicI64,
    }

    impl ManualClock {
        pub fn advance_secs(&self, secs: i64) {
            self.now.fetch_add(secs * 1000, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            self.now.load(Ordering::SeqCst)
        }
    }
}
