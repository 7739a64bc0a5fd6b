//! Shadow store for opaque string-shaped keys with optional TTL metadata.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use bytes::Bytes;
use dashmap::DashMap;

struct CacheEntry {
    value: Bytes,
    expires_at: Option<Instant>,
}

/// Mutator and read contract for the string-shaped shadow store.
///
/// `remove`, `clear_ttl`, and `rename` are the invalidation-table mutators
/// pinned by §6; `set`/`get`/`contains_key`/`len` are the minimal read/write
/// surface a caller needs to seed and observe local state.
pub trait CacheStore: Send + Sync {
    /// Inserts or replaces `key` with `value`, optionally expiring after `ttl`.
    fn set(&self, key: Bytes, value: Bytes, ttl: Option<Duration>);

    /// Returns the current value for `key`, if present.
    fn get(&self, key: &Bytes) -> Option<Bytes>;

    /// Returns `true` if `key` currently carries TTL metadata.
    fn has_ttl(&self, key: &Bytes) -> bool;

    /// Removes every key in `keys`. Missing keys are not errors. Returns the
    /// number of keys actually removed.
    fn remove(&self, keys: &HashSet<Bytes>) -> usize;

    /// Clears TTL metadata for `key`; the value, if any, is left in place.
    fn clear_ttl(&self, key: &Bytes);

    /// Moves the entry at `from` to `to`. A no-op if `from` is absent.
    fn rename(&self, from: &Bytes, to: &Bytes);

    /// Returns `true` if `key` is present.
    fn contains_key(&self, key: &Bytes) -> bool;

    /// Returns the number of entries currently held.
    fn len(&self) -> usize;

    /// Returns `true` if no entries are held.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `DashMap`-backed [`CacheStore`].
#[derive(Debug, Default)]
pub struct DashMapCacheStore {
    entries: DashMap<Bytes, CacheEntry>,
}

impl std::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("value_len", &self.value.len())
            .field("has_ttl", &self.expires_at.is_some())
            .finish()
    }
}

impl DashMapCacheStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for DashMapCacheStore {
    fn set(&self, key: Bytes, value: Bytes, ttl: Option<Duration>) {
        let expires_at = ttl.map(|d| Instant::now() + d);
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    fn get(&self, key: &Bytes) -> Option<Bytes> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    fn has_ttl(&self, key: &Bytes) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.expires_at.is_some())
    }

    fn remove(&self, keys: &HashSet<Bytes>) -> usize {
        keys.iter()
            .filter(|key| self.entries.remove(*key).is_some())
            .count()
    }

    fn clear_ttl(&self, key: &Bytes) {
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.expires_at = None;
        }
    }

    fn rename(&self, from: &Bytes, to: &Bytes) {
        if let Some((_, entry)) = self.entries.remove(from) {
            self.entries.insert(to.clone(), entry);
        }
    }

    fn contains_key(&self, key: &Bytes) -> bool {
        self.entries.contains_key(key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
