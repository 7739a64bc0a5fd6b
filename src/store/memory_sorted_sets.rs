//! Shadow store for sorted-set-shaped keys.
//!
//! Like [`SetStore`](super::SetStore), members are identified locally by an
//! opaque identity token; for sorted sets that token is a signed integer
//! carried verbatim in the `zadd`/`zrem`/`zincr`/`zdecr` event payload.

use dashmap::DashMap;

use super::ExcludeCode;
use bytes::Bytes;

/// Mutator and read contract for the sorted-set-shaped shadow store.
///
/// `remove_by_token` and `delete_by_score` are the invalidation-table
/// mutators pinned by §6; `add_member`/`score_of`/`len` are the minimal
/// read/write surface needed to seed and observe local state.
pub trait SortedSetStore: Send + Sync {
    /// Records that `token` identifies a member of `key`'s sorted set at `score`.
    fn add_member(&self, key: Bytes, token: i64, score: f64);

    /// Returns the score of `token` within `key`'s sorted set, if present.
    fn score_of(&self, key: &Bytes, token: i64) -> Option<f64>;

    /// Removes the member identified by `token` from `key`'s sorted set.
    /// A missing token is not an error. Returns `true` if a member was removed.
    fn remove_by_token(&self, key: &Bytes, token: i64) -> bool;

    /// Removes every member of `key`'s sorted set whose score falls within
    /// `[start, stop]` under `exclude`'s interval semantics. Returns the
    /// number of members actually removed.
    fn delete_by_score(&self, key: &Bytes, start: f64, stop: f64, exclude: ExcludeCode) -> usize;

    /// Returns the number of members currently tracked for `key`.
    fn len(&self, key: &Bytes) -> usize;
}

/// `DashMap`-backed [`SortedSetStore`]: `key -> (member token -> score)`.
#[derive(Debug, Default)]
pub struct DashMapSortedSetStore {
    sorted_sets: DashMap<Bytes, DashMap<i64, f64>>,
}

impl DashMapSortedSetStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SortedSetStore for DashMapSortedSetStore {
    fn add_member(&self, key: Bytes, token: i64, score: f64) {
        self.sorted_sets.entry(key).or_default().insert(token, score);
    }

    fn score_of(&self, key: &Bytes, token: i64) -> Option<f64> {
        self.sorted_sets.get(key).and_then(|m| m.get(&token).map(|s| *s))
    }

    fn remove_by_token(&self, key: &Bytes, token: i64) -> bool {
        self.sorted_sets
            .get(key)
            .is_some_and(|members| members.remove(&token).is_some())
    }

    fn delete_by_score(&self, key: &Bytes, start: f64, stop: f64, exclude: ExcludeCode) -> usize {
        let Some(members) = self.sorted_sets.get(key) else {
            return 0;
        };
        let doomed: Vec<i64> = members
            .iter()
            .filter(|entry| exclude.contains(*entry.value(), start, stop))
            .map(|entry| *entry.key())
            .collect();
        doomed
            .into_iter()
            .filter(|token| members.remove(token).is_some())
            .count()
    }

    fn len(&self, key: &Bytes) -> usize {
        self.sorted_sets.get(key).map_or(0, |m| m.len())
    }
}
