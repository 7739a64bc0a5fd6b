//! Shadow store for set-shaped keys.
//!
//! Set members are identified locally by an opaque identity token (see
//! GLOSSARY) rather than by the member's full value, so a removal can be
//! applied without reconstructing or comparing the member itself.

use std::collections::HashSet;

use bytes::Bytes;
use dashmap::DashMap;

/// Mutator and read contract for the set-shaped shadow store.
///
/// `remove_by_token` is the invalidation-table mutator pinned by §6;
/// `add_member`/`contains_token`/`len` are the minimal read/write surface
/// needed to seed and observe local state.
pub trait SetStore: Send + Sync {
    /// Records that `token` identifies a member of `key`'s set.
    fn add_member(&self, key: Bytes, token: Bytes);

    /// Returns `true` if `token` is a known member of `key`'s set.
    fn contains_token(&self, key: &Bytes, token: &Bytes) -> bool;

    /// Removes members of `key`'s set whose identity token is in `tokens`.
    /// Missing tokens are not errors. Returns the number actually removed.
    fn remove_by_token(&self, key: &Bytes, tokens: &HashSet<Bytes>) -> usize;

    /// Returns the number of members currently tracked for `key`.
    fn len(&self, key: &Bytes) -> usize;
}

/// `DashMap`-backed [`SetStore`]: `key -> set of member tokens`.
#[derive(Debug, Default)]
pub struct DashMapSetStore {
    sets: DashMap<Bytes, DashMap<Bytes, ()>>,
}

impl DashMapSetStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SetStore for DashMapSetStore {
    fn add_member(&self, key: Bytes, token: Bytes) {
        self.sets.entry(key).or_default().insert(token, ());
    }

    fn contains_token(&self, key: &Bytes, token: &Bytes) -> bool {
        self.sets
            .get(key)
            .is_some_and(|members| members.contains_key(token))
    }

    fn remove_by_token(&self, key: &Bytes, tokens: &HashSet<Bytes>) -> usize {
        let Some(members) = self.sets.get(key) else {
            return 0;
        };
        tokens
            .iter()
            .filter(|token| members.remove(*token).is_some())
            .count()
    }

    fn len(&self, key: &Bytes) -> usize {
        self.sets.get(key).map_or(0, |members| members.len())
    }
}
