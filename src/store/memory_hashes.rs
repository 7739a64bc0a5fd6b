//! Shadow store for hash-shaped keys (field -> value maps).

use std::collections::HashSet;

use bytes::Bytes;
use dashmap::DashMap;

/// Mutator and read contract for the hash-shaped shadow store.
///
/// `delete` is the invalidation-table mutator pinned by §6; `set_field`/
/// `get_field`/`field_count` are the minimal read/write surface needed to
/// seed and observe local state.
pub trait HashStore: Send + Sync {
    /// Sets a single field within `key`'s hash.
    fn set_field(&self, key: Bytes, field: Bytes, value: Bytes);

    /// Returns the value of `field` within `key`'s hash, if present.
    fn get_field(&self, key: &Bytes, field: &Bytes) -> Option<Bytes>;

    /// Removes the named `fields` from `key`'s hash. Missing fields are not
    /// errors. Returns the number of fields actually removed. Removing the
    /// last field leaves an empty hash in place (the key itself is not
    /// removed -- that is `del`'s job, handled on `CacheStore`).
    fn delete(&self, key: &Bytes, fields: &HashSet<Bytes>) -> usize;

    /// Returns the number of fields currently held for `key`.
    fn field_count(&self, key: &Bytes) -> usize;
}

/// `DashMap`-backed [`HashStore`]: `key -> (field -> value)`.
#[derive(Debug, Default)]
pub struct DashMapHashStore {
    hashes: DashMap<Bytes, DashMap<Bytes, Bytes>>,
}

impl DashMapHashStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl HashStore for DashMapHashStore {
    fn set_field(&self, key: Bytes, field: Bytes, value: Bytes) {
        self.hashes.entry(key).or_default().insert(field, value);
    }

    fn get_field(&self, key: &Bytes, field: &Bytes) -> Option<Bytes> {
        self.hashes
            .get(key)
            .and_then(|fields| fields.get(field).map(|v| v.clone()))
    }

    fn delete(&self, key: &Bytes, fields: &HashSet<Bytes>) -> usize {
        let Some(stored) = self.hashes.get(key) else {
            return 0;
        };
        fields
            .iter()
            .filter(|field| stored.remove(*field).is_some())
            .count()
    }

    fn field_count(&self, key: &Bytes) -> usize {
        self.hashes.get(key).map_or(0, |fields| fields.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(s: &str) -> Bytes {
        Bytes::from(s.to_string())
    }

    #[test]
    fn delete_removes_only_named_fields() {
        let store = DashMapHashStore::new();
        store.set_field(b("user:42"), b("email"), b("a@example.com"));
        store.set_field(b("user:42"), b("name"), b("Ada"));

        let removed = store.delete(&b("user:42"), &HashSet::from([b("email")]));

        assert_eq!(removed, 1);
        assert!(store.get_field(&b("user:42"), &b("email")).is_none());
        assert_eq!(
            store.get_field(&b("user:42"), &b("name")),
            Some(b("Ada"))
        );
    }

    #[test]
    fn delete_on_missing_key_is_a_no_op() {
        let store = DashMapHashStore::new();
        let removed = store.delete(&b("missing"), &HashSet::from([b("f")]));
        assert_eq!(removed, 0);
    }

    #[test]
    fn delete_on_missing_field_is_a_no_op() {
        let store = DashMapHashStore::new();
        store.set_field(b("k"), b("a"), b("1"));
        let removed = store.delete(&b("k"), &HashSet::from([b("missing")]));
        assert_eq!(removed, 0);
        assert_eq!(store.field_count(&b("k")), 1);
    }
}
