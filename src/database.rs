//! Registration surface (§4.5): how a database instance bundles its local
//! typed stores so the listener can apply invalidations to them.

use std::sync::Arc;

use crate::store::{CacheStore, HashStore, SetStore, SortedSetStore};

/// An opaque handle bundling one database's four typed shadow stores.
///
/// Registered databases are borrowed references owned by the caller -- the
/// listener never frees them (§3 "Lifetimes").
pub struct RegisteredDatabase {
    pub cache: Arc<dyn CacheStore>,
    pub hashes: Arc<dyn HashStore>,
    pub sets: Arc<dyn SetStore>,
    pub sorted_sets: Arc<dyn SortedSetStore>,
}

impl RegisteredDatabase {
    /// Bundles the four typed stores for a single database instance.
    #[must_use]
    pub fn new(
        cache: Arc<dyn CacheStore>,
        hashes: Arc<dyn HashStore>,
        sets: Arc<dyn SetStore>,
        sorted_sets: Arc<dyn SortedSetStore>,
    ) -> Self {
        Self {
            cache,
            hashes,
            sets,
            sorted_sets,
        }
    }
}
