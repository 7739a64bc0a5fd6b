//! Typed local shadow stores.
//!
//! Defines the mutator contracts pinned by the invalidation table (§6 of the
//! specification this crate implements) as traits, plus one `DashMap`-backed
//! implementation of each so the engine is runnable and testable standalone.
//! A production cache client is free to supply its own implementations;
//! the dispatcher only ever depends on the trait objects.

mod memory_cache;
mod memory_hashes;
mod memory_sets;
mod memory_sorted_sets;

pub use memory_cache::{CacheStore, DashMapCacheStore};
pub use memory_hashes::{DashMapHashStore, HashStore};
pub use memory_sets::{DashMapSetStore, SetStore};
pub use memory_sorted_sets::{DashMapSortedSetStore, SortedSetStore};

/// The four-valued range-exclusion code carried by `zremrangebyscore`
/// events, matching the upstream store client's conventional `Exclude`
/// enumeration: `None = 0`, `Start = 1`, `Stop = 2`, `Both = 3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcludeCode {
    /// Both endpoints inclusive.
    None,
    /// Start endpoint exclusive, stop inclusive.
    Start,
    /// Stop endpoint exclusive, start inclusive.
    Stop,
    /// Both endpoints exclusive.
    Both,
}

impl ExcludeCode {
    /// Returns `true` if `score` falls within `[start, stop]` under this
    /// exclusion mode.
    #[must_use]
    pub fn contains(self, score: f64, start: f64, stop: f64) -> bool {
        let above_start = match self {
            ExcludeCode::None | ExcludeCode::Stop => score >= start,
            ExcludeCode::Start | ExcludeCode::Both => score > start,
        };
        let below_stop = match self {
            ExcludeCode::None | ExcludeCode::Start => score <= stop,
            ExcludeCode::Stop | ExcludeCode::Both => score < stop,
        };
        above_start && below_stop
    }
}

impl TryFrom<i64> for ExcludeCode {
    type Error = ();

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ExcludeCode::None),
            1 => Ok(ExcludeCode::Start),
            2 => Ok(ExcludeCode::Stop),
            3 => Ok(ExcludeCode::Both),
            _ => Err(()),
        }
    }
}
