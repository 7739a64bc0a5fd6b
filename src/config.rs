//! Listener configuration.

/// Configuration for a [`Listener`](crate::listener::Listener).
///
/// The remote store's keyspace-notification channels are parameterized by a
/// database index; this struct pins that index and derives the two channel
/// prefixes from it once, rather than hardcoding database `0` the way the
/// original implementation did.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Remote-store database index this listener subscribes against.
    pub db_index: u8,
}

impl ListenerConfig {
    /// Creates a configuration for the given database index.
    #[must_use]
    pub fn new(db_index: u8) -> Self {
        Self { db_index }
    }

    /// The standard-channel pattern, e.g. `__keyspace@0__:*`.
    #[must_use]
    pub fn standard_pattern(&self) -> String {
        format!("__keyspace@{}__:*", self.db_index)
    }

    /// The detailed-channel pattern, e.g. `__keyspace_detailed@0__:*`.
    #[must_use]
    pub fn detailed_pattern(&self) -> String {
        format!("__keyspace_detailed@{}__:*", self.db_index)
    }

    /// The standard-channel prefix, e.g. `__keyspace@0__:`.
    #[must_use]
    pub fn standard_prefix(&self) -> String {
        format!("__keyspace@{}__:", self.db_index)
    }

    /// The detailed-channel prefix, e.g. `__keyspace_detailed@0__:`.
    #[must_use]
    pub fn detailed_prefix(&self) -> String {
        format!("__keyspace_detailed@{}__:", self.db_index)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_targets_database_zero() {
        let config = ListenerConfig::default();
        assert_eq!(config.standard_prefix(), "__keyspace@0__:");
        assert_eq!(config.detailed_prefix(), "__keyspace_detailed@0__:");
        assert_eq!(config.standard_pattern(), "__keyspace@0__:*");
        assert_eq!(config.detailed_pattern(), "__keyspace_detailed@0__:*");
    }

    #[test]
    fn nonzero_db_index_is_reflected_in_prefixes() {
        let config = ListenerConfig::new(7);
        assert_eq!(config.standard_prefix(), "__keyspace@7__:");
        assert_eq!(config.detailed_prefix(), "__keyspace_detailed@7__:");
    }
}
