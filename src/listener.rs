//! Listener/lifecycle (§4.4): owns the subscription to both notification
//! channel families, the registered-database list, and the pause flag.
//!
//! Construction is two-phase, mirroring the deferred-startup shape used
//! elsewhere in this codebase: [`Listener::new`] allocates the shared state
//! without touching the transport, and the async [`Listener::start`]
//! installs the two pattern subscriptions. This lets a caller register
//! databases before or after `start()` without a race, since the
//! registered-database snapshot is shared via `Arc` from construction time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use bytes::Bytes;
use parking_lot::Mutex;

use crate::config::ListenerConfig;
use crate::database::RegisteredDatabase;
use crate::dispatch::{self, ChannelFamily};
use crate::error::SubscriptionError;
use crate::event::{self, ParsedInput};
use crate::identity::ProcessIdentity;
use crate::subscription::PatternSubscriber;

/// State shared between the `Listener` handle and its two notification
/// callbacks. Lives behind an `Arc` so the callbacks -- which must be
/// `'static` to hand to the transport -- can hold their own reference
/// without borrowing from `Listener` itself.
struct Shared {
    config: ListenerConfig,
    identity: Arc<dyn ProcessIdentity>,
    paused: AtomicBool,
    /// Copy-on-write snapshot of registered databases (§5, §9): handler
    /// reads never block on `register()`, and concurrent `register()`
    /// calls are serialized by `register_lock` so they don't race each
    /// other's read-modify-swap.
    databases: ArcSwap<Vec<Arc<RegisteredDatabase>>>,
    register_lock: Mutex<()>,
}

/// Owns the subscription to the standard and detailed keyspace-notification
/// channels and dispatches incoming events to every registered database.
pub struct Listener {
    shared: Arc<Shared>,
    transport: Arc<dyn PatternSubscriber>,
}

impl Listener {
    /// Allocates listener state for the given transport, identity, and
    /// configuration, without subscribing to anything yet. Call
    /// [`Listener::start`] to begin receiving notifications.
    #[must_use]
    pub fn new(
        transport: Arc<dyn PatternSubscriber>,
        identity: Arc<dyn ProcessIdentity>,
        config: ListenerConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                identity,
                paused: AtomicBool::new(false),
                databases: ArcSwap::from_pointee(Vec::new()),
                register_lock: Mutex::new(()),
            }),
            transport,
        }
    }

    /// Installs the two pattern subscriptions on the transport.
    ///
    /// # Errors
    ///
    /// Returns an error if either subscription fails to install.
    pub async fn start(&self) -> Result<(), SubscriptionError> {
        let standard_pattern = self.shared.config.standard_pattern();
        let shared = Arc::clone(&self.shared);
        self.transport
            .psubscribe(
                &standard_pattern,
                Arc::new(move |channel, payload| handle_standard(&shared, &channel, &payload)),
            )
            .await?;

        let detailed_pattern = self.shared.config.detailed_pattern();
        let shared = Arc::clone(&self.shared);
        self.transport
            .psubscribe(
                &detailed_pattern,
                Arc::new(move |channel, payload| handle_detailed(&shared, &channel, &payload)),
            )
            .await?;

        Ok(())
    }

    /// Releases both subscriptions.
    ///
    /// The source this engine is modeled on only unsubscribed the standard
    /// pattern, leaking the detailed one; that is treated here as a bug
    /// (§9) and both patterns are released.
    ///
    /// # Errors
    ///
    /// Returns an error if either unsubscription fails.
    pub async fn shutdown(&self) -> Result<(), SubscriptionError> {
        self.transport
            .punsubscribe(&self.shared.config.standard_pattern())
            .await?;
        self.transport
            .punsubscribe(&self.shared.config.detailed_pattern())
            .await?;
        Ok(())
    }

    /// Appends `db` to the registered-databases collection (§4.5).
    ///
    /// Registration is additive and monotonic for the listener's lifetime;
    /// there is no corresponding `deregister`.
    pub fn register(&self, db: Arc<RegisteredDatabase>) {
        let _guard = self.shared.register_lock.lock();
        let mut next = (**self.shared.databases.load()).clone();
        next.push(db);
        self.shared.databases.store(Arc::new(next));
    }

    /// Sets or clears the pause flag (I2).
    ///
    /// Observed best-effort: an event already in flight when this call
    /// returns may or may not have been dropped.
    pub fn pause(&self, flag: bool) {
        self.shared.paused.store(flag, Ordering::SeqCst);
    }

    /// Returns the current pause state.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::SeqCst)
    }

    /// Returns the number of currently registered databases.
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.shared.databases.load().len()
    }
}

fn handle_standard(shared: &Shared, channel: &Bytes, payload: &Bytes) {
    if shared.paused.load(Ordering::SeqCst) {
        return;
    }
    let ParsedInput::Standard { key, event_name } = event::parse(&shared.config, channel, payload) else {
        return;
    };
    let event = dispatch::interpret(ChannelFamily::Standard, key, &event_name, &Bytes::new());
    let databases = shared.databases.load_full();
    dispatch::dispatch_to_all(&event, &databases);
}

fn handle_detailed(shared: &Shared, channel: &Bytes, payload: &Bytes) {
    if shared.paused.load(Ordering::SeqCst) {
        return;
    }
    let ParsedInput::Detailed {
        key,
        originator,
        event_name,
        event_arg,
    } = event::parse(&shared.config, channel, payload)
    else {
        return;
    };

    // I1: drop self-originated events before dispatch.
    if originator.as_ref() == shared.identity.current().as_bytes() {
        return;
    }

    let event = dispatch::interpret(ChannelFamily::Detailed, key, &event_name, &event_arg);
    let databases = shared.databases.load_full();
    dispatch::dispatch_to_all(&event, &databases);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::DefaultProcessIdentity;
    use crate::store::{DashMapCacheStore, DashMapHashStore, DashMapSetStore, DashMapSortedSetStore};
    use crate::subscription::FakeTransport;

    fn make_db() -> Arc<RegisteredDatabase> {
        Arc::new(RegisteredDatabase::new(
            Arc::new(DashMapCacheStore::new()),
            Arc::new(DashMapHashStore::new()),
            Arc::new(DashMapSetStore::new()),
            Arc::new(DashMapSortedSetStore::new()),
        ))
    }

    async fn make_listener() -> (Listener, Arc<FakeTransport>) {
        let transport = Arc::new(FakeTransport::new());
        let identity = Arc::new(DefaultProcessIdentity::new());
        let listener = Listener::new(transport.clone(), identity, ListenerConfig::default());
        listener.start().await.unwrap();
        (listener, transport)
    }

    fn ch(s: &str) -> Bytes {
        Bytes::from(s.to_string())
    }

    #[tokio::test]
    async fn start_installs_both_pattern_subscriptions() {
        let (_listener, transport) = make_listener().await;
        assert_eq!(transport.subscription_count(), 2);
    }

    #[tokio::test]
    async fn shutdown_releases_both_pattern_subscriptions() {
        let (listener, transport) = make_listener().await;
        listener.shutdown().await.unwrap();
        assert_eq!(transport.subscription_count(), 0);
    }

    #[tokio::test]
    async fn standard_channel_expired_removes_cache_entry() {
        let (listener, transport) = make_listener().await;
        let db = make_db();
        db.cache.set(ch("k1"), ch("v1"), None);
        listener.register(db.clone());

        transport.publish(&ch("__keyspace@0__:k1"), &ch("expired"));

        assert!(!db.cache.contains_key(&ch("k1")));
    }

    #[tokio::test]
    async fn pause_drops_events_on_both_channels() {
        let (listener, transport) = make_listener().await;
        let db = make_db();
        db.cache.set(ch("k1"), ch("v1"), None);
        listener.register(db.clone());
        listener.pause(true);

        transport.publish(&ch("__keyspace@0__:k1"), &ch("expired"));
        transport.publish(
            &ch("__keyspace_detailed@0__:k1"),
            &ch("someone-else:del"),
        );

        assert!(db.cache.contains_key(&ch("k1")));

        listener.pause(false);
        transport.publish(&ch("__keyspace@0__:k1"), &ch("expired"));
        assert!(!db.cache.contains_key(&ch("k1")));
    }

    #[tokio::test]
    async fn self_originated_detailed_events_are_dropped() {
        let transport = Arc::new(FakeTransport::new());
        let identity = Arc::new(DefaultProcessIdentity::new());
        let listener = Listener::new(transport.clone(), identity.clone(), ListenerConfig::default());
        listener.start().await.unwrap();

        let db = make_db();
        db.cache.set(ch("k"), ch("v"), None);
        listener.register(db.clone());

        let payload = format!("{}:set", identity.current());
        transport.publish(&ch("__keyspace_detailed@0__:k"), &ch(&payload));

        assert!(db.cache.contains_key(&ch("k")));
    }

    #[tokio::test]
    async fn non_self_detailed_events_are_applied() {
        let (listener, transport) = make_listener().await;
        let db = make_db();
        db.cache.set(ch("k"), ch("v"), None);
        listener.register(db.clone());

        transport.publish(&ch("__keyspace_detailed@0__:k"), &ch("someone-else:set"));

        assert!(!db.cache.contains_key(&ch("k")));
    }

    #[tokio::test]
    async fn registration_is_additive_and_applies_to_every_registered_database() {
        let (listener, transport) = make_listener().await;
        let db1 = make_db();
        let db2 = make_db();
        db1.cache.set(ch("q"), ch("v"), None);
        db2.cache.set(ch("q"), ch("v"), None);
        listener.register(db1.clone());
        listener.register(db2.clone());
        assert_eq!(listener.registered_count(), 2);

        transport.publish(&ch("__keyspace_detailed@0__:q"), &ch("someone-else:del"));

        assert!(!db1.cache.contains_key(&ch("q")));
        assert!(!db2.cache.contains_key(&ch("q")));
    }

    #[tokio::test]
    async fn unrecognized_channel_is_ignored_without_panicking() {
        let (_listener, transport) = make_listener().await;
        transport.publish(&ch("not-a-keyspace-channel"), &ch("whatever"));
    }
}
