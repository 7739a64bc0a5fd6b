//! Subscription primitive (§6): the external collaborator boundary toward
//! the remote store's actual pub/sub transport.
//!
//! This crate does not ship a production transport -- that lives with the
//! out-of-scope remote-store client -- but does ship [`FakeTransport`] for
//! tests, which records registered handlers so a test can invoke them
//! directly to simulate notifications without a live broker.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use crate::error::SubscriptionError;

/// Invoked once per matching publication with `(channel, payload)`.
///
/// Must be non-blocking and perform no I/O (§5): it runs on whatever thread
/// the transport delivers notifications on.
pub type NotificationHandler = Arc<dyn Fn(Bytes, Bytes) + Send + Sync>;

/// The subscription primitive a [`Listener`](crate::listener::Listener)
/// depends on: pattern-subscribe and pattern-unsubscribe against the
/// remote store's keyspace-notification channels.
#[async_trait]
pub trait PatternSubscriber: Send + Sync {
    /// Installs `handler` for every channel matching `pattern` (glob-style,
    /// with a trailing `*` wildcard).
    async fn psubscribe(&self, pattern: &str, handler: NotificationHandler) -> Result<(), SubscriptionError>;

    /// Removes the subscription for `pattern`.
    async fn punsubscribe(&self, pattern: &str) -> Result<(), SubscriptionError>;
}

/// In-memory [`PatternSubscriber`] for tests: `publish` dispatches directly
/// to any handler whose pattern matches, synchronously, on the caller's
/// thread.
#[derive(Default)]
pub struct FakeTransport {
    handlers: Mutex<HashMap<String, NotificationHandler>>,
}

impl FakeTransport {
    /// Creates a transport with no active subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the remote store publishing `(channel, payload)`.
    ///
    /// Invokes every registered handler whose pattern matches `channel`.
    pub fn publish(&self, channel: &Bytes, payload: &Bytes) {
        let matching: Vec<NotificationHandler> = self
            .handlers
            .lock()
            .iter()
            .filter(|(pattern, _)| pattern_matches(pattern, channel))
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in matching {
            handler(channel.clone(), payload.clone());
        }
    }

    /// Returns the number of currently active pattern subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.handlers.lock().len()
    }
}

#[async_trait]
impl PatternSubscriber for FakeTransport {
    async fn psubscribe(&self, pattern: &str, handler: NotificationHandler) -> Result<(), SubscriptionError> {
        self.handlers.lock().insert(pattern.to_string(), handler);
        Ok(())
    }

    async fn punsubscribe(&self, pattern: &str) -> Result<(), SubscriptionError> {
        self.handlers.lock().remove(pattern);
        Ok(())
    }
}

/// Matches a glob pattern with a single trailing `*` against a channel name.
fn pattern_matches(pattern: &str, channel: &Bytes) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => channel.starts_with(prefix.as_bytes()),
        None => channel.as_ref() == pattern.as_bytes(),
    }
}
