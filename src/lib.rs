//! Keyspace-notification invalidation and coherence engine for a
//! client-side L1 cache fronting a Redis-compatible remote store.
//!
//! A [`listener::Listener`] subscribes to a remote store's keyspace
//! notifications (both the standard `__keyspace@<db>__:` channel and a
//! detailed `__keyspace_detailed@<db>__:` variant carrying an originator id
//! and event argument), parses and interprets each notification against a
//! fixed invalidation table, and applies the resulting mutation to every
//! [`database::RegisteredDatabase`] registered with it.
//!
//! The pieces compose as:
//!
//! - [`subscription`] -- the transport boundary toward the remote store's
//!   pub/sub, and a [`subscription::FakeTransport`] test double.
//! - [`event`] -- turns `(channel, payload)` into a [`event::ParsedInput`].
//! - [`dispatch`] -- interprets `(event_name, event_arg)` into a typed
//!   [`dispatch::Event`] and applies it to a database's stores.
//! - [`store`] -- the typed shadow stores (`string`, `hash`, `set`, `sorted
//!   set`) an `Event` mutates.
//! - [`identity`] -- the per-process token used to filter out
//!   self-originated events.
//! - [`listener`] -- ties the above together into the running engine.

pub mod config;
pub mod database;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod identity;
pub mod listener;
pub mod store;
pub mod subscription;

pub use config::ListenerConfig;
pub use database::RegisteredDatabase;
pub use dispatch::Event;
pub use error::{DispatchIssue, SubscriptionError};
pub use identity::{DefaultProcessIdentity, ProcessIdentity};
pub use listener::Listener;
pub use subscription::{FakeTransport, PatternSubscriber};
