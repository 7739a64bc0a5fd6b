//! Event parser (§4.2): turns a raw `(channel, payload)` notification into a
//! [`ParsedInput`] by matching the channel against the two configured
//! prefixes and splitting the payload accordingly. Interpreting the
//! resulting `event_name`/`event_arg` against the invalidation table is the
//! dispatcher's job (see [`crate::dispatch`]).

use bytes::Bytes;

use crate::config::ListenerConfig;

/// The result of matching a notification's channel against the two
/// configured prefixes and splitting its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedInput {
    /// A standard-channel notification: payload is a bare event name.
    Standard { key: Bytes, event_name: String },
    /// A detailed-channel notification: payload is
    /// `<originator>:<event-name>[:<event-arg>]`.
    Detailed {
        key: Bytes,
        originator: Bytes,
        event_name: String,
        event_arg: Bytes,
    },
    /// The channel matched neither configured prefix.
    Unknown,
}

/// Parses a raw `(channel, payload)` notification per the configured
/// database index's channel prefixes.
#[must_use]
pub fn parse(config: &ListenerConfig, channel: &Bytes, payload: &Bytes) -> ParsedInput {
    let standard_prefix = config.standard_prefix();
    let detailed_prefix = config.detailed_prefix();

    if let Some(key) = strip_prefix(channel, detailed_prefix.as_bytes()) {
        // A payload missing its first `:` entirely has no well-formed
        // originator/event-name split; `rest` then defaults to empty, so
        // `event_name` ends up empty and dispatch naturally treats it as
        // an unknown event (I5) rather than special-casing it here.
        let (originator, rest) = split_once(payload);
        let rest = rest.unwrap_or_default();
        let (event_name, event_arg) = split_once(&rest);
        return ParsedInput::Detailed {
            key,
            originator,
            event_name: decode_name(&event_name),
            event_arg: event_arg.unwrap_or_default(),
        };
    }

    if let Some(key) = strip_prefix(channel, standard_prefix.as_bytes()) {
        return ParsedInput::Standard {
            key,
            event_name: decode_name(payload),
        };
    }

    ParsedInput::Unknown
}

fn strip_prefix(channel: &Bytes, prefix: &[u8]) -> Option<Bytes> {
    if channel.len() < prefix.len() || &channel[..prefix.len()] != prefix {
        return None;
    }
    Some(channel.slice(prefix.len()..))
}

/// Splits `payload` on the first `:`, returning `(head, tail)` where `tail`
/// is `None` if no `:` was found.
fn split_once(payload: &Bytes) -> (Bytes, Option<Bytes>) {
    match payload.iter().position(|&b| b == b':') {
        Some(idx) => (payload.slice(..idx), Some(payload.slice(idx + 1..))),
        None => (payload.clone(), None),
    }
}

fn decode_name(bytes: &Bytes) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
