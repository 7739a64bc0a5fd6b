//! Internal error types.
//!
//! Per the propagation policy, none of these ever escape a subscription
//! callback -- `DispatchIssue` values are logged at debug and dropped.
//! `SubscriptionError` is the exception: it is returned from the explicit,
//! application-initiated `Listener::start`/`Listener::shutdown` calls, which
//! are not per-event callbacks.

/// A malformed or otherwise unactionable event payload.
///
/// Produced while interpreting `(event_name, event_arg)` against the
/// invalidation table. Every variant corresponds to I5 ("payload
/// robustness"): the event is dropped, not escalated.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DispatchIssue {
    #[error("rename_key for {key:?} had an empty new-key argument")]
    EmptyRenameTarget { key: String },

    #[error("{event} member token {token:?} for key {key:?} is not a valid integer")]
    NonIntegerMemberToken {
        event: &'static str,
        key: String,
        token: String,
    },

    #[error("zremrangebyscore argument {arg:?} for key {key:?} did not have 3 '-'-separated fields")]
    ScoreRangeFieldCount { key: String, arg: String },

    #[error("zremrangebyscore argument {arg:?} for key {key:?} had a non-numeric bound")]
    ScoreRangeNotNumeric { key: String, arg: String },

    #[error("zremrangebyscore argument {arg:?} for key {key:?} had an unrecognized exclude code")]
    UnknownExcludeCode { key: String, arg: String },
}

/// Failure from the subscription transport (the external pub/sub collaborator).
#[derive(Debug, Clone, thiserror::Error)]
pub enum SubscriptionError {
    #[error("failed to subscribe to pattern {pattern:?}: {reason}")]
    Subscribe { pattern: String, reason: String },

    #[error("failed to unsubscribe from pattern {pattern:?}: {reason}")]
    Unsubscribe { pattern: String, reason: String },
}
