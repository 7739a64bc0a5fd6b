//! Event dispatcher (§4.3): the invalidation table.
//!
//! Interprets an already-parsed `(event_name, event_arg)` pair into a typed
//! [`Event`] and applies the corresponding mutation(s) to every registered
//! database's typed stores. Unknown event names -- and malformed arguments
//! for names the table does recognize -- produce [`Event::Ignored`], never
//! an error (I5).

use std::collections::HashSet;

use bytes::Bytes;
use tracing::debug;

use crate::database::RegisteredDatabase;
use crate::error::DispatchIssue;
use crate::store::ExcludeCode;

/// Which channel family a notification arrived on.
///
/// Only `expired` is standard-channel-only; every other table entry applies
/// uniformly to both families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelFamily {
    Standard,
    Detailed,
}

/// A fully interpreted keyspace notification (§3 "Parsed Event").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Expired { key: Bytes },
    Deleted { key: Bytes },
    Expire { key: Bytes },
    Renamed { from: Bytes, to: Bytes },
    StringSet { key: Bytes },
    StringMutated { key: Bytes },
    HashFieldChanged { key: Bytes, field: Bytes },
    SetMemberRemoved { key: Bytes, member_token: Bytes },
    SortedSetMemberChanged { key: Bytes, member_token: i64 },
    SortedSetRangeByScoreRemoved {
        key: Bytes,
        start: f64,
        stop: f64,
        exclude: ExcludeCode,
    },
    SortedSetRangeInvalidated { key: Bytes },
    /// No table entry matched, or the matched entry's argument was malformed.
    Ignored,
}

/// Interprets `(event_name, event_arg)` against the invalidation table,
/// producing the typed [`Event`] it denotes.
#[must_use]
pub fn interpret(channel: ChannelFamily, key: Bytes, event_name: &str, event_arg: &Bytes) -> Event {
    match event_name {
        "expired" if channel == ChannelFamily::Standard => Event::Expired { key },
        "del" => Event::Deleted { key },
        "expire" => Event::Expire { key },
        "rename_key" => {
            if event_arg.is_empty() {
                debug!(
                    "{}",
                    DispatchIssue::EmptyRenameTarget {
                        key: String::from_utf8_lossy(&key).into_owned(),
                    }
                );
                Event::Ignored
            } else {
                Event::Renamed {
                    from: key,
                    to: event_arg.clone(),
                }
            }
        }
        "set" => Event::StringSet { key },
        "setbit" | "setrange" | "incrby" | "incrbyfloat" | "decrby" | "decrbyfloat" | "append" => {
            Event::StringMutated { key }
        }
        "hset" | "hdel" | "hincr" | "hincrbyfloat" | "hdecr" | "hdecrbyfloat" => {
            Event::HashFieldChanged {
                key,
                field: event_arg.clone(),
            }
        }
        "srem" => Event::SetMemberRemoved {
            key,
            member_token: event_arg.clone(),
        },
        "zadd" => sorted_set_member_changed(key, event_arg, "zadd"),
        "zrem" => sorted_set_member_changed(key, event_arg, "zrem"),
        "zincr" => sorted_set_member_changed(key, event_arg, "zincr"),
        "zdecr" => sorted_set_member_changed(key, event_arg, "zdecr"),
        "zremrangebyscore" => match parse_score_range(event_arg, &key) {
            Ok((start, stop, exclude)) => Event::SortedSetRangeByScoreRemoved {
                key,
                start,
                stop,
                exclude,
            },
            Err(issue) => {
                debug!("{issue}");
                Event::Ignored
            }
        },
        "zremrangebyrank" | "zremrangebylex" => Event::SortedSetRangeInvalidated { key },
        _ => Event::Ignored,
    }
}

/// Applies `event`'s mutation to a single registered database's stores.
pub fn apply(event: &Event, db: &RegisteredDatabase) {
    match event {
        Event::Expired { key } | Event::Deleted { key } | Event::SortedSetRangeInvalidated { key } => {
            db.cache.remove(&HashSet::from([key.clone()]));
        }
        Event::Expire { key } => {
            db.cache.clear_ttl(key);
        }
        Event::Renamed { from, to } => {
            db.cache.rename(from, to);
        }
        Event::StringSet { key } | Event::StringMutated { key } => {
            db.cache.remove(&HashSet::from([key.clone()]));
        }
        Event::HashFieldChanged { key, field } => {
            db.hashes.delete(key, &HashSet::from([field.clone()]));
        }
        Event::SetMemberRemoved { key, member_token } => {
            db.sets.remove_by_token(key, &HashSet::from([member_token.clone()]));
        }
        Event::SortedSetMemberChanged { key, member_token } => {
            db.sorted_sets.remove_by_token(key, *member_token);
        }
        Event::SortedSetRangeByScoreRemoved {
            key,
            start,
            stop,
            exclude,
        } => {
            db.sorted_sets.delete_by_score(key, *start, *stop, *exclude);
        }
        Event::Ignored => {}
    }
}

/// Applies `event`'s mutation to every database in `databases` (I3, I4).
pub fn dispatch_to_all(event: &Event, databases: &[std::sync::Arc<RegisteredDatabase>]) {
    for db in databases {
        apply(event, db);
    }
}

fn sorted_set_member_changed(key: Bytes, event_arg: &Bytes, event_name: &'static str) -> Event {
    match parse_i64(event_arg) {
        Some(member_token) => Event::SortedSetMemberChanged { key, member_token },
        None => {
            debug!(
                "{}",
                DispatchIssue::NonIntegerMemberToken {
                    event: event_name,
                    key: String::from_utf8_lossy(&key).into_owned(),
                    token: String::from_utf8_lossy(event_arg).into_owned(),
                }
            );
            Event::Ignored
        }
    }
}

fn parse_i64(arg: &Bytes) -> Option<i64> {
    std::str::from_utf8(arg).ok()?.parse::<i64>().ok()
}

/// Splits `1.5-9.0-2`-shaped arguments into exactly three dash-delimited
/// fields, treating a `-` as a separator only when it isn't the leading
/// sign of the field it would start (so `-1.5-9.0-2` and `1.5--9.0-2`
/// round-trip correctly), then parses `(start, stop, exclude)`.
fn parse_score_range(arg: &Bytes, key: &Bytes) -> Result<(f64, f64, ExcludeCode), DispatchIssue> {
    let key_string = || String::from_utf8_lossy(key).into_owned();
    let arg_string = String::from_utf8_lossy(arg).into_owned();

    let text = std::str::from_utf8(arg).map_err(|_| DispatchIssue::ScoreRangeNotNumeric {
        key: key_string(),
        arg: arg_string.clone(),
    })?;
    let fields = split_signed_dash_fields(text);
    let [start, stop, exclude] = <[&str; 3]>::try_from(fields).map_err(|_| DispatchIssue::ScoreRangeFieldCount {
        key: key_string(),
        arg: arg_string.clone(),
    })?;

    let not_numeric = || DispatchIssue::ScoreRangeNotNumeric {
        key: key_string(),
        arg: arg_string.clone(),
    };
    let start: f64 = start.parse().map_err(|_| not_numeric())?;
    let stop: f64 = stop.parse().map_err(|_| not_numeric())?;
    let exclude_code: i64 = exclude.parse().map_err(|_| not_numeric())?;
    let exclude = ExcludeCode::try_from(exclude_code).map_err(|()| DispatchIssue::UnknownExcludeCode {
        key: key_string(),
        arg: arg_string.clone(),
    })?;

    Ok((start, stop, exclude))
}

fn split_signed_dash_fields(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut fields = Vec::new();
    let mut field_start = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'-' && i != field_start {
            fields.push(&text[field_start..i]);
            field_start = i + 1;
        }
    }
    fields.push(&text[field_start..]);
    fields
}
