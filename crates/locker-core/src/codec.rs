//! Lock key codec
//!
//! A lock lives in the store as a single key/value pair:
//!
//! | Part  | Layout                                   | Example                                  |
//! |-------|------------------------------------------|------------------------------------------|
//! | key   | `locker-` + lower-cased lock name        | `locker-staging`                         |
//! | value | owner + `--` + RFC 822 numeric-zone time | `alice--02 Jan 06 15:04 -0700`           |
//! | guard | `unlock-attempt-` + key                  | `unlock-attempt-locker-staging`          |

use std::fmt::Display;

use chrono::{DateTime, FixedOffset, TimeZone};

/// Namespace prefix for lock keys
pub const LOCK_PREFIX: &str = "locker-";

/// Prefix for the transient key serializing release attempts
pub const UNLOCK_GUARD_PREFIX: &str = "unlock-attempt-";

/// Separator between owner and creation timestamp in a stored value
pub const VALUE_SEPARATOR: &str = "--";

/// RFC 822 with a numeric zone, e.g. `02 Jan 06 15:04 -0700`
pub const TIMESTAMP_FORMAT: &str = "%d %b %y %H:%M %z";

/// Map a lock name to its store key. Names are case-insensitive.
pub fn to_key(lock_name: &str) -> String {
    format!("{}{}", LOCK_PREFIX, lock_name.to_lowercase())
}

/// Guard key for release attempts on `key`
pub fn guard_key(key: &str) -> String {
    format!("{}{}", UNLOCK_GUARD_PREFIX, key)
}

/// Store pattern enumerating every lock key
pub fn key_pattern() -> String {
    format!("{}*", LOCK_PREFIX)
}

/// Recover the (lower-cased) lock name from a store key
pub fn lock_name_from_key(key: &str) -> &str {
    key.strip_prefix(LOCK_PREFIX).unwrap_or(key)
}

/// Format a creation time the way it is persisted
pub fn format_timestamp<Tz>(created_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    created_at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a persisted creation time, keeping its zone offset
pub fn parse_timestamp(text: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)
}

/// Encode the stored value for a newly acquired lock.
///
/// An owner containing `--` is not escaped; decoding then splits inside the
/// owner.
pub fn encode_value<Tz>(owner: &str, created_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{}{}{}", owner, VALUE_SEPARATOR, format_timestamp(created_at))
}

/// Decoded lock value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockValue {
    pub owner: String,
    /// Creation time as stored; may be malformed
    pub created_at: String,
}

/// Split a stored value on the first `--`.
///
/// A value without a separator is treated as a bare owner with an empty
/// timestamp.
pub fn decode_value(value: &str) -> LockValue {
    match value.split_once(VALUE_SEPARATOR) {
        Some((owner, created_at)) => LockValue {
            owner: owner.to_string(),
            created_at: created_at.to_string(),
        },
        None => LockValue {
            owner: value.to_string(),
            created_at: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};

    #[test]
    fn test_to_key_lowercases() {
        assert_eq!(to_key("Staging"), "locker-staging");
        assert_eq!(to_key("QA env #2"), "locker-qa env #2");
    }

    #[test]
    fn test_guard_key() {
        assert_eq!(guard_key("locker-staging"), "unlock-attempt-locker-staging");
    }

    #[test]
    fn test_lock_name_from_key() {
        assert_eq!(lock_name_from_key("locker-staging"), "staging");
        assert_eq!(lock_name_from_key("locker-locker-x"), "locker-x");
        assert_eq!(lock_name_from_key("other"), "other");
    }

    #[test]
    fn test_encode_value_format() {
        let zone = FixedOffset::west_opt(7 * 3600).unwrap();
        let created = zone.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap();
        assert_eq!(encode_value("alice", &created), "alice--02 Jan 06 15:04 -0700");
    }

    #[test]
    fn test_decode_value_splits_on_first_separator() {
        let decoded = decode_value("alice--02 Jan 06 15:04 -0700");
        assert_eq!(decoded.owner, "alice");
        assert_eq!(decoded.created_at, "02 Jan 06 15:04 -0700");

        let decoded = decode_value("a--b--c");
        assert_eq!(decoded.owner, "a");
        assert_eq!(decoded.created_at, "b--c");
    }

    #[test]
    fn test_decode_value_without_separator() {
        let decoded = decode_value("alice");
        assert_eq!(decoded.owner, "alice");
        assert_eq!(decoded.created_at, "");
    }

    #[test]
    fn test_timestamp_parse_keeps_offset() {
        let parsed = parse_timestamp("02 Jan 06 15:04 -0700").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), -7 * 3600);
        assert_eq!(parsed.hour(), 15);
        assert_eq!(parsed.minute(), 4);
        assert_eq!(parsed.second(), 0);
    }

    #[test]
    fn test_timestamp_round_trip_to_minute() {
        let zone = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let created = zone.with_ymd_and_hms(2024, 11, 30, 23, 59, 42).unwrap();
        let parsed = parse_timestamp(&format_timestamp(&created)).unwrap();
        assert_eq!(parsed, created.with_second(0).unwrap());
    }

    #[test]
    fn test_timestamp_parse_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("").is_err());
    }
}
