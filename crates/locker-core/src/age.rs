//! Human-readable lock lifetimes.
//!
//! The breakdown keeps the historical arithmetic: once a lock is older than
//! a day, the hour component is derived from `total % days` rather than
//! `total % 1440`. Existing consumers see exactly the same strings.

use chrono::{DateTime, TimeZone, Utc};
use tracing::warn;

use crate::codec::parse_timestamp;

/// Minutes in one day
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Returned when the stored creation time cannot be parsed
pub const UNKNOWN_LIFETIME: &str = "Unknown lifetime";

/// Returned when every component rounds down to zero
pub const LESS_THAN_A_MINUTE: &str = "For less than a minute";

/// Age of a lock created at `created_at`, measured from now.
pub fn age_message(created_at: &str) -> String {
    age_message_at(created_at, Utc::now())
}

/// Age of a lock created at `created_at`, measured from `now`.
///
/// Malformed timestamps degrade to [`UNKNOWN_LIFETIME`]. A creation time in
/// the future counts as zero elapsed minutes.
pub fn age_message_at<Tz: TimeZone>(created_at: &str, now: DateTime<Tz>) -> String {
    match parse_timestamp(created_at) {
        Ok(created) => {
            let elapsed = now.with_timezone(&Utc) - created.with_timezone(&Utc);
            format_elapsed_minutes(elapsed.num_minutes().max(0))
        }
        Err(e) => {
            warn!(created_at = %created_at, error = %e, "Unable to parse lock creation time");
            UNKNOWN_LIFETIME.to_string()
        }
    }
}

/// Break `total` elapsed minutes into `"N days N hours N minutes"`.
///
/// Zero components are omitted; a trailing space is left when minutes are
/// zero.
pub fn format_elapsed_minutes(total: i64) -> String {
    let mut days = 0;
    let mut remainder = total;
    if total > MINUTES_PER_DAY {
        days = total / MINUTES_PER_DAY;
        remainder %= days;
    }
    let hours = remainder / 60;
    let minutes = total % 60;

    if days == 0 && hours == 0 && minutes == 0 {
        return LESS_THAN_A_MINUTE.to_string();
    }

    let mut message = String::new();
    if days > 0 {
        message.push_str(&format!("{} days ", days));
    }
    if hours > 0 {
        message.push_str(&format!("{} hours ", hours));
    }
    if minutes > 0 {
        message.push_str(&format!("{} minutes", minutes));
    }
    message
}
