// src/pipeline/expiry.rs

//! Expiry policy for dated announcements.

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Whether an item expiring on `expires` is expired right now.
pub fn is_expired(expires: Option<&str>) -> bool {
    is_expired_at(expires, Local::now().naive_local())
}

/// Whether an item expiring on `expires` is expired at local time `now`.
///
/// The item stays active through 23:59:59 of its expiry date. Absent, empty
/// or unparsable dates never expire.
pub fn is_expired_at(expires: Option<&str>, now: NaiveDateTime) -> bool {
    let Some(raw) = expires.map(str::trim).filter(|s| !s.is_empty()) else {
        return false;
    };
    let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") else {
        log::debug!("Ignoring unparsable expiry date '{raw}'");
        return false;
    };
    let end_of_day = day.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default());
    end_of_day < now
}
