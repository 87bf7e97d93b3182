//! Business time zone helpers
//!
//! Storage only sees `i64` Unix millis; conversions from local dates happen here.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

pub fn now_in(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}

/// Local midnight of `date` as Unix millis
///
/// DST gap fallback: if local midnight does not exist, UTC midnight is used.
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    naive
        .and_local_timezone(tz)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// `[start, end)` millis range of the business day containing `now`
pub fn day_bounds_millis(now: &DateTime<Tz>) -> (i64, i64) {
    let tz = now.timezone();
    let today = now.date_naive();
    let tomorrow = today.succ_opt().unwrap_or(today);
    (day_start_millis(today, tz), day_start_millis(tomorrow, tz))
}
