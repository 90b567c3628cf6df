use std::fmt;

use chrono::{Local, Offset, TimeZone};

/// Seconds between 1970-01-01 and the engine epoch 2000-01-01.
const POSTGRES_EPOCH_OFFSET: i64 = 946_684_800;
const USECS_PER_SEC: i64 = 1_000_000;

/// Engine timestamps count microseconds since 2000-01-01 UTC.
pub fn timestamptz_to_time_t(t: i64) -> i64 {
    t / USECS_PER_SEC + POSTGRES_EPOCH_OFFSET
}

pub fn time_to_iso(time: i64) -> String {
    time_to_iso_in(time, &Local)
}

/// `YYYY-MM-DD HH:MM:SS` followed by `+HH` or `+HH:MM`; the offset is left
/// out when it is zero.
pub fn time_to_iso_in<Tz: TimeZone>(time: i64, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    let Some(dt) = tz.timestamp_opt(time, 0).single() else {
        return time.to_string();
    };
    let mut out = dt.format("%Y-%m-%d %H:%M:%S").to_string();
    let offset = dt.offset().fix().local_minus_utc();
    if offset != 0 {
        let sign = if offset >= 0 { '+' } else { '-' };
        let abs = offset.abs();
        out.push_str(&format!("{}{:02}", sign, abs / 3600));
        if abs % 3600 != 0 {
            out.push_str(&format!(":{:02}", (abs % 3600) / 60));
        }
    }
    out
}
