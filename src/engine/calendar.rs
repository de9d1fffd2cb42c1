//! Calendar-day arithmetic in the owner's time zone.
//!
//! Every streak and decay computation goes through [`calendar_day`] and
//! [`days_between`]; nothing in the engine compares raw millisecond deltas.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// Largest offset accepted, in minutes (SQLite check mirrors this).
pub const MAX_OFFSET_MINUTES: i32 = 18 * 60;

pub fn utc() -> FixedOffset {
    Utc.fix()
}

/// Build an offset from minutes east of UTC. `None` outside ±18h.
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    if minutes.unsigned_abs() > MAX_OFFSET_MINUTES.unsigned_abs() {
        return None;
    }
    FixedOffset::east_opt(minutes * 60)
}

/// The owner-local date an instant falls on.
pub fn calendar_day(ts: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    ts.with_timezone(&offset).date_naive()
}

/// Signed number of calendar days from `earlier` to `later`.
pub fn days_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    later.signed_duration_since(earlier).num_days()
}

/// Calendar days elapsed between two instants in the given zone. Negative when
/// `to` falls on an earlier day than `from`.
pub fn elapsed_days(from: DateTime<Utc>, to: DateTime<Utc>, offset: FixedOffset) -> i64 {
    days_between(calendar_day(from, offset), calendar_day(to, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn offsets_are_bounded() {
        assert!(offset_from_minutes(0).is_some());
        assert!(offset_from_minutes(-300).is_some());
        assert!(offset_from_minutes(MAX_OFFSET_MINUTES).is_some());
        assert!(offset_from_minutes(MAX_OFFSET_MINUTES + 1).is_none());
        assert!(offset_from_minutes(i32::MIN).is_none());
    }

    #[test]
    fn day_boundary_follows_owner_offset() {
        // 03:30 UTC is still the previous evening in New York (UTC-5).
        let ts = at(2026, 3, 10, 3, 30);
        let new_york = offset_from_minutes(-300).unwrap();
        assert_eq!(calendar_day(ts, utc()), NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
        assert_eq!(calendar_day(ts, new_york), NaiveDate::from_ymd_opt(2026, 3, 9).unwrap());
    }

    #[test]
    fn elapsed_days_counts_midnights_not_hours() {
        // 23:50 -> 00:10 is one calendar day apart despite 20 minutes elapsed.
        assert_eq!(elapsed_days(at(2026, 1, 1, 23, 50), at(2026, 1, 2, 0, 10), utc()), 1);
        // 00:10 -> 23:50 the same day is zero.
        assert_eq!(elapsed_days(at(2026, 1, 1, 0, 10), at(2026, 1, 1, 23, 50), utc()), 0);
        // Backwards is negative.
        assert_eq!(elapsed_days(at(2026, 1, 3, 9, 0), at(2026, 1, 1, 9, 0), utc()), -2);
    }

    #[test]
    fn days_between_spans_month_ends() {
        let jan31 = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let feb2 = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        assert_eq!(days_between(jan31, feb2), 2);
        assert_eq!(days_between(feb2, jan31), -2);
    }
}
