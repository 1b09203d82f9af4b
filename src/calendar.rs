//! Calendar day utilities
//!
//! All day-boundary arithmetic for the engine lives here, in one place
//! with one week-start convention (Monday). Every other component works
//! in terms of local calendar days produced by this module.
//!
//! A [`Calendar`] holds the household's timezone. Day keys (`YYYY-MM-DD`)
//! are always formatted from the local calendar date, so two instants in
//! the same local day map to the same key regardless of time of day.

use chrono::{
    DateTime, Datelike, Duration, Local, LocalResult, Months, NaiveDate, NaiveTime, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

/// Milliseconds in one day. Only for sizing lookback windows; calendar
/// walks go through `NaiveDate` so DST days never miscount.
pub const MS_PER_DAY: i64 = 86_400_000;

/// Leaderboard time ranges, all ending at "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeKey {
    Week,
    Month,
    All,
}

/// Day-boundary calculator for a single household timezone.
///
/// The engine supports exactly one timezone per household; tests use
/// `Utc` or a `FixedOffset` for determinism, hosts use [`Calendar::local`].
#[derive(Debug, Clone)]
pub struct Calendar<Tz: TimeZone = Local> {
    tz: Tz,
}

impl Calendar<Local> {
    /// Calendar in the system-local timezone
    pub fn local() -> Self {
        Self { tz: Local }
    }
}

impl<Tz: TimeZone> Calendar<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    fn datetime(&self, ms: i64) -> DateTime<Tz> {
        DateTime::<Utc>::from_timestamp_millis(ms)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
            .with_timezone(&self.tz)
    }

    /// Local calendar date containing the instant `ms`
    pub fn local_date(&self, ms: i64) -> NaiveDate {
        self.datetime(ms).date_naive()
    }

    /// Instant of local midnight for a calendar date.
    ///
    /// When a DST transition removes midnight the first valid instant of
    /// the day is used instead; when midnight is ambiguous the earlier
    /// instant wins.
    pub fn date_start_ms(&self, date: NaiveDate) -> i64 {
        let midnight = date.and_time(NaiveTime::MIN);
        match self.tz.from_local_datetime(&midnight) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.timestamp_millis(),
            LocalResult::None => self
                .tz
                .from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
                .map(|dt| dt.timestamp_millis())
                .unwrap_or_default(),
        }
    }

    /// Floor an instant to local midnight
    pub fn start_of_day_ms(&self, ms: i64) -> i64 {
        self.date_start_ms(self.local_date(ms))
    }

    /// Local `YYYY-MM-DD` key for an instant
    pub fn day_key(&self, ms: i64) -> String {
        day_key_of(self.local_date(ms))
    }

    /// Add whole local days to a day-start instant
    pub fn add_days_ms(&self, day_start_ms: i64, days: i64) -> i64 {
        self.date_start_ms(self.local_date(day_start_ms) + Duration::days(days))
    }

    /// Add calendar months to a day-start instant, clamping to the last
    /// valid day of the target month (Jan 31 + 1 month = Feb 28/29)
    pub fn add_months_ms(&self, day_start_ms: i64, months: i32) -> i64 {
        let date = self.local_date(day_start_ms);
        let shifted = if months >= 0 {
            date.checked_add_months(Months::new(months as u32))
        } else {
            date.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        self.date_start_ms(shifted.unwrap_or(date))
    }

    /// Start of the local week containing `ms` (Monday start)
    pub fn start_of_week_ms(&self, ms: i64) -> i64 {
        let date = self.local_date(ms);
        let since_monday = date.weekday().num_days_from_monday() as i64;
        self.date_start_ms(date - Duration::days(since_monday))
    }

    /// Start of the local month containing `ms`
    pub fn start_of_month_ms(&self, ms: i64) -> i64 {
        let date = self.local_date(ms);
        self.date_start_ms(date.with_day(1).unwrap_or(date))
    }

    /// `[start, end)` bounds for filtering ledger entries by created-at
    pub fn range_ms(&self, range: RangeKey, now_ms: i64) -> (i64, i64) {
        match range {
            RangeKey::Week => (self.start_of_week_ms(now_ms), now_ms),
            RangeKey::Month => (self.start_of_month_ms(now_ms), now_ms),
            RangeKey::All => (0, now_ms),
        }
    }
}

/// `YYYY-MM-DD` key for a calendar date
pub fn day_key_of(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` day key; malformed keys yield `None`
pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Whole days between the Unix epoch and a calendar date.
///
/// Pure date arithmetic, so DST transitions can never shift the index.
pub fn day_index(date: NaiveDate) -> i64 {
    (date - NaiveDate::default()).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc_cal() -> Calendar<Utc> {
        Calendar::new(Utc)
    }

    fn ms_of(cal: &Calendar<Utc>, key: &str) -> i64 {
        cal.date_start_ms(parse_day_key(key).unwrap())
    }

    #[test]
    fn test_day_key_stable_across_times_of_day() {
        let cal = utc_cal();
        let midnight = ms_of(&cal, "2025-06-15");
        let evening = midnight + 23 * 3_600_000 + 59 * 60_000;

        assert_eq!(cal.day_key(midnight), "2025-06-15");
        assert_eq!(cal.day_key(evening), "2025-06-15");
        assert_eq!(cal.start_of_day_ms(evening), midnight);
    }

    #[test]
    fn test_day_key_uses_local_calendar_not_utc() {
        // UTC+13: 2025-06-15T23:00 local is still 2025-06-15 even though
        // the UTC date is already the 16th... and vice versa.
        let tz = FixedOffset::east_opt(13 * 3600).unwrap();
        let cal = Calendar::new(tz);

        let local_evening = tz
            .with_ymd_and_hms(2025, 6, 15, 23, 0, 0)
            .unwrap()
            .timestamp_millis();
        assert_eq!(cal.day_key(local_evening), "2025-06-15");
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        let cal = utc_cal();
        let jan31 = ms_of(&cal, "2025-01-31");

        let feb = cal.add_months_ms(jan31, 1);
        assert_eq!(cal.day_key(feb), "2025-02-28");

        // Leap year keeps the 29th
        let jan31_leap = ms_of(&cal, "2024-01-31");
        assert_eq!(cal.day_key(cal.add_months_ms(jan31_leap, 1)), "2024-02-29");
    }

    #[test]
    fn test_add_days_crosses_month_boundary() {
        let cal = utc_cal();
        let jan30 = ms_of(&cal, "2025-01-30");
        assert_eq!(cal.day_key(cal.add_days_ms(jan30, 3)), "2025-02-02");
    }

    #[test]
    fn test_week_starts_on_monday() {
        let cal = utc_cal();
        // 2025-06-15 is a Sunday; its week starts Monday 2025-06-09
        let sunday = ms_of(&cal, "2025-06-15") + 5 * 3_600_000;
        assert_eq!(cal.day_key(cal.start_of_week_ms(sunday)), "2025-06-09");

        // A Monday is its own week start
        let monday = ms_of(&cal, "2025-06-09") + 12 * 3_600_000;
        assert_eq!(cal.day_key(cal.start_of_week_ms(monday)), "2025-06-09");
    }

    #[test]
    fn test_start_of_month() {
        let cal = utc_cal();
        let mid = ms_of(&cal, "2025-06-15");
        assert_eq!(cal.day_key(cal.start_of_month_ms(mid)), "2025-06-01");
    }

    #[test]
    fn test_range_bounds() {
        let cal = utc_cal();
        let now = ms_of(&cal, "2025-06-15") + 9 * 3_600_000;

        let (start, end) = cal.range_ms(RangeKey::All, now);
        assert_eq!((start, end), (0, now));

        let (start, _) = cal.range_ms(RangeKey::Month, now);
        assert_eq!(cal.day_key(start), "2025-06-01");

        let (start, _) = cal.range_ms(RangeKey::Week, now);
        assert_eq!(cal.day_key(start), "2025-06-09");
    }

    #[test]
    fn test_parse_day_key_rejects_garbage() {
        assert!(parse_day_key("2025-06-15").is_some());
        assert!(parse_day_key("not-a-date").is_none());
        assert!(parse_day_key("2025-13-40").is_none());
    }

    #[test]
    fn test_day_index_epoch_relative() {
        assert_eq!(day_index(NaiveDate::default()), 0);
        assert_eq!(day_index(parse_day_key("1970-01-08").unwrap()), 7);
        assert!(day_index(parse_day_key("1969-12-31").unwrap()) < 0);
    }
}
