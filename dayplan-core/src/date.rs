//! Date utilities: canonical "YYYY-MM-DD" dates, Monday-first weekdays, minute-of-day clock.
//!
//! Every date here is a naive civil date. There is no timezone handling; the
//! caller decides what "today" is and passes it in.

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fallback start of the evening planning block (19:00).
pub const DEFAULT_START_MINUTES: u32 = 19 * 60;

/// Day of the week, numbered 1..=7 with Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WeekdayKey {
    Mon = 1,
    Tue = 2,
    Wed = 3,
    Thu = 4,
    Fri = 5,
    Sat = 6,
    Sun = 7,
}

impl WeekdayKey {
    pub const ALL: [WeekdayKey; 7] = [
        WeekdayKey::Mon,
        WeekdayKey::Tue,
        WeekdayKey::Wed,
        WeekdayKey::Thu,
        WeekdayKey::Fri,
        WeekdayKey::Sat,
        WeekdayKey::Sun,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1..=7 => Some(Self::ALL[usize::from(n) - 1]),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeekdayKey::Mon => "Mon",
            WeekdayKey::Tue => "Tue",
            WeekdayKey::Wed => "Wed",
            WeekdayKey::Thu => "Thu",
            WeekdayKey::Fri => "Fri",
            WeekdayKey::Sat => "Sat",
            WeekdayKey::Sun => "Sun",
        }
    }
}

impl TryFrom<u8> for WeekdayKey {
    type Error = String;

    fn try_from(n: u8) -> std::result::Result<Self, Self::Error> {
        Self::from_number(n).ok_or_else(|| format!("weekday must be 1..=7, got {n}"))
    }
}

impl From<WeekdayKey> for u8 {
    fn from(key: WeekdayKey) -> Self {
        key.number()
    }
}

impl fmt::Display for WeekdayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Format a date as zero-padded "YYYY-MM-DD".
pub fn to_canonical_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a canonical "YYYY-MM-DD" date.
pub fn parse_canonical_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid canonical date '{s}'"))
}

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// Monday on or before `date`.
pub fn start_of_week_monday(date: NaiveDate) -> NaiveDate {
    add_days(date, -i64::from(date.weekday().num_days_from_monday()))
}

pub fn weekday_key(date: NaiveDate) -> WeekdayKey {
    match date.weekday() {
        chrono::Weekday::Mon => WeekdayKey::Mon,
        chrono::Weekday::Tue => WeekdayKey::Tue,
        chrono::Weekday::Wed => WeekdayKey::Wed,
        chrono::Weekday::Thu => WeekdayKey::Thu,
        chrono::Weekday::Fri => WeekdayKey::Fri,
        chrono::Weekday::Sat => WeekdayKey::Sat,
        chrono::Weekday::Sun => WeekdayKey::Sun,
    }
}

/// Whole days from `from` to `deadline`. Zero or negative means due today or overdue.
pub fn days_until(deadline: NaiveDate, from: NaiveDate) -> i64 {
    (deadline - from).num_days()
}

/// The seven dates (Mon..Sun) of the week containing `today`, shifted by `week_offset` weeks.
///
/// Fails when the shifted week falls outside chrono's representable range.
pub fn week_dates(today: NaiveDate, week_offset: i64) -> Result<[NaiveDate; 7]> {
    let start = week_offset
        .checked_mul(7)
        .and_then(Duration::try_days)
        .and_then(|shift| start_of_week_monday(today).checked_add_signed(shift))
        .filter(|start| start.checked_add_signed(Duration::days(6)).is_some())
        .with_context(|| format!("week offset {week_offset} is out of range"))?;
    Ok(std::array::from_fn(|i| add_days(start, i as i64)))
}

/// Strict "HH:MM" parser returning minutes since midnight.
pub fn try_parse_time_of_day(s: &str) -> Result<u32> {
    let (h, m) = s
        .trim()
        .split_once(':')
        .with_context(|| format!("expected HH:MM, got '{s}'"))?;
    let h: u32 = h.trim().parse().with_context(|| format!("invalid hour in '{s}'"))?;
    let m: u32 = m.trim().parse().with_context(|| format!("invalid minute in '{s}'"))?;
    if h > 23 || m > 59 {
        anyhow::bail!("time out of range: '{s}'");
    }
    Ok(h * 60 + m)
}

/// Lenient "HH:MM" parser: malformed input falls back to [`DEFAULT_START_MINUTES`].
pub fn parse_time_of_day(s: &str) -> u32 {
    match try_parse_time_of_day(s) {
        Ok(minutes) => minutes,
        Err(err) => {
            tracing::warn!(input = s, %err, "unparseable time of day, using 19:00");
            DEFAULT_START_MINUTES
        }
    }
}

/// Render minutes since midnight as "HH:MM". Hours past 23 are not wrapped.
pub fn format_minutes_as_time(total_minutes: u32) -> String {
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn canonical_date_round_trips() {
        for date in [d(2026, 1, 5), d(2024, 2, 29), d(999, 12, 31), d(2026, 10, 19)] {
            let s = to_canonical_date(date);
            assert_eq!(parse_canonical_date(&s).unwrap(), date);
        }
        assert_eq!(to_canonical_date(d(2026, 3, 7)), "2026-03-07");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_canonical_date("2026-13-01").is_err());
        assert!(parse_canonical_date("yesterday").is_err());
        assert!(parse_canonical_date("").is_err());
    }

    #[test]
    fn weekday_keys_are_monday_first() {
        // 2026-10-19 is a Monday.
        let monday = d(2026, 10, 19);
        let keys: Vec<u8> = (0..7).map(|i| weekday_key(add_days(monday, i)).number()).collect();
        assert_eq!(keys, vec![1, 2, 3, 4, 5, 6, 7]);

        let sunday = add_days(monday, 6);
        assert_eq!(weekday_key(sunday), WeekdayKey::Sun);
        assert_eq!(weekday_key(add_days(sunday, 1)), WeekdayKey::Mon);
    }

    #[test]
    fn start_of_week() {
        let monday = d(2026, 10, 19);
        assert_eq!(start_of_week_monday(monday), monday);
        assert_eq!(start_of_week_monday(d(2026, 10, 25)), monday);
        assert_eq!(start_of_week_monday(d(2026, 10, 22)), monday);
        // Crosses a month boundary.
        assert_eq!(start_of_week_monday(d(2026, 11, 1)), d(2026, 10, 26));
    }

    #[test]
    fn add_days_handles_negative_and_month_edges() {
        assert_eq!(add_days(d(2026, 3, 1), -1), d(2026, 2, 28));
        assert_eq!(add_days(d(2024, 12, 31), 1), d(2025, 1, 1));
        assert_eq!(add_days(d(2026, 5, 5), 0), d(2026, 5, 5));
    }

    #[test]
    fn days_until_signs() {
        let today = d(2026, 10, 19);
        assert_eq!(days_until(today, today), 0);
        assert_eq!(days_until(d(2026, 10, 20), today), 1);
        assert_eq!(days_until(d(2026, 10, 10), today), -9);
    }

    #[test]
    fn week_dates_with_offset() {
        let week = week_dates(d(2026, 10, 22), 0).unwrap();
        assert_eq!(week[0], d(2026, 10, 19));
        assert_eq!(week[6], d(2026, 10, 25));

        let prev = week_dates(d(2026, 10, 22), -1).unwrap();
        assert_eq!(prev[0], d(2026, 10, 12));
    }

    #[test]
    fn week_dates_rejects_offsets_past_the_calendar() {
        let today = d(2026, 10, 19);
        assert!(week_dates(today, 1_000_000_000).is_err());
        assert!(week_dates(today, -1_000_000_000).is_err());
        assert!(week_dates(today, i64::MAX).is_err());
        assert!(week_dates(today, i64::MIN).is_err());
        assert_eq!(week_dates(today, 52).unwrap()[0], d(2027, 10, 18));
    }

    #[test]
    fn time_of_day_parsing() {
        assert_eq!(parse_time_of_day("19:00"), 1140);
        assert_eq!(parse_time_of_day("7:05"), 425);
        assert_eq!(parse_time_of_day("00:00"), 0);
        assert_eq!(parse_time_of_day("nope"), DEFAULT_START_MINUTES);
        assert_eq!(parse_time_of_day("25:00"), DEFAULT_START_MINUTES);
        assert_eq!(parse_time_of_day("12:xx"), DEFAULT_START_MINUTES);
        assert!(try_parse_time_of_day("12").is_err());
    }

    #[test]
    fn minutes_format() {
        assert_eq!(format_minutes_as_time(1140), "19:00");
        assert_eq!(format_minutes_as_time(1210), "20:10");
        assert_eq!(format_minutes_as_time(5), "00:05");
    }

    #[test]
    fn weekday_serde_is_numeric() {
        let json = serde_json::to_string(&WeekdayKey::Sun).unwrap();
        assert_eq!(json, "7");
        let back: WeekdayKey = serde_json::from_str("3").unwrap();
        assert_eq!(back, WeekdayKey::Wed);
        assert!(serde_json::from_str::<WeekdayKey>("8").is_err());
    }
}
