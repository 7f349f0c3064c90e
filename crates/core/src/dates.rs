//! Date keys, display dates and timestamps.
//!
//! - Daily keys are `YYYY-MM-DD` in the configured civil offset (KST by default), so a
//!   briefing published at 00:30 KST lands on the Korean calendar day.
//! - Display dates are Korean: `2026년 10월 19일 (월)`.
//! - `generatedAt` timestamps are UTC RFC 3339 with microseconds and a `+00:00` offset.

use crate::error::{PublishError, PublishResult};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, SecondsFormat, Utc, Weekday};
use std::fmt;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Canonical `YYYY-MM-DD` key for the civil day containing `now` at `offset`.
pub fn date_key(now: DateTime<Utc>, offset: FixedOffset) -> String {
    now.with_timezone(&offset).format(DATE_KEY_FORMAT).to_string()
}

/// Parses a daily key. Returns `None` for anything that is not a valid calendar date.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).ok()
}

fn korean_weekday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "월",
        Weekday::Tue => "화",
        Weekday::Wed => "수",
        Weekday::Thu => "목",
        Weekday::Fri => "금",
        Weekday::Sat => "토",
        Weekday::Sun => "일",
    }
}

/// Human-readable Korean date used when the caller does not supply one.
pub fn display_date(now: DateTime<Utc>, offset: FixedOffset) -> String {
    let local = now.with_timezone(&offset);
    format!(
        "{} ({})",
        local.format("%Y년 %m월 %d일"),
        korean_weekday(local.weekday())
    )
}

/// `generatedAt` value for a record written at `now`.
pub fn generated_at(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// A calendar month key, always rendered as `YYYY-MM`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> PublishResult<Self> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return Err(PublishError::InvalidMonth(format!("{}-{}", year, month)));
        }
        Ok(Self { year, month })
    }

    /// Parses `YYYY-MM` or `YYYY-M`; the month is zero-padded on output.
    pub fn parse(value: &str) -> PublishResult<Self> {
        let invalid = || PublishError::InvalidMonth(value.to_string());

        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(invalid());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }

    /// Prefix shared by every daily key of this month, e.g. `2026-10`.
    pub fn key_prefix(&self) -> String {
        self.to_string()
    }

    pub fn contains(&self, date_key: &str) -> bool {
        date_key.starts_with(&self.key_prefix())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn kst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    #[test]
    fn test_date_key_uses_civil_offset() {
        // 2026-10-18 16:30 UTC is 2026-10-19 01:30 KST.
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 16, 30, 0).unwrap();
        assert_eq!(date_key(now, kst()), "2026-10-19");
        assert_eq!(date_key(now, FixedOffset::east_opt(0).unwrap()), "2026-10-18");
    }

    #[test]
    fn test_display_date_is_korean_with_weekday() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 16, 30, 0).unwrap();
        assert_eq!(display_date(now, kst()), "2026년 10월 19일 (월)");
    }

    #[test]
    fn test_generated_at_has_micros_and_offset() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 0, 30, 5).unwrap();
        assert_eq!(generated_at(now), "2026-10-19T00:30:05.000000+00:00");
    }

    #[test]
    fn test_parse_date_key_rejects_garbage() {
        assert_eq!(
            parse_date_key("2020-01-01"),
            NaiveDate::from_ymd_opt(2020, 1, 1)
        );
        assert_eq!(parse_date_key("not-a-date"), None);
        assert_eq!(parse_date_key("2020-02-30"), None);
    }

    #[test]
    fn test_year_month_normalises_single_digit_month() {
        let ym = YearMonth::parse("2026-3").expect("should parse");
        assert_eq!(ym.to_string(), "2026-03");
        assert!(ym.contains("2026-03-15"));
        assert!(!ym.contains("2026-10-15"));
    }

    #[test]
    fn test_year_month_rejects_invalid_values() {
        for bad in ["2026", "2026-13", "2026-00", "26-01", "2026-1a", "2026-10-01", ""] {
            assert!(
                matches!(YearMonth::parse(bad), Err(PublishError::InvalidMonth(_))),
                "{bad} should be rejected"
            );
        }
    }
}
