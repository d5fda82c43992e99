//! Permissive publish-time parsing.
//!
//! Feeds disagree on timestamp layout: NewsAPI sends RFC 3339, RSS sends
//! RFC 2822, X sends RFC 3339 with milliseconds, and hand-fed records may carry
//! naive date-times, bare or compact dates, a bare year or epoch seconds. Anything that does not parse
//! becomes [`Published::Unknown`] instead of an error.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Offset-carrying layouts tried after RFC 3339 / RFC 2822.
const OFFSET_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S %z",
    "%a, %d %b %Y %H:%M:%S %z",
];

/// Layouts without an offset; interpreted as UTC.
const NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
];

const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d %b %Y", "%b %d, %Y"];

/// When an incident was published. `Unknown` orders below every real
/// timestamp, so a descending sort puts undated records last.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Published {
    #[default]
    Unknown,
    At(DateTime<Utc>),
}

impl Published {
    /// Total parse: absent, blank or unrecognised input yields `Unknown`.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| parse_timestamp(s.trim()))
            .map(Published::At)
            .unwrap_or(Published::Unknown)
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Published::At(dt) => Some(*dt),
            Published::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Published::At(_))
    }

    /// RFC 3339 for known timestamps, empty string otherwise. Used for flat files.
    pub fn to_column(&self) -> String {
        match self {
            Published::At(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
            Published::Unknown => String::new(),
        }
    }
}

impl fmt::Display for Published {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Published::At(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Published::Unknown => write!(f, "unknown"),
        }
    }
}

impl From<DateTime<Utc>> for Published {
    fn from(dt: DateTime<Utc>) -> Self {
        Published::At(dt)
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for layout in OFFSET_LAYOUTS {
        if let Ok(dt) = DateTime::parse_from_str(s, layout) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    // Trailing "Z" on an otherwise naive layout.
    let naive_input = s.strip_suffix('Z').unwrap_or(s);
    for layout in NAIVE_LAYOUTS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(naive_input, layout) {
            return Some(naive.and_utc());
        }
    }
    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(s, layout) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    parse_compact(s).or_else(|| parse_epoch(s))
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Separator-free forms: `YYYY`, `YYYYMMDD` and `YYYYMMDDTHHMMSS`.
fn parse_compact(s: &str) -> Option<DateTime<Utc>> {
    let (date, time) = match s.split_once('T') {
        Some((date, time)) => (date, Some(time.strip_suffix('Z').unwrap_or(time))),
        None => (s, None),
    };
    if !all_digits(date) || time.is_some_and(|t| t.len() != 6 || !all_digits(t)) {
        return None;
    }
    let num = |part: &str| part.parse::<u32>().ok();
    let day = match date.len() {
        4 if time.is_none() => NaiveDate::from_ymd_opt(date.parse().ok()?, 1, 1)?,
        8 => NaiveDate::from_ymd_opt(date[..4].parse().ok()?, num(&date[4..6])?, num(&date[6..])?)?,
        _ => return None,
    };
    let naive = match time {
        Some(t) => day.and_hms_opt(num(&t[..2])?, num(&t[2..4])?, num(&t[4..])?)?,
        None => day.and_hms_opt(0, 0, 0)?,
    };
    Some(naive.and_utc())
}

/// Unix epoch in seconds, or milliseconds when the value is too large to be
/// seconds. Shorter digit runs are dates or noise, not epochs.
fn parse_epoch(s: &str) -> Option<DateTime<Utc>> {
    if s.len() < 10 || !all_digits(s) {
        return None;
    }
    let value: i64 = s.parse().ok()?;
    if value >= 100_000_000_000 {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Published {
        Published::At(Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap())
    }

    #[test]
    fn rfc3339_with_zulu() {
        assert_eq!(
            Published::parse(Some("2024-01-02T10:00:00Z")),
            at(2024, 1, 2, 10, 0, 0)
        );
    }

    #[test]
    fn rfc3339_with_millis_and_offset() {
        assert_eq!(
            Published::parse(Some("2024-01-02T15:30:00.000+05:30")),
            at(2024, 1, 2, 10, 0, 0)
        );
    }

    #[test]
    fn rfc2822_from_rss() {
        assert_eq!(
            Published::parse(Some("Tue, 02 Jan 2024 15:30:00 +0530")),
            at(2024, 1, 2, 10, 0, 0)
        );
        assert_eq!(
            Published::parse(Some("Tue, 02 Jan 2024 10:00:00 GMT")),
            at(2024, 1, 2, 10, 0, 0)
        );
    }

    #[test]
    fn naive_datetime_assumed_utc() {
        assert_eq!(
            Published::parse(Some("2024-01-02 10:00:00")),
            at(2024, 1, 2, 10, 0, 0)
        );
        assert_eq!(
            Published::parse(Some("2024-01-02T10:00")),
            at(2024, 1, 2, 10, 0, 0)
        );
    }

    #[test]
    fn bare_date_is_midnight() {
        assert_eq!(Published::parse(Some("2024-01-02")), at(2024, 1, 2, 0, 0, 0));
    }

    #[test]
    fn epoch_seconds_and_millis() {
        assert_eq!(Published::parse(Some("1704189600")), at(2024, 1, 2, 10, 0, 0));
        assert_eq!(
            Published::parse(Some("1704189600000")),
            at(2024, 1, 2, 10, 0, 0)
        );
    }

    #[test]
    fn compact_dates_and_bare_year() {
        assert_eq!(Published::parse(Some("20240102")), at(2024, 1, 2, 0, 0, 0));
        assert_eq!(
            Published::parse(Some("20240102T100000")),
            at(2024, 1, 2, 10, 0, 0)
        );
        assert_eq!(
            Published::parse(Some("20240102T100000Z")),
            at(2024, 1, 2, 10, 0, 0)
        );
        assert_eq!(Published::parse(Some("2024")), at(2024, 1, 1, 0, 0, 0));
    }

    #[test]
    fn short_digit_runs_are_not_epochs() {
        assert_eq!(Published::parse(Some("12345")), Published::Unknown);
        assert_eq!(Published::parse(Some("20241345")), Published::Unknown);
        assert_eq!(Published::parse(Some("123456789")), Published::Unknown);
    }

    #[test]
    fn garbage_is_unknown() {
        assert_eq!(Published::parse(Some("yesterday-ish")), Published::Unknown);
        assert_eq!(Published::parse(Some("   ")), Published::Unknown);
        assert_eq!(Published::parse(Some("2024-13-45")), Published::Unknown);
        assert_eq!(Published::parse(None), Published::Unknown);
    }

    #[test]
    fn unknown_orders_below_every_timestamp() {
        let epoch = Published::At(DateTime::from_timestamp(0, 0).unwrap());
        assert!(Published::Unknown < epoch);
        assert!(at(2024, 1, 1, 0, 0, 0) < at(2024, 1, 2, 0, 0, 0));
    }

    #[test]
    fn column_form() {
        assert_eq!(at(2024, 1, 2, 10, 0, 0).to_column(), "2024-01-02T10:00:00Z");
        assert_eq!(Published::Unknown.to_column(), "");
    }
}
