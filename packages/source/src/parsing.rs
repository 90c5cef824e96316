//! Date parsing for heterogeneous intake records.
//!
//! Sources carry ISO timestamps, US-style `MM/DD/YYYY` dates, long month
//! names and epoch milliseconds. Naive values are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone as _, Utc};
use serde_json::Value;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
];

/// Parses a resolved date value.
///
/// Strings go through [`parse_date_str`]; numbers are epoch milliseconds.
#[must_use]
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_str(s),
        Value::Number(n) => {
            #[allow(clippy::cast_possible_truncation)]
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            Utc.timestamp_millis_opt(millis).single()
        }
        _ => None,
    }
}

/// Parses a date string in any of the supported shapes.
#[must_use]
pub fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    parse_partial(s)
}

/// `YYYY-MM` and bare `YYYY`, anchored at the first day.
fn parse_partial(s: &str) -> Option<DateTime<Utc>> {
    let (year, month) = match s.split_once('-') {
        Some((y, m)) if y.len() == 4 && (1..=2).contains(&m.len()) => (y, m),
        Some(_) => return None,
        None if s.len() == 4 => (s, "1"),
        None => return None,
    };
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
}

/// ISO `YYYY-MM-DD` rendering of a parsed date.
#[must_use]
pub fn iso_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ymd(s: &str) -> String {
        iso_date(&parse_date_str(s).unwrap())
    }

    #[test]
    fn parses_iso_dates_and_timestamps() {
        assert_eq!(ymd("2023-05-01"), "2023-05-01");
        assert_eq!(ymd("2024-01-15T14:30:00.000"), "2024-01-15");
        assert_eq!(ymd("2024-01-15T14:30:00"), "2024-01-15");
        assert_eq!(ymd("2024-01-15 14:30:00"), "2024-01-15");
        assert_eq!(ymd("2024-01-15T14:30:00Z"), "2024-01-15");
    }

    #[test]
    fn offsets_are_converted_to_utc() {
        let dt = parse_date_str("2023-01-01T00:30:00+02:00").unwrap();
        assert_eq!(dt.to_string(), "2022-12-31 22:30:00 UTC");
    }

    #[test]
    fn parses_us_and_long_forms() {
        assert_eq!(ymd("05/21/2019"), "2019-05-21");
        assert_eq!(ymd("05/21/2019 03:15:00 PM"), "2019-05-21");
        assert_eq!(ymd("March 3, 2022"), "2022-03-03");
        assert_eq!(ymd("Mar 3, 2022"), "2022-03-03");
        assert_eq!(ymd("3 March 2022"), "2022-03-03");
    }

    #[test]
    fn parses_partial_dates() {
        assert_eq!(ymd("2021-07"), "2021-07-01");
        assert_eq!(ymd("2021"), "2021-01-01");
        assert!(parse_date_str("2021-13").is_none());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_date_str("garbage").is_none());
        assert!(parse_date_str("").is_none());
        assert!(parse_date_str("   ").is_none());
        assert!(parse_date_str("2023-02-30").is_none());
    }

    #[test]
    fn epoch_millis_and_non_strings() {
        assert_eq!(
            parse_date(&json!(1_685_577_600_000_i64)).map(|d| iso_date(&d)),
            Some("2023-06-01".to_string())
        );
        assert!(parse_date(&Value::Null).is_none());
        assert!(parse_date(&json!(true)).is_none());
        assert!(parse_date(&json!(["2023-01-01"])).is_none());
    }
}
