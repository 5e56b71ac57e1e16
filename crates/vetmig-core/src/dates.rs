//! Date parsing for the formats the source systems export.
//!
//! Exports mix ISO dates, ISO datetimes, and day-first Spanish-locale
//! forms, sometimes within one sheet. A value that matches none of the
//! known formats is not an error at this layer; the caller routes the
//! record to the excluded bucket.

use chrono::{NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Parses a cell value as a calendar date, trying each known format in
/// order. Datetime values are truncated to their date part.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }
    None
}

/// Formats a date the way the import files expect it.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date() {
        assert_eq!(
            parse_date("2023-01-15"),
            NaiveDate::from_ymd_opt(2023, 1, 15)
        );
    }

    #[test]
    fn parses_day_first_date() {
        assert_eq!(
            parse_date("15/01/2023"),
            NaiveDate::from_ymd_opt(2023, 1, 15)
        );
        assert_eq!(
            parse_date("15-01-2023"),
            NaiveDate::from_ymd_opt(2023, 1, 15)
        );
    }

    #[test]
    fn truncates_datetime_to_date() {
        assert_eq!(
            parse_date("2023-01-15 09:30:00"),
            NaiveDate::from_ymd_opt(2023, 1, 15)
        );
        assert_eq!(
            parse_date("15/01/2023 09:30"),
            NaiveDate::from_ymd_opt(2023, 1, 15)
        );
    }

    #[test]
    fn rejects_garbage_and_impossible_dates() {
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2023-13-40"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
    }

    #[test]
    fn formats_iso() {
        let date = NaiveDate::from_ymd_opt(2023, 3, 9).unwrap();
        assert_eq!(format_date(date), "2023-03-09");
    }
}
