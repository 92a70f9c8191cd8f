//! Date normalization into the API's `YYYY-MM-DD` form.
//!
//! Accepts calendar values directly, or strings in one of these shapes
//! (checked in this order):
//! - `YYYY-MM-DD`
//! - `YYYY/MM/DD`
//! - `MM-DD-YYYY` or `MM/DD/YYYY`
//! - `MM-DD` or `MM/DD` (year defaults to the current year)

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone};
use regex::Regex;

use crate::error::{Error, Result};

static YEAR_FIRST_DASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());
static YEAR_FIRST_SLASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})/(\d{1,2})/(\d{1,2})$").unwrap());
static YEAR_LAST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[-/](\d{1,2})[-/](\d{4})$").unwrap());
static NO_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[-/](\d{1,2})$").unwrap());

const INVALID_DATE: &str = "Invalid date entered. Please see docs for allowed formats.";

/// A date supplied to the query builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    /// A string in one of the accepted shapes.
    Preset(String),
    /// A value that already knows its calendar date.
    Date(NaiveDate),
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        Self::Preset(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        Self::Preset(value)
    }
}

impl From<&String> for DateInput {
    fn from(value: &String) -> Self {
        Self::Preset(value.clone())
    }
}

impl From<NaiveDate> for DateInput {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(value: NaiveDateTime) -> Self {
        Self::Date(value.date())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateInput {
    fn from(value: DateTime<Tz>) -> Self {
        Self::Date(value.date_naive())
    }
}

/// Normalizes a date into `YYYY-MM-DD`, defaulting missing years to the
/// current local year.
pub fn normalize(input: impl Into<DateInput>) -> Result<String> {
    normalize_with_year(input, Local::now().year())
}

/// Normalizes a date into `YYYY-MM-DD`, using `current_year` for shapes
/// that omit the year.
pub fn normalize_with_year(input: impl Into<DateInput>, current_year: i32) -> Result<String> {
    let date = match input.into() {
        DateInput::Date(date) => date,
        DateInput::Preset(text) => parse_preset(text.trim(), current_year)?,
    };
    Ok(date.format("%Y-%m-%d").to_string())
}

fn parse_preset(text: &str, current_year: i32) -> Result<NaiveDate> {
    let (year, month, day) = if let Some(caps) = YEAR_FIRST_DASH_RE
        .captures(text)
        .or_else(|| YEAR_FIRST_SLASH_RE.captures(text))
    {
        (number(&caps[1])?, number(&caps[2])?, number(&caps[3])?)
    } else if let Some(caps) = YEAR_LAST_RE.captures(text) {
        (number(&caps[3])?, number(&caps[1])?, number(&caps[2])?)
    } else if let Some(caps) = NO_YEAR_RE.captures(text) {
        (current_year, number(&caps[1])?, number(&caps[2])?)
    } else {
        return Err(Error::query(INVALID_DATE));
    };

    let month = u32::try_from(month).map_err(|_| Error::query(INVALID_DATE))?;
    let day = u32::try_from(day).map_err(|_| Error::query(INVALID_DATE))?;
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| Error::query(format!("{text} is not a valid calendar date")))
}

fn number(digits: &str) -> Result<i32> {
    digits.parse().map_err(|_| Error::query(INVALID_DATE))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;

    fn norm(input: &str) -> String {
        normalize_with_year(input, 2015).unwrap()
    }

    #[test]
    fn year_first_dash_passes_through() {
        assert_eq!(norm("2015-05-01"), "2015-05-01");
    }

    #[test]
    fn year_first_slash_is_dashed() {
        assert_eq!(norm("2015/05/01"), "2015-05-01");
    }

    #[test]
    fn month_day_year_is_reordered() {
        assert_eq!(norm("07/04/1776"), "1776-07-04");
        assert_eq!(norm("07-04-1776"), "1776-07-04");
    }

    #[test]
    fn month_day_uses_supplied_year() {
        assert_eq!(norm("07-04"), "2015-07-04");
        assert_eq!(norm("07/04"), "2015-07-04");
    }

    #[test]
    fn month_day_defaults_to_current_year() {
        let year = Local::now().year();
        assert_eq!(normalize("07-04").unwrap(), format!("{year}-07-04"));
    }

    #[test]
    fn single_digit_parts_are_zero_padded() {
        assert_eq!(norm("2015-5-1"), "2015-05-01");
        assert_eq!(norm("7/4/1776"), "1776-07-04");
        assert_eq!(norm("7-4"), "2015-07-04");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(norm("  2015-05-01\n"), "2015-05-01");
    }

    #[test]
    fn calendar_values_render_directly() {
        let date = NaiveDate::from_ymd_opt(1776, 7, 4).unwrap();
        assert_eq!(normalize(date).unwrap(), "1776-07-04");

        let datetime = Utc.with_ymd_and_hms(2015, 5, 1, 23, 59, 0).unwrap();
        assert_eq!(normalize(datetime).unwrap(), "2015-05-01");

        let naive = date.and_hms_opt(8, 30, 0).unwrap();
        assert_eq!(normalize(naive).unwrap(), "1776-07-04");
    }

    #[test]
    fn unrecognized_text_is_an_invalid_query() {
        let err = normalize("not a date").unwrap_err();
        assert!(matches!(err, Error::InvalidQuery { .. }));
        assert!(err.to_string().contains("Invalid date"));
    }

    #[test]
    fn impossible_calendar_dates_are_rejected() {
        for input in ["2015-02-30", "13/01/2015", "00-10"] {
            let err = normalize_with_year(input, 2015).unwrap_err();
            assert!(matches!(err, Error::InvalidQuery { .. }), "{input}");
        }
    }

    #[test]
    fn partial_matches_are_rejected() {
        for input in ["2015-05-01T10:00:00", "x07/04", "2015-05", "1776/07/04/01"] {
            assert!(normalize_with_year(input, 2015).is_err(), "{input}");
        }
    }
}
