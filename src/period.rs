// 📅 Calendar periods - week/month boundaries for grouping
//
// Dates are plain calendar days (`NaiveDate`), so there is no timezone to
// drift across a boundary. Weeks run Monday..Sunday.

use crate::error::{Error, Result};
use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// GROUP BY
// ============================================================================

/// Period granularity of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// Whole series is one period
    #[default]
    None,
    Week,
    Month,
}

impl GroupBy {
    pub const ALL: [GroupBy; 3] = [GroupBy::None, GroupBy::Week, GroupBy::Month];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::None => "none",
            GroupBy::Week => "week",
            GroupBy::Month => "month",
        }
    }

    /// Start of the period containing `date` (`None` keeps the date itself)
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            GroupBy::None => date,
            GroupBy::Week => week_start(date),
            GroupBy::Month => month_start(date),
        }
    }

    /// Last day of the period containing `date`
    pub fn period_end(&self, date: NaiveDate) -> NaiveDate {
        match self {
            GroupBy::None => date,
            GroupBy::Week => week_end(date),
            GroupBy::Month => month_end(date),
        }
    }
}

impl FromStr for GroupBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        GroupBy::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| Error::InvalidGroupBy(s.to_string()))
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// BOUNDARIES
// ============================================================================

/// Monday of the week containing `date`. Sunday counts as day 7.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let day = date.weekday().number_from_monday() as i64;
    date - Duration::days(day - 1)
}

/// Sunday of the week containing `date`
pub fn week_end(date: NaiveDate) -> NaiveDate {
    let day = date.weekday().number_from_monday() as i64;
    date + Duration::days(7 - day)
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

pub fn month_end(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

// ============================================================================
// FORMATS
// ============================================================================

/// Strict `YYYY-MM-DD`
pub fn parse_iso_date(text: &str) -> Result<NaiveDate> {
    let bytes = text.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return Err(Error::InvalidDate(text.to_string()));
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| Error::InvalidDate(text.to_string()))
}

pub fn to_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// "January 2024", or "Jan 2024" when `long_hand` is false
pub fn month_and_year(date: NaiveDate, long_hand: bool) -> String {
    if long_hand {
        date.format("%B %Y").to_string()
    } else {
        date.format("%b %Y").to_string()
    }
}

/// "dd-MM-yyyy"
pub fn standard_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_iso_date(s).unwrap()
    }

    #[test]
    fn test_week_boundaries() {
        // 2024-03-04 is a Monday
        assert_eq!(week_start(d("2024-03-04")), d("2024-03-04"));
        assert_eq!(week_start(d("2024-03-06")), d("2024-03-04"));
        assert_eq!(week_end(d("2024-03-06")), d("2024-03-10"));
    }

    #[test]
    fn test_sunday_belongs_to_preceding_monday() {
        let sunday = d("2024-03-10");
        assert_eq!(week_start(sunday), d("2024-03-04"));
        assert_eq!(week_end(sunday), sunday);
    }

    #[test]
    fn test_week_across_year_boundary() {
        // 2025-01-01 is a Wednesday
        assert_eq!(week_start(d("2025-01-01")), d("2024-12-30"));
        assert_eq!(week_end(d("2024-12-30")), d("2025-01-05"));
    }

    #[test]
    fn test_month_boundaries() {
        assert_eq!(month_start(d("2024-02-17")), d("2024-02-01"));
        assert_eq!(month_end(d("2024-02-17")), d("2024-02-29"), "leap year");
        assert_eq!(month_end(d("2023-02-01")), d("2023-02-28"));
        assert_eq!(month_end(d("2024-12-31")), d("2024-12-31"));
    }

    #[test]
    fn test_group_by_periods() {
        let date = d("2024-05-15");
        assert_eq!(GroupBy::Week.period_start(date), d("2024-05-13"));
        assert_eq!(GroupBy::Month.period_end(date), d("2024-05-31"));
        assert_eq!(GroupBy::None.period_start(date), date);
    }

    #[test]
    fn test_group_by_from_str() {
        assert_eq!("week".parse::<GroupBy>(), Ok(GroupBy::Week));
        assert_eq!("none".parse::<GroupBy>(), Ok(GroupBy::None));
        assert_eq!(
            "day".parse::<GroupBy>(),
            Err(Error::InvalidGroupBy("day".to_string()))
        );
        assert_eq!(GroupBy::Month.to_string(), "month");
    }

    #[test]
    fn test_parse_iso_date() {
        assert!(parse_iso_date("2024-01-15").is_ok());
        assert!(parse_iso_date("2024-1-15").is_err());
        assert!(parse_iso_date("2024-02-30").is_err());
        assert!(parse_iso_date("01/15/2024").is_err());
        assert!(parse_iso_date("2024-01-15T00:00:00Z").is_err());
    }

    #[test]
    fn test_formats() {
        let date = d("2024-01-05");
        assert_eq!(to_iso_date(date), "2024-01-05");
        assert_eq!(month_and_year(date, true), "January 2024");
        assert_eq!(month_and_year(date, false), "Jan 2024");
        assert_eq!(standard_date(date), "05-01-2024");
    }
}
