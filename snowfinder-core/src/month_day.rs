//! Year-agnostic `MM-DD` calendar days.
//!
//! Validity is about calendar shape, not a concrete year: February always
//! has 29 days here so that `02-29` is accepted as a leap-day label even
//! though most seasons never had one.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Days per month, indexed by `month - 1`. February is fixed at 29.
const DAYS_IN_MONTH: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Number of days a month may hold, or `None` for a month outside 1..=12.
pub fn days_in_month(month: u32) -> Option<u32> {
    if (1..=12).contains(&month) {
        Some(DAYS_IN_MONTH[(month - 1) as usize])
    } else {
        None
    }
}

/// Failure to read an `MM-DD` string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonthDayError {
    /// Not five ASCII characters shaped `DD-DD`.
    #[error("expected MM-DD, got {0:?}")]
    Format(String),

    /// Month outside 1..=12.
    #[error("month {0} is out of range")]
    Month(u32),

    /// Day outside the month's length.
    #[error("day {day} is out of range for month {month}")]
    Day { month: u32, day: u32 },
}

/// A calendar day without a year. Ordering is month, then day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    /// Build a month-day, checking it against the fixed month-length table.
    pub fn new(month: u32, day: u32) -> Result<Self, MonthDayError> {
        let max_day = days_in_month(month).ok_or(MonthDayError::Month(month))?;
        if day < 1 || day > max_day {
            return Err(MonthDayError::Day { month, day });
        }
        Ok(Self { month, day })
    }

    /// Parse a strict `MM-DD` string: exactly two digits, a dash, two digits.
    /// Signs and whitespace are rejected, so `+1-05` and ` 1-05` are not months.
    pub fn parse(s: &str) -> Result<Self, MonthDayError> {
        let bytes = s.as_bytes();
        if bytes.len() != 5 || bytes[2] != b'-' {
            return Err(MonthDayError::Format(s.to_string()));
        }
        let month = two_digits(bytes[0], bytes[1]).ok_or_else(|| MonthDayError::Format(s.to_string()))?;
        let day = two_digits(bytes[3], bytes[4]).ok_or_else(|| MonthDayError::Format(s.to_string()))?;
        Self::new(month, day)
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// The month-day of a concrete date.
    pub fn of_date(date: &NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }
}

fn two_digits(hi: u8, lo: u8) -> Option<u32> {
    if hi.is_ascii_digit() && lo.is_ascii_digit() {
        Some(u32::from(hi - b'0') * 10 + u32::from(lo - b'0'))
    } else {
        None
    }
}

/// Returns true when `month_day` is a well-formed `MM-DD` naming a day that
/// can exist in some year.
pub fn is_valid_month_day(month_day: &str) -> bool {
    MonthDay::parse(month_day).is_ok()
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

impl FromStr for MonthDay {
    type Err = MonthDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for MonthDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        MonthDay::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_every_day_of_the_fixed_calendar() {
        let mut accepted = 0;
        for month in 1..=12 {
            for day in 1..=31 {
                let s = format!("{:02}-{:02}", month, day);
                if is_valid_month_day(&s) {
                    accepted += 1;
                    assert!(day <= days_in_month(month).unwrap(), "{} accepted", s);
                } else {
                    assert!(day > days_in_month(month).unwrap(), "{} rejected", s);
                }
            }
        }
        // 365 days plus the leap-day label
        assert_eq!(accepted, 366);
    }

    #[test]
    fn leap_day_is_always_valid() {
        assert!(is_valid_month_day("02-29"));
        assert!(!is_valid_month_day("02-30"));
    }

    #[test]
    fn rejects_malformed_strings() {
        for bad in ["13-01", "00-10", "01-00", "2-08", "02/08", "02-8", "", "02-081", "ab-cd", "+1-01", "01-+1", " 1-01", "é-01"] {
            assert!(!is_valid_month_day(bad), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn month_days_that_do_not_exist_are_rejected() {
        for bad in ["04-31", "06-31", "09-31", "11-31"] {
            assert_eq!(
                MonthDay::parse(bad),
                Err(MonthDayError::Day {
                    month: bad[0..2].parse().unwrap(),
                    day: 31
                })
            );
        }
    }

    #[test]
    fn out_of_range_month_reports_month() {
        assert_eq!(MonthDay::parse("13-01"), Err(MonthDayError::Month(13)));
    }

    #[test]
    fn display_is_zero_padded() {
        let md = MonthDay::new(2, 8).unwrap();
        assert_eq!(md.to_string(), "02-08");
        assert_eq!("02-08".parse::<MonthDay>().unwrap(), md);
    }

    #[test]
    fn ordering_is_month_then_day() {
        let dec28 = MonthDay::new(12, 28).unwrap();
        let jan05 = MonthDay::new(1, 5).unwrap();
        let jan31 = MonthDay::new(1, 31).unwrap();
        let feb01 = MonthDay::new(2, 1).unwrap();
        assert!(jan05 < jan31);
        assert!(jan31 < feb01);
        assert!(feb01 < dec28);
    }

    #[test]
    fn of_date_drops_the_year() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(MonthDay::of_date(&date), MonthDay::new(2, 29).unwrap());
    }

    #[test]
    fn serde_uses_the_mm_dd_string() {
        let md = MonthDay::new(12, 31).unwrap();
        assert_eq!(serde_json::to_string(&md).unwrap(), "\"12-31\"");
        let back: MonthDay = serde_json::from_str("\"12-31\"").unwrap();
        assert_eq!(back, md);
        assert!(serde_json::from_str::<MonthDay>("\"12-32\"").is_err());
    }
}
