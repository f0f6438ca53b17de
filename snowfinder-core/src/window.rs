//! Closed, recurring calendar windows.
//!
//! A window is two [`MonthDay`] bounds, both inclusive. When `end` comes
//! before `start` in calendar order the window wraps the year boundary:
//! `12-28..01-05` covers the last four days of December and the first five
//! of January.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::month_day::MonthDay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CalendarWindow {
    start: MonthDay,
    end: MonthDay,
}

impl CalendarWindow {
    /// Build a window from its bounds. An omitted `end` means a single day.
    pub fn normalize(start: MonthDay, end: Option<MonthDay>) -> Self {
        Self {
            start,
            end: end.unwrap_or(start),
        }
    }

    pub fn start(&self) -> MonthDay {
        self.start
    }

    pub fn end(&self) -> MonthDay {
        self.end
    }

    /// True when the window spans New Year's Eve.
    pub fn wraps_year(&self) -> bool {
        self.start > self.end
    }

    /// Membership test for a year-agnostic day.
    pub fn contains(&self, day: MonthDay) -> bool {
        if self.wraps_year() {
            day >= self.start || day <= self.end
        } else {
            self.start <= day && day <= self.end
        }
    }

    pub fn contains_date(&self, date: &NaiveDate) -> bool {
        self.contains(MonthDay::of_date(date))
    }

    /// The season a matching date is counted under.
    ///
    /// Non-wrapping windows occur once per calendar year. For a wrapping
    /// window the January tail belongs to the occurrence that started the
    /// previous December. Returns `None` when the date is outside the window.
    pub fn season_of(&self, date: &NaiveDate) -> Option<i32> {
        let day = MonthDay::of_date(date);
        if !self.contains(day) {
            return None;
        }
        if self.wraps_year() && day <= self.end {
            Some(date.year() - 1)
        } else {
            Some(date.year())
        }
    }
}

impl fmt::Display for CalendarWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn md(s: &str) -> MonthDay {
        s.parse().unwrap()
    }

    fn window(start: &str, end: &str) -> CalendarWindow {
        CalendarWindow::normalize(md(start), Some(md(end)))
    }

    #[test]
    fn omitted_end_is_a_single_day() {
        let w = CalendarWindow::normalize(md("02-08"), None);
        assert_eq!(w.start(), w.end());
        assert!(w.contains(md("02-08")));
        assert!(!w.contains(md("02-09")));
    }

    #[test]
    fn plain_window_is_inclusive() {
        let w = window("02-08", "02-14");
        assert!(!w.wraps_year());
        assert!(w.contains(md("02-08")));
        assert!(w.contains(md("02-11")));
        assert!(w.contains(md("02-14")));
        assert!(!w.contains(md("02-07")));
        assert!(!w.contains(md("02-15")));
    }

    #[test]
    fn wrapping_window_spans_new_year() {
        let w = window("12-28", "01-05");
        assert!(w.wraps_year());
        assert!(w.contains(md("12-28")));
        assert!(w.contains(md("12-31")));
        assert!(w.contains(md("01-02")));
        assert!(w.contains(md("01-05")));
        assert!(!w.contains(md("06-15")));
        assert!(!w.contains(md("12-27")));
        assert!(!w.contains(md("01-06")));
    }

    #[test]
    fn bounds_are_always_members() {
        for (s, e) in [("01-01", "12-31"), ("12-31", "01-01"), ("03-15", "03-15"), ("11-01", "02-29")] {
            let w = window(s, e);
            assert!(w.contains(w.start()), "{} in {}", s, w);
            assert!(w.contains(w.end()), "{} in {}", e, w);
        }
    }

    #[test]
    fn contains_date_ignores_year() {
        let w = window("12-28", "01-05");
        let d1 = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let d3 = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert!(w.contains_date(&d1));
        assert!(w.contains_date(&d2));
        assert!(!w.contains_date(&d3));
    }

    #[test]
    fn season_of_groups_wrapping_tail_with_previous_december() {
        let w = window("12-28", "01-05");
        let dec = NaiveDate::from_ymd_opt(2022, 12, 30).unwrap();
        let jan = NaiveDate::from_ymd_opt(2023, 1, 3).unwrap();
        assert_eq!(w.season_of(&dec), Some(2022));
        assert_eq!(w.season_of(&jan), Some(2022));
        assert_eq!(w.season_of(&NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()), None);

        let plain = window("02-08", "02-14");
        let feb = NaiveDate::from_ymd_opt(2023, 2, 10).unwrap();
        assert_eq!(plain.season_of(&feb), Some(2023));
    }

    #[test]
    fn display_formats_bounds() {
        assert_eq!(window("02-08", "02-14").to_string(), "02-08..02-14");
        assert_eq!(CalendarWindow::normalize(md("02-08"), None).to_string(), "02-08");
    }
}
