//! Season week computation
//!
//! The badge calendar runs for [`SEASON_WEEKS`] weeks from a fixed September
//! anchor date. Week 0 means "program not yet started" and never earns a
//! badge; dates past the last week clamp to the final week.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number of badge weeks in a season.
pub const SEASON_WEEKS: u8 = 39;

/// Month in which a season starts.
const ANCHOR_MONTH: u32 = 9;
/// Day of [`ANCHOR_MONTH`] on which week 1 begins.
const ANCHOR_DAY: u32 = 1;

/// Maps calendar dates to season week numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonCalendar {
    start: NaiveDate,
}

impl SeasonCalendar {
    pub fn new(start: NaiveDate) -> Self {
        Self { start }
    }

    /// Calendar anchored at September 1 of the school year containing `today`:
    /// from September onward that is the current year, before it the previous.
    pub fn inferred(today: NaiveDate) -> Self {
        let year = if today.month() >= ANCHOR_MONTH {
            today.year()
        } else {
            today.year() - 1
        };
        let start = NaiveDate::from_ymd_opt(year, ANCHOR_MONTH, ANCHOR_DAY)
            .expect("September 1 exists in every year");
        Self { start }
    }

    /// Calendar for the school year that contains the current local date.
    pub fn for_today() -> Self {
        Self::inferred(Local::now().date_naive())
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Season week for a date, clamped to `[0, SEASON_WEEKS]`.
    pub fn week_for(&self, date: NaiveDate) -> u8 {
        if date < self.start {
            return 0;
        }
        let days = (date - self.start).num_days();
        let week = days / 7 + 1;
        week.min(i64::from(SEASON_WEEKS)) as u8
    }

    /// Season week for the current local date.
    pub fn current_week(&self) -> u8 {
        self.week_for(Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_zero_before_start() {
        let cal = SeasonCalendar::new(date(2025, 9, 1));
        assert_eq!(cal.week_for(date(2025, 8, 31)), 0);
        assert_eq!(cal.week_for(date(2025, 6, 1)), 0);
    }

    #[test]
    fn test_week_boundaries() {
        let cal = SeasonCalendar::new(date(2025, 9, 1));
        assert_eq!(cal.week_for(date(2025, 9, 1)), 1);
        assert_eq!(cal.week_for(date(2025, 9, 7)), 1);
        assert_eq!(cal.week_for(date(2025, 9, 8)), 2);
        assert_eq!(cal.week_for(date(2025, 9, 15)), 3);
    }

    #[test]
    fn test_week_clamps_at_season_end() {
        let cal = SeasonCalendar::new(date(2025, 9, 1));
        // Week 39 runs through the end of May; later dates stay at 39.
        assert_eq!(cal.week_for(date(2026, 5, 31)), 39);
        assert_eq!(cal.week_for(date(2026, 8, 1)), 39);
    }

    #[test]
    fn test_inferred_school_year() {
        assert_eq!(
            SeasonCalendar::inferred(date(2025, 10, 3)).start(),
            date(2025, 9, 1)
        );
        assert_eq!(
            SeasonCalendar::inferred(date(2026, 2, 14)).start(),
            date(2025, 9, 1)
        );
        assert_eq!(
            SeasonCalendar::inferred(date(2026, 9, 1)).start(),
            date(2026, 9, 1)
        );
    }
}
