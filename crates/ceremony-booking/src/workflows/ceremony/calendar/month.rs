use chrono::{Datelike, NaiveDate};
use std::fmt;

/// A month of the facility calendar, always holding a valid first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first_day: NaiveDate,
}

impl YearMonth {
    /// Returns `None` for an out-of-range year or a month outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(self) -> i32 {
        self.first_day.year()
    }

    pub fn month(self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(self) -> NaiveDate {
        self.first_day
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        Self::containing(date) == self
    }

    /// Every calendar day of the month, in order.
    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        let month = self.month();
        std::iter::successors(Some(self.first_day), |day| day.succ_opt())
            .take_while(move |day| day.month() == month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year(), self.month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_months() {
        assert!(YearMonth::new(2025, 0).is_none());
        assert!(YearMonth::new(2025, 13).is_none());
        assert!(YearMonth::new(2025, 12).is_some());
    }

    #[test]
    fn days_cover_the_whole_month() {
        let february = YearMonth::new(2028, 2).expect("valid month");
        let days: Vec<NaiveDate> = february.days().collect();
        assert_eq!(days.len(), 29);
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2028, 2, 1).expect("valid"));
        assert_eq!(days[28], NaiveDate::from_ymd_opt(2028, 2, 29).expect("valid"));
    }

    #[test]
    fn orders_across_year_boundaries() {
        let december = YearMonth::new(2025, 12).expect("valid month");
        let january = YearMonth::new(2026, 1).expect("valid month");
        assert!(december < january);
        assert_eq!(december.to_string(), "2025-12");
        assert!(january.contains(NaiveDate::from_ymd_opt(2026, 1, 31).expect("valid")));
    }
}
