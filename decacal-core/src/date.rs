//! Date value types for the custom calendar.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A date in the custom calendar. Months are 0-based, days 1-based.
///
/// Bounds depend on the configured [`CalendarSpec`](crate::calendar::CalendarSpec),
/// so construct checked dates through `CalendarSpec::date` or run
/// `CalendarSpec::validate` on values that come from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CustomDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CustomDate {
    /// Key used by the local layout: `"{year}-{month}-{day}"`.
    pub fn date_key(&self) -> String {
        format!("{}-{}-{}", self.year, self.month, self.day)
    }

    /// Key of the month this date falls in: `"{year}-{month}"`.
    pub fn month_key(&self) -> String {
        month_key(self.year, self.month)
    }

    pub fn cursor(&self) -> MonthCursor {
        MonthCursor {
            year: self.year,
            month: self.month,
        }
    }
}

impl fmt::Display for CustomDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.date_key())
    }
}

pub fn month_key(year: i32, month: u32) -> String {
    format!("{}-{}", year, month)
}

/// Direction of month navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// A viewed (year, month) position.
///
/// The navigator hands these out so that a caller can tell whether the
/// result of a slow fetch still belongs to the month on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthCursor {
    pub year: i32,
    pub month: u32,
}

impl MonthCursor {
    pub fn key(&self) -> String {
        month_key(self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        let date = CustomDate {
            year: 2025,
            month: 2,
            day: 12,
        };
        assert_eq!(date.date_key(), "2025-2-12");
        assert_eq!(date.month_key(), "2025-2");
        assert_eq!(date.cursor().key(), "2025-2");
    }

    #[test]
    fn test_dates_order_by_year_then_month_then_day() {
        let a = CustomDate { year: 2024, month: 9, day: 30 };
        let b = CustomDate { year: 2025, month: 0, day: 1 };
        let c = CustomDate { year: 2025, month: 0, day: 2 };
        assert!(a < b);
        assert!(b < c);
    }
}
