//! Calendar arithmetic over the configured custom calendar.
//!
//! Everything here is pure: weekday lookup, date validation and month
//! rollover. The month grid lives in [`crate::grid`].

use crate::date::{CustomDate, Direction};
use crate::error::{DateError, DecacalError, DecacalResult};

pub const DEFAULT_WEEKDAY_NAMES: [&str; 10] = [
    "Peppermint Patty Day",
    "Bing Bong Day",
    "Wednesday",
    "Chewsday",
    "Mustang Day",
    "Second Wednesday",
    "Skip Day",
    "Second Chewsday",
    "Sabbath",
    "Loin Cloth Day",
];

pub const DEFAULT_MONTH_NAMES: [&str; 10] = [
    "Revan",
    "Juno",
    "Justin Thyme",
    "Plato",
    "Olivia Newton John",
    "Palmetto",
    "Juice Daddy",
    "Retrograde",
    "Blizzrock",
    "Challenger",
];

pub const DEFAULT_DAYS_PER_MONTH: u32 = 30;

/// The shape of the custom calendar: weekday cycle, month names and
/// month length. Days per week and months per year follow from the
/// name lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarSpec {
    weekday_names: Vec<String>,
    month_names: Vec<String>,
    days_per_month: u32,
}

impl Default for CalendarSpec {
    fn default() -> Self {
        CalendarSpec {
            weekday_names: DEFAULT_WEEKDAY_NAMES.iter().map(|s| s.to_string()).collect(),
            month_names: DEFAULT_MONTH_NAMES.iter().map(|s| s.to_string()).collect(),
            days_per_month: DEFAULT_DAYS_PER_MONTH,
        }
    }
}

impl CalendarSpec {
    pub fn new(
        weekday_names: Vec<String>,
        month_names: Vec<String>,
        days_per_month: u32,
    ) -> DecacalResult<Self> {
        if weekday_names.is_empty() {
            return Err(DecacalError::Config("weekday_names must not be empty".into()));
        }
        if month_names.is_empty() {
            return Err(DecacalError::Config("month_names must not be empty".into()));
        }
        if days_per_month == 0 {
            return Err(DecacalError::Config("days_per_month must be at least 1".into()));
        }

        // Month names double as CLI input, so they must be unambiguous.
        for (i, name) in month_names.iter().enumerate() {
            if month_names[..i]
                .iter()
                .any(|other| other.eq_ignore_ascii_case(name))
            {
                return Err(DecacalError::Config(format!(
                    "Duplicate month name '{}'",
                    name
                )));
            }
        }

        Ok(CalendarSpec {
            weekday_names,
            month_names,
            days_per_month,
        })
    }

    pub fn days_per_week(&self) -> u32 {
        self.weekday_names.len() as u32
    }

    pub fn days_per_month(&self) -> u32 {
        self.days_per_month
    }

    pub fn months_per_year(&self) -> u32 {
        self.month_names.len() as u32
    }

    pub fn weekday_names(&self) -> &[String] {
        &self.weekday_names
    }

    pub fn month_names(&self) -> &[String] {
        &self.month_names
    }

    /// Weekday name of a day of month. Depends on the day alone, so day 1
    /// of every month is the first weekday.
    pub fn weekday_name_of(&self, day: u32) -> Result<&str, DateError> {
        if day < 1 {
            return Err(DateError::DayOutOfRange {
                day,
                max: self.days_per_month,
            });
        }
        let index = ((day - 1) % self.days_per_week()) as usize;
        Ok(&self.weekday_names[index])
    }

    pub fn month_name_of(&self, month: u32) -> Result<&str, DateError> {
        self.month_names
            .get(month as usize)
            .map(String::as_str)
            .ok_or(DateError::MonthOutOfRange {
                month,
                max: self.months_per_year() - 1,
            })
    }

    /// Case-insensitive month lookup by name.
    pub fn month_index_of(&self, name: &str) -> Option<u32> {
        let name = name.trim();
        self.month_names
            .iter()
            .position(|m| m.eq_ignore_ascii_case(name))
            .map(|i| i as u32)
    }

    pub fn validate_month(&self, month: u32) -> Result<(), DateError> {
        if month >= self.months_per_year() {
            return Err(DateError::MonthOutOfRange {
                month,
                max: self.months_per_year() - 1,
            });
        }
        Ok(())
    }

    pub fn validate(&self, date: &CustomDate) -> Result<(), DateError> {
        if date.day < 1 || date.day > self.days_per_month {
            return Err(DateError::DayOutOfRange {
                day: date.day,
                max: self.days_per_month,
            });
        }
        self.validate_month(date.month)?;
        if date.year < 1 {
            return Err(DateError::YearOutOfRange(date.year));
        }
        Ok(())
    }

    /// Checked constructor.
    pub fn date(&self, year: i32, month: u32, day: u32) -> Result<CustomDate, DateError> {
        let date = CustomDate { year, month, day };
        self.validate(&date)?;
        Ok(date)
    }

    /// Step one month forward or back, rolling the year at either end.
    ///
    /// Year 1 is the floor: stepping back from its first month stays put.
    /// Stepping past the last month of `i32::MAX` stays put as well.
    pub fn advance_month(&self, month: u32, year: i32, direction: Direction) -> (u32, i32) {
        let last = self.months_per_year() - 1;
        match direction {
            Direction::Next if month >= last => match year.checked_add(1) {
                Some(next) => (0, next),
                None => (month, year),
            },
            Direction::Next => (month + 1, year),
            Direction::Prev if month == 0 && year <= 1 => (0, year),
            Direction::Prev if month == 0 => (last, year - 1),
            Direction::Prev => (month - 1, year),
        }
    }

    /// `"{weekday}, {month name} {day}, {year}"`.
    pub fn format_date(&self, date: &CustomDate) -> DecacalResult<String> {
        self.validate(date)?;
        Ok(format!(
            "{}, {} {}, {}",
            self.weekday_name_of(date.day)?,
            self.month_name_of(date.month)?,
            date.day,
            date.year
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_with_days(days_per_month: u32) -> CalendarSpec {
        let defaults = CalendarSpec::default();
        CalendarSpec::new(
            defaults.weekday_names().to_vec(),
            defaults.month_names().to_vec(),
            days_per_month,
        )
        .unwrap()
    }

    #[test]
    fn test_weekday_cycle_follows_day_minus_one() {
        let spec = CalendarSpec::default();
        for day in 1..=spec.days_per_month() {
            let expected = &spec.weekday_names()[((day - 1) % 10) as usize];
            assert_eq!(spec.weekday_name_of(day).unwrap(), expected);
        }
        assert_eq!(spec.weekday_name_of(1).unwrap(), "Peppermint Patty Day");
        assert_eq!(spec.weekday_name_of(10).unwrap(), "Loin Cloth Day");
        assert_eq!(spec.weekday_name_of(11).unwrap(), "Peppermint Patty Day");
    }

    #[test]
    fn test_weekday_of_day_zero_is_range_error() {
        let spec = CalendarSpec::default();
        assert!(matches!(
            spec.weekday_name_of(0),
            Err(DateError::DayOutOfRange { day: 0, .. })
        ));
    }

    #[test]
    fn test_validate_bounds() {
        let spec = CalendarSpec::default();
        assert!(spec.date(2025, 0, 1).is_ok());
        assert!(spec.date(1, 9, 30).is_ok());
        assert!(matches!(
            spec.date(2025, 0, 0),
            Err(DateError::DayOutOfRange { .. })
        ));
        assert!(matches!(
            spec.date(2025, 0, 31),
            Err(DateError::DayOutOfRange { day: 31, max: 30 })
        ));
        assert!(matches!(
            spec.date(2025, 10, 1),
            Err(DateError::MonthOutOfRange { month: 10, max: 9 })
        ));
        assert!(matches!(
            spec.date(0, 0, 1),
            Err(DateError::YearOutOfRange(0))
        ));
    }

    #[test]
    fn test_month_length_is_configurable() {
        let spec = spec_with_days(35);
        assert!(spec.date(2025, 4, 35).is_ok());
        assert!(spec.date(2025, 4, 36).is_err());
        // (35 - 1) mod 10 = 4
        assert_eq!(spec.weekday_name_of(35).unwrap(), "Mustang Day");
        assert_eq!(spec.weekday_name_of(35).unwrap(), spec.weekday_names()[4]);
    }

    #[test]
    fn test_advance_month_rollover() {
        let spec = CalendarSpec::default();
        assert_eq!(spec.advance_month(9, 2025, Direction::Next), (0, 2026));
        assert_eq!(spec.advance_month(0, 2025, Direction::Prev), (9, 2024));
        assert_eq!(spec.advance_month(4, 2025, Direction::Next), (5, 2025));
        assert_eq!(spec.advance_month(4, 2025, Direction::Prev), (3, 2025));
    }

    #[test]
    fn test_advance_month_is_invertible() {
        let spec = CalendarSpec::default();
        for year in [1, 2, 2025, 9999] {
            for month in 0..spec.months_per_year() {
                let (m, y) = spec.advance_month(month, year, Direction::Next);
                assert_eq!(spec.advance_month(m, y, Direction::Prev), (month, year));
            }
        }
    }

    #[test]
    fn test_advance_month_stops_at_year_one() {
        let spec = CalendarSpec::default();
        assert_eq!(spec.advance_month(0, 1, Direction::Prev), (0, 1));
    }

    #[test]
    fn test_advance_month_stops_at_last_year() {
        let spec = CalendarSpec::default();
        assert_eq!(spec.advance_month(9, i32::MAX, Direction::Next), (9, i32::MAX));
        assert_eq!(spec.advance_month(8, i32::MAX, Direction::Next), (9, i32::MAX));
    }

    #[test]
    fn test_month_names() {
        let spec = CalendarSpec::default();
        assert_eq!(spec.month_name_of(2).unwrap(), "Justin Thyme");
        assert!(spec.month_name_of(10).is_err());
        assert_eq!(spec.month_index_of("justin thyme"), Some(2));
        assert_eq!(spec.month_index_of(" Challenger "), Some(9));
        assert_eq!(spec.month_index_of("January"), None);
    }

    #[test]
    fn test_format_date() {
        let spec = CalendarSpec::default();
        let today = spec.date(2025, 2, 15).unwrap();
        assert_eq!(
            spec.format_date(&today).unwrap(),
            "Mustang Day, Justin Thyme 15, 2025"
        );
    }

    #[test]
    fn test_new_rejects_bad_shapes() {
        let names: Vec<String> = DEFAULT_WEEKDAY_NAMES.iter().map(|s| s.to_string()).collect();
        assert!(CalendarSpec::new(vec![], names.clone(), 30).is_err());
        assert!(CalendarSpec::new(names.clone(), vec![], 30).is_err());
        assert!(CalendarSpec::new(names.clone(), names.clone(), 0).is_err());
        assert!(
            CalendarSpec::new(names.clone(), vec!["Juno".into(), "juno".into()], 30).is_err()
        );
    }
}
