pub mod config;
pub mod note;
pub mod remove;
pub mod set_today;
pub mod show;
pub mod today;

use anyhow::Result;
use decacal_core::{CalendarSpec, CustomDate};

/// A month given either as its index or, case-insensitively, its name.
pub fn parse_month(spec: &CalendarSpec, input: &str) -> Result<u32> {
    if let Ok(index) = input.trim().parse::<u32>() {
        spec.validate_month(index)?;
        return Ok(index);
    }

    spec.month_index_of(input).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown month '{}'. Months: {}",
            input,
            spec.month_names().join(", ")
        )
    })
}

/// Date from command-line parts, checked against the calendar.
pub fn parse_date(spec: &CalendarSpec, year: i32, month: &str, day: u32) -> Result<CustomDate> {
    let month = parse_month(spec, month)?;
    Ok(spec.date(year, month, day)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month_by_index_or_name() {
        let spec = CalendarSpec::default();
        assert_eq!(parse_month(&spec, "2").unwrap(), 2);
        assert_eq!(parse_month(&spec, "justin thyme").unwrap(), 2);
        assert!(parse_month(&spec, "10").is_err());
        assert!(parse_month(&spec, "Smarch").is_err());
    }

    #[test]
    fn test_parse_date_validates_day() {
        let spec = CalendarSpec::default();
        assert_eq!(
            parse_date(&spec, 2025, "Revan", 30).unwrap(),
            CustomDate { year: 2025, month: 0, day: 30 }
        );
        assert!(parse_date(&spec, 2025, "Revan", 31).is_err());
    }
}
