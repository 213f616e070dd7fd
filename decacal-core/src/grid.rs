//! Month grid: one cell per day with weekday, event and today marker.

use crate::calendar::CalendarSpec;
use crate::date::{CustomDate, MonthCursor};
use crate::error::DecacalResult;
use crate::event::{Event, MonthEvents};

#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub day: u32,
    pub weekday_name: String,
    pub event: Option<Event>,
    pub is_today: bool,
}

/// A derived view of one month. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub cells: Vec<DayCell>,
    days_per_week: usize,
}

impl MonthGrid {
    pub fn cursor(&self) -> MonthCursor {
        MonthCursor {
            year: self.year,
            month: self.month,
        }
    }

    /// Cell for a 1-based day, if it exists in this month.
    pub fn cell(&self, day: u32) -> Option<&DayCell> {
        day.checked_sub(1)
            .and_then(|i| self.cells.get(i as usize))
    }

    /// Rows of one week each. The last row is short when the month length
    /// is not a multiple of the week length.
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(self.days_per_week.max(1))
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.cells.iter().filter_map(|c| c.event.as_ref())
    }
}

impl CalendarSpec {
    /// Expand a month into its day cells, merging in that month's events.
    pub fn expand_month(
        &self,
        month: u32,
        year: i32,
        today: &CustomDate,
        events_by_day: &MonthEvents,
    ) -> DecacalResult<MonthGrid> {
        self.validate_month(month)?;

        let mut cells = Vec::with_capacity(self.days_per_month() as usize);
        for day in 1..=self.days_per_month() {
            cells.push(DayCell {
                day,
                weekday_name: self.weekday_name_of(day)?.to_string(),
                event: events_by_day.get(&day).cloned(),
                is_today: today.year == year && today.month == month && today.day == day,
            });
        }

        Ok(MonthGrid {
            year,
            month,
            month_name: self.month_name_of(month)?.to_string(),
            cells,
            days_per_week: self.days_per_week() as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    fn event_on(day: u32, note: &str) -> Event {
        Event {
            id: format!("id-{day}"),
            year: 2025,
            month: 2,
            day,
            note: note.to_string(),
            kind: EventKind::Event,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_expand_month_marks_today() {
        let spec = CalendarSpec::default();
        let today = spec.date(2025, 2, 15).unwrap();
        let grid = spec.expand_month(2, 2025, &today, &MonthEvents::new()).unwrap();

        assert_eq!(grid.cells.len(), 30);
        assert_eq!(grid.month_name, "Justin Thyme");

        let cell = grid.cell(15).unwrap();
        assert!(cell.is_today);
        assert_eq!(cell.weekday_name, spec.weekday_names()[4]);
        assert_eq!(grid.cells.iter().filter(|c| c.is_today).count(), 1);
    }

    #[test]
    fn test_today_in_other_month_or_year_is_not_marked() {
        let spec = CalendarSpec::default();
        let today = spec.date(2025, 2, 15).unwrap();
        let other_month = spec.expand_month(3, 2025, &today, &MonthEvents::new()).unwrap();
        let other_year = spec.expand_month(2, 2026, &today, &MonthEvents::new()).unwrap();
        assert!(other_month.cells.iter().all(|c| !c.is_today));
        assert!(other_year.cells.iter().all(|c| !c.is_today));
    }

    #[test]
    fn test_expand_month_merges_events() {
        let spec = CalendarSpec::default();
        let today = spec.date(2025, 2, 15).unwrap();
        let mut events = MonthEvents::new();
        events.insert(12, event_on(12, "Important meeting"));
        events.insert(22, event_on(22, "Birthday celebration"));

        let grid = spec.expand_month(2, 2025, &today, &events).unwrap();
        assert_eq!(grid.cell(12).unwrap().event.as_ref().unwrap().note, "Important meeting");
        assert!(grid.cell(13).unwrap().event.is_none());
        assert_eq!(grid.events().count(), 2);
    }

    #[test]
    fn test_weeks_split_by_cycle_length() {
        let defaults = CalendarSpec::default();
        let spec = CalendarSpec::new(
            defaults.weekday_names().to_vec(),
            defaults.month_names().to_vec(),
            35,
        )
        .unwrap();
        let today = spec.date(2025, 0, 1).unwrap();
        let grid = spec.expand_month(0, 2025, &today, &MonthEvents::new()).unwrap();

        let rows: Vec<_> = grid.weeks().map(|w| w.len()).collect();
        assert_eq!(rows, vec![10, 10, 10, 5]);
        assert_eq!(grid.weeks().nth(3).unwrap()[0].day, 31);
    }

    #[test]
    fn test_expand_month_rejects_bad_month() {
        let spec = CalendarSpec::default();
        let today = spec.date(2025, 2, 15).unwrap();
        assert!(spec.expand_month(10, 2025, &today, &MonthEvents::new()).is_err());
    }
}
