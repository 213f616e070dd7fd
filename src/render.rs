//! Terminal rendering for decacal types.
//!
//! Extension traits that add colored output to decacal-core types using
//! owo_colors.

use decacal_core::{DayCell, Event, EventKind, MonthGrid};
use owo_colors::OwoColorize;

/// Width of one day column, including its event marker.
const CELL_WIDTH: usize = 5;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

fn kind_symbol(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Event => "•",
        EventKind::Special => "★",
        EventKind::Deadline => "!",
    }
}

impl Render for EventKind {
    fn render(&self) -> String {
        let symbol = kind_symbol(*self);
        match self {
            EventKind::Event => symbol.blue().to_string(),
            EventKind::Special => symbol.magenta().to_string(),
            EventKind::Deadline => symbol.red().to_string(),
        }
    }
}

impl Render for Event {
    fn render(&self) -> String {
        format!(
            "{} {} {}",
            self.kind.render(),
            self.note,
            format!("[{}]", self.kind).dimmed()
        )
    }
}

/// "PPD" for "Peppermint Patty Day": the first letter of every word.
fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect()
}

/// Unstyled, padded text of a cell: day number plus event marker.
fn cell_label(cell: &DayCell) -> String {
    let marker = cell.event.as_ref().map(|e| kind_symbol(e.kind)).unwrap_or(" ");
    format!("{:>width$}{}", cell.day, marker, width = CELL_WIDTH - 1)
}

impl Render for DayCell {
    fn render(&self) -> String {
        let label = cell_label(self);
        match (&self.event, self.is_today) {
            (_, true) => label.reversed().bold().to_string(),
            (Some(event), false) => match event.kind {
                EventKind::Event => label.blue().to_string(),
                EventKind::Special => label.magenta().to_string(),
                EventKind::Deadline => label.red().to_string(),
            },
            (None, false) => label,
        }
    }
}

impl Render for MonthGrid {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        let title = format!("{} {}", self.month_name, self.year);
        lines.push(title.bold().to_string());

        // Header from the first week's weekday names
        if let Some(first_week) = self.weeks().next() {
            let header: String = first_week
                .iter()
                .map(|cell| format!("{:>width$}", initials(&cell.weekday_name), width = CELL_WIDTH))
                .collect();
            lines.push(header.dimmed().to_string());
        }

        for week in self.weeks() {
            lines.push(week.iter().map(|cell| cell.render()).collect());
        }

        let events: Vec<_> = self.events().collect();
        if !events.is_empty() {
            lines.push(String::new());
            for event in events {
                let weekday = self
                    .cell(event.day)
                    .map(|cell| cell.weekday_name.as_str())
                    .unwrap_or_default();
                lines.push(format!(
                    "{:>4} {:<22} {}",
                    event.day,
                    weekday.dimmed(),
                    event.render()
                ));
            }
        }

        lines.join("\n")
    }
}

/// Print warnings collected from the store, e.g. unreadable local data.
pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decacal_core::{CalendarSpec, CustomDate, MonthEvents};

    fn event(day: u32, kind: EventKind) -> Event {
        Event {
            id: format!("evt-{day}"),
            year: 2025,
            month: 2,
            day,
            note: "Important meeting".into(),
            kind,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_initials_are_distinct_for_default_weekdays() {
        let spec = CalendarSpec::default();
        let mut seen: Vec<String> = spec.weekday_names().iter().map(|n| initials(n)).collect();
        assert_eq!(seen[0], "PPD");
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 10);
    }

    #[test]
    fn test_cell_label_marks_events() {
        let spec = CalendarSpec::default();
        let today = CustomDate { year: 2025, month: 2, day: 15 };
        let mut events = MonthEvents::new();
        events.insert(12, event(12, EventKind::Deadline));

        let grid = spec.expand_month(2, 2025, &today, &events).unwrap();
        assert_eq!(cell_label(grid.cell(12).unwrap()), "  12!");
        assert_eq!(cell_label(grid.cell(3).unwrap()), "   3 ");
    }

    #[test]
    fn test_month_render_lists_events() {
        let spec = CalendarSpec::default();
        let today = CustomDate { year: 2025, month: 2, day: 15 };
        let mut events = MonthEvents::new();
        events.insert(12, event(12, EventKind::Event));

        let rendered = spec.expand_month(2, 2025, &today, &events).unwrap().render();
        assert!(rendered.contains("Justin Thyme 2025"));
        assert!(rendered.contains("Important meeting"));
        // title, header, three weeks, blank line, one event
        assert_eq!(rendered.lines().count(), 7);
    }
}
