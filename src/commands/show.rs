use anyhow::Result;
use decacal_core::{Backend, CustomDate, DateNavigator, EventStore, MonthGrid};

use crate::commands::parse_month;
use crate::render::Render;
use crate::utils::tui;

pub async fn run<B: Backend>(
    store: &EventStore<B>,
    default_today: CustomDate,
    month: Option<&str>,
    year: Option<i32>,
    offset: i32,
) -> Result<()> {
    let mut nav = tui::while_busy(store, "Loading", DateNavigator::load(store, default_today)).await?;

    if month.is_some() || year.is_some() {
        let start = nav.cursor();
        let month = match month {
            Some(m) => parse_month(nav.spec(), m)?,
            None => start.month,
        };
        nav.jump_to(month, year.unwrap_or(start.year))?;
    }
    nav.navigate_by(offset);

    let grid = tui::while_busy(store, "Loading events", nav.current_grid(store)).await?;
    print_grid(&grid);

    Ok(())
}

pub fn print_grid(grid: &MonthGrid) {
    println!("{}", grid.render());
}
