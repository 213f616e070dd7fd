use anyhow::Result;
use decacal_core::{Backend, CustomDate, DateNavigator, EventStore};
use owo_colors::OwoColorize;

use crate::commands::{parse_date, show};
use crate::utils::tui;

pub async fn run<B: Backend>(
    store: &EventStore<B>,
    default_today: CustomDate,
    year: i32,
    month: &str,
    day: u32,
) -> Result<()> {
    let mut nav = tui::while_busy(store, "Loading", DateNavigator::load(store, default_today)).await?;
    let date = parse_date(nav.spec(), year, month, day)?;

    tui::while_busy(store, "Saving", nav.set_today(store, date)).await?;
    println!("Today is now {}", nav.spec().format_date(&date)?.green());
    println!();

    let grid = tui::while_busy(store, "Loading events", nav.current_grid(store)).await?;
    show::print_grid(&grid);

    Ok(())
}
