use anyhow::Result;
use decacal_core::{Backend, CustomDate, DateNavigator, EventStore};
use owo_colors::OwoColorize;

use crate::render::Render;
use crate::utils::tui;

pub async fn run<B: Backend>(store: &EventStore<B>, default_today: CustomDate) -> Result<()> {
    let nav = tui::while_busy(store, "Loading", DateNavigator::load(store, default_today)).await?;
    let today = nav.today();

    println!(
        "{} {}",
        nav.spec().format_date(&today)?.bold(),
        format!("({today})").dimmed()
    );

    if let Some(event) = tui::while_busy(store, "Loading events", store.event_at(&today)).await {
        println!("  {}", event.render());
    }

    Ok(())
}
