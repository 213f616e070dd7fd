use anyhow::Result;
use decacal_core::{Backend, EventStore};
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use crate::commands::parse_date;
use crate::render::Render;
use crate::utils::tui;

pub async fn run<B: Backend>(
    store: &EventStore<B>,
    year: i32,
    month: &str,
    day: u32,
    yes: bool,
) -> Result<()> {
    let date = parse_date(store.spec(), year, month, day)?;
    let label = store.spec().format_date(&date)?;

    let Some(event) = tui::while_busy(store, "Loading events", store.event_at(&date)).await else {
        println!("{}", format!("No event on {label}").dimmed());
        return Ok(());
    };

    // Confirm unless --yes
    if !yes {
        println!("{}: {}", label, event.render());
        let confirmed = Confirm::new()
            .with_prompt("Remove this event?")
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    tui::while_busy(store, "Removing", store.remove(&date)).await?;
    println!("{} {}", "Removed".red(), label);

    Ok(())
}
