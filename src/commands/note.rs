use anyhow::Result;
use decacal_core::{Backend, EventKind, EventStore};
use owo_colors::OwoColorize;

use crate::commands::parse_date;
use crate::render::Render;
use crate::utils::tui;

pub async fn run<B: Backend>(
    store: &EventStore<B>,
    year: i32,
    month: &str,
    day: u32,
    text: &str,
    kind: EventKind,
) -> Result<()> {
    let date = parse_date(store.spec(), year, month, day)?;

    let saved = tui::while_busy(store, "Saving", store.save(&date, text, kind)).await?;

    let verb = if saved.was_created() { "Created" } else { "Updated" };
    println!(
        "{} {}: {}",
        verb.green(),
        store.spec().format_date(&date)?,
        saved.event().render()
    );

    Ok(())
}
