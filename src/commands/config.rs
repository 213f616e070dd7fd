use std::path::Path;

use anyhow::Result;
use decacal_core::{AnyBackend, BackendMode, DecacalConfig, EventStore};
use owo_colors::OwoColorize;

pub fn run(
    config: &DecacalConfig,
    explicit_path: Option<&Path>,
    store: &EventStore<AnyBackend>,
) -> Result<()> {
    let config_path = match explicit_path {
        Some(path) => path.to_path_buf(),
        None => DecacalConfig::config_path()?,
    };
    let spec = store.spec();

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    println!("  Data:       {}", config.data_path().display());

    println!();
    println!("{}", "Backend".bold());
    println!("  Mode:       {}", store.backend().mode());
    if store.backend().mode() != BackendMode::Local {
        println!("  Server:     {}", config.backend.url);
        println!("  Timeout:    {}s", config.backend.timeout_secs);
        println!(
            "  Retries:    {} (after {}ms)",
            config.backend.retry_attempts, config.backend.retry_delay_ms
        );
    }

    println!();
    println!("{}", "Calendar".bold());
    println!("  Days/month: {}", spec.days_per_month());
    println!("  Weekdays:   {}", spec.weekday_names().join(", "));
    println!("  Months:     {}", spec.month_names().join(", "));
    println!(
        "  Default today: {}",
        spec.format_date(&config.default_today)?.dimmed()
    );

    Ok(())
}
