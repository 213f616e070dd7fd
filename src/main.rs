mod commands;
mod logging;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use decacal_core::{DecacalConfig, EventKind};
use tracing::debug;

#[derive(Parser)]
#[command(name = "decacal")]
#[command(about = "Keep notes on the days of a ten-day-week calendar")]
struct Cli {
    /// Config file (defaults to ~/.config/decacal/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log output (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a month with its events
    Show {
        /// Month by index or name (defaults to today's month)
        #[arg(short, long)]
        month: Option<String>,

        /// Year (defaults to today's year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Move this many months from there; negative goes back
        #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i32,
    },
    /// Print today's date
    Today,
    /// Change which date counts as today
    SetToday {
        year: i32,
        /// Month index or name
        month: String,
        day: u32,
    },
    /// Save a note on a date, replacing any note already there
    Note {
        year: i32,
        /// Month index or name
        month: String,
        day: u32,

        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// event, special or deadline
        #[arg(short, long, default_value_t = EventKind::Event)]
        kind: EventKind,
    },
    /// Delete the note on a date
    Remove {
        year: i32,
        /// Month index or name
        month: String,
        day: u32,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show where decacal keeps its files and the settings in effect
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => DecacalConfig::load_from(path)?,
        None => DecacalConfig::load()?,
    };
    let store = config.event_store()?;
    let default_today = config.default_today()?;
    debug!(backend = %store.backend().mode(), data_dir = %config.data_path().display(), "store ready");

    let result = match cli.command {
        Commands::Show {
            month,
            year,
            offset,
        } => commands::show::run(&store, default_today, month.as_deref(), year, offset).await,
        Commands::Today => commands::today::run(&store, default_today).await,
        Commands::SetToday { year, month, day } => {
            commands::set_today::run(&store, default_today, year, &month, day).await
        }
        Commands::Note {
            year,
            month,
            day,
            text,
            kind,
        } => commands::note::run(&store, year, &month, day, &text.join(" "), kind).await,
        Commands::Remove {
            year,
            month,
            day,
            yes,
        } => commands::remove::run(&store, year, &month, day, yes).await,
        Commands::Config => commands::config::run(&config, cli.config.as_deref(), &store),
    };

    render::print_warnings(&store.take_warnings());
    result
}
