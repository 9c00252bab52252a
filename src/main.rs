#![warn(clippy::unwrap_used, clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use clap::Parser;
use color_eyre::eyre::{self, WrapErr};
use config::SimConfig;
use keplerpos::{bodies::ElementsTable, time::Chrono};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod sim;

/// Propagate Keplerian orbits and print body positions.
#[derive(Parser, Debug)]
#[command(name = "keplerpos")]
struct Args {
    /// TOML scenario; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// RON elements table to use instead of the built-in J2000 one
    #[arg(long)]
    table: Option<PathBuf>,
    /// Write the active elements table as RON and exit
    #[arg(long)]
    dump_table: Option<PathBuf>,
}

fn load_table(path: &Path) -> eyre::Result<ElementsTable> {
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read table {}", path.display()))?;
    ron::from_str(&text).wrap_err_with(|| format!("Invalid table {}", path.display()))
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let table = match &args.table {
        Some(path) => load_table(path)?,
        None => ElementsTable::solar_system(),
    };

    if let Some(path) = &args.dump_table {
        fs::write(
            path,
            ron::ser::to_string_pretty(&table, ron::ser::PrettyConfig::default())?,
        )
        .wrap_err_with(|| format!("Failed to write table {}", path.display()))?;
        info!(path = %path.display(), "wrote elements table");
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let chrono = Chrono::default();
    sim::run(&config, &table, &chrono, io::stdout().lock())
}
