//! # quire
//!
//! Command-line front end for the Quire editor.
//!
//! - `quire serve` — run the trusted file service as JSON lines on stdio
//! - `quire edit [--file <path>]` — terminal editing surface over the bridge
//! - `quire info` — print the file service's system info

mod commands;
mod config;
mod language;
mod terminal;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::QuireConfig;

/// Quire — a sandboxed editor with a trusted file bridge.
#[derive(Parser)]
#[command(name = "quire", version, about)]
struct Cli {
    /// Configuration file (missing file means defaults).
    #[arg(long, default_value = "quire.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the file bridge as JSON lines on stdin/stdout.
    Serve,
    /// Edit a document in the terminal.
    Edit {
        /// Open this file on start instead of asking.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Print system info of the file service as JSON.
    Info,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = QuireConfig::load_or_default(&cli.config)?;

    // Logs go to stderr; stdout belongs to the bridge or the terminal UI.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(config.log_directive().parse()?))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    match &cli.command {
        Commands::Serve => commands::serve::execute(&config),
        Commands::Edit { file } => commands::edit::execute(&config, file.as_deref()),
        Commands::Info => commands::info::execute(),
    }
}
