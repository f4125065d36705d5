//! VesselMap CLI - Command-line interface
//!
//! Runs the vessel overlay against an in-memory map, for inspecting icon
//! sizing, popups and full overlay sessions without a browser.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use vesselmap::config::{config_file_path, ConfigFile};
use vesselmap::logging::{init_logging, LoggingGuard};

use commands::icon::IconArgs;
use commands::popup::PopupArgs;
use commands::render::RenderArgs;
use commands::replay::ReplayArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "vesselmap")]
#[command(version, about = "Zoom-adaptive vessel markers on a headless map", long_about = None)]
struct Cli {
    /// Config file (default: ~/.vesselmap/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the icon resolved for a zoom level
    Icon(IconArgs),
    /// Print the popup of one vessel
    Popup(PopupArgs),
    /// Render a vessel list once and print the resulting map
    Render(RenderArgs),
    /// Drive the async overlay with a JSON script of events
    Replay(ReplayArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.unwrap_or_else(config_file_path);
    let config = ConfigFile::load_from(&config_path)?;
    let _guard = start_logging(&config, cli.verbose)?;
    debug!(path = %config_path.display(), "Configuration loaded");

    match cli.command {
        Commands::Icon(args) => commands::icon::run(args, &config),
        Commands::Popup(args) => commands::popup::run(args, &config),
        Commands::Render(args) => commands::render::run(args, &config),
        Commands::Replay(args) => commands::replay::run(args, &config),
    }
}

fn start_logging(config: &ConfigFile, verbose: bool) -> Result<LoggingGuard, CliError> {
    let level = if verbose { "debug" } else { "info" };
    init_logging(&config.logging.directory, &config.logging.file, level)
        .map_err(CliError::LoggingInit)
}
