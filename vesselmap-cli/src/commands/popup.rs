//! `vesselmap popup`: print a vessel's popup.

use std::path::PathBuf;

use clap::Args;
use vesselmap::config::ConfigFile;

use super::common::{find_vessel, load_vessels, print_json, select_vessel};
use crate::error::CliError;

/// Arguments for the popup command.
#[derive(Debug, Args)]
pub struct PopupArgs {
    /// JSON file with the vessel list
    #[arg(long)]
    pub vessels: PathBuf,

    /// Vessel name
    #[arg(long)]
    pub name: String,

    /// Print the short popup of the highlight marker instead
    #[arg(long, conflicts_with = "json")]
    pub highlight: bool,

    /// Print the structured popup fields as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the popup command.
pub fn run(args: PopupArgs, config: &ConfigFile) -> Result<(), CliError> {
    let vessels = load_vessels(&args.vessels)?;
    let popups = config.overlay_config().sync.popups;

    if args.highlight {
        let selected = select_vessel(&vessels, &args.name)?;
        println!("{}", popups.format_highlight(&selected));
        return Ok(());
    }

    let vessel = find_vessel(&vessels, &args.name)?;
    if args.json {
        return print_json(&popups.content(vessel));
    }

    println!("{}", popups.format(vessel));
    Ok(())
}
