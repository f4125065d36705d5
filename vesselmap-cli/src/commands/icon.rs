//! `vesselmap icon`: show the icon resolved for a zoom level.

use clap::Args;
use serde::Serialize;
use vesselmap::config::ConfigFile;
use vesselmap::icon::{render, size_for, IconSpec, RenderableIcon};

use super::common::print_json;
use crate::error::CliError;

/// Arguments for the icon command.
#[derive(Debug, Args)]
pub struct IconArgs {
    /// Map zoom level
    #[arg(long, allow_negative_numbers = true)]
    pub zoom: f64,

    /// Resolve the selected (enlarged) variant
    #[arg(long)]
    pub selected: bool,

    /// Heading in degrees used to rotate the icon
    #[arg(long)]
    pub heading: Option<f64>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct IconReport {
    zoom: f64,
    selected: bool,
    spec: IconSpec,
    icon: RenderableIcon,
    markup: String,
}

/// Run the icon command.
pub fn run(args: IconArgs, config: &ConfigFile) -> Result<(), CliError> {
    let spec = size_for(args.zoom, args.selected);
    let icon = render(&spec, args.heading);
    let markup = icon.markup(&config.icon_assets());

    if args.json {
        return print_json(&IconReport {
            zoom: args.zoom,
            selected: args.selected,
            spec,
            icon,
            markup,
        });
    }

    println!("Zoom:     {}", args.zoom);
    println!("Selected: {}", if args.selected { "yes" } else { "no" });
    println!("Kind:     {}", spec.kind);
    println!("Size:     {} x {}", spec.width, spec.height);
    let anchor = icon.popup_anchor();
    println!("Popup:    anchored at ({}, {})", anchor.x, anchor.y);
    println!("Markup:   {}", markup);
    Ok(())
}
