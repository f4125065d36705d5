//! `vesselmap render`: one overlay pass on a headless map.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use vesselmap::config::ConfigFile;
use vesselmap::highlight::HighlightState;
use vesselmap::map::{HeadlessMap, MapSnapshot};
use vesselmap::overlay::VesselOverlay;
use vesselmap::sync::SyncReport;

use super::common::{load_vessels, print_json, select_vessel};
use crate::error::CliError;

/// Arguments for the render command.
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// JSON file with the vessel list
    #[arg(long)]
    pub vessels: PathBuf,

    /// Map zoom level
    #[arg(long, allow_negative_numbers = true)]
    pub zoom: f64,

    /// Name of the vessel to select
    #[arg(long)]
    pub select: Option<String>,

    /// Print the full map snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct RenderReport {
    report: SyncReport,
    highlight: HighlightState,
    map: MapSnapshot,
}

/// Run the render command.
pub fn run(args: RenderArgs, config: &ConfigFile) -> Result<(), CliError> {
    let vessels = load_vessels(&args.vessels)?;
    let selected = args
        .select
        .as_deref()
        .map(|name| select_vessel(&vessels, name))
        .transpose()?;

    let mut overlay = VesselOverlay::new(HeadlessMap::with_zoom(args.zoom), config.overlay_config())
        .with_vessels(vessels)
        .with_selection(selected);
    let outcome = overlay.attach()?;

    let rendered = RenderReport {
        report: outcome.report,
        highlight: overlay.highlight().clone(),
        map: overlay.map().snapshot(),
    };
    overlay.detach()?;

    if args.json {
        return print_json(&rendered);
    }

    print_summary(&rendered);
    Ok(())
}

fn print_summary(rendered: &RenderReport) {
    println!("Rendered {}", rendered.report);
    println!("Zoom: {}", rendered.map.zoom);
    println!();

    for layer in &rendered.map.layers {
        println!(
            "Cluster layer {} (radius {}px): {} markers",
            layer.id,
            layer.options.max_cluster_radius,
            layer.markers.len()
        );
        for marker in &layer.markers {
            println!(
                "  {}  {} x {}",
                marker.position,
                marker.icon.width(),
                marker.icon.height()
            );
        }
    }

    println!();
    match &rendered.highlight {
        HighlightState::Idle => println!("Highlight: none"),
        HighlightState::Highlighted {
            marker,
            vessel,
            position,
        } => println!("Highlight: {} at {} ({})", vessel, position, marker),
    }
    match &rendered.map.animation {
        Some(flight) => println!(
            "Camera: flying to {} at zoom {} over {} ms",
            flight.target,
            flight.zoom,
            flight.options.duration.as_millis()
        ),
        None => println!("Camera: at {}", rendered.map.center),
    }
}
