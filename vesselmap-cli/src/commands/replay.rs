//! `vesselmap replay`: drive the async overlay with a scripted session.
//!
//! The script is a JSON array of steps:
//!
//! ```text
//! [
//!   {"event": "zoom", "zoom": 12},
//!   {"event": "select", "name": "Alpha"},
//!   {"event": "settle"},
//!   {"event": "vessels", "vessels": [...]},
//!   {"event": "clear"}
//! ]
//! ```
//!
//! Steps are sent to the driver without waiting, so consecutive triggers may
//! be coalesced. `settle` waits for everything queued so far, then lands the
//! camera flight.

use std::path::PathBuf;

use clap::Args;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vesselmap::config::ConfigFile;
use vesselmap::map::{HeadlessMap, MapSnapshot, SharedMap};
use vesselmap::overlay::{OverlayDriver, OverlayEvent, OverlayHandle, VesselOverlay};
use vesselmap::vessel::Vessel;

use super::common::{load_vessels, print_json, read_json, select_vessel};
use crate::error::CliError;

/// Arguments for the replay command.
#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// JSON file with the initial vessel list
    #[arg(long)]
    pub vessels: PathBuf,

    /// JSON script of events
    #[arg(long)]
    pub script: PathBuf,

    /// Initial zoom level
    #[arg(long, default_value = "10")]
    pub zoom: f64,

    /// Print the final map snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum ScriptStep {
    /// The user zoomed the map.
    Zoom { zoom: f64 },
    /// The user selected a vessel from the current list.
    Select { name: String },
    /// The user cleared the selection.
    Clear,
    /// A new vessel list arrived.
    Vessels { vessels: Vec<Vessel> },
    /// Wait for queued triggers, then land any camera flight.
    Settle,
}

#[derive(Debug, Serialize)]
struct ReplayReport {
    steps: usize,
    revision: u64,
    map: MapSnapshot,
}

/// Run the replay command.
pub fn run(args: ReplayArgs, config: &ConfigFile) -> Result<(), CliError> {
    let vessels = load_vessels(&args.vessels)?;
    let script: Vec<ScriptStep> = read_json(&args.script)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let report = runtime.block_on(replay(vessels, script, args.zoom, config))?;

    if args.json {
        return print_json(&report);
    }

    println!(
        "Replayed {} steps, final revision {}",
        report.steps, report.revision
    );
    for layer in &report.map.layers {
        println!("Cluster layer {}: {} markers", layer.id, layer.markers.len());
    }
    for marker in &report.map.markers {
        println!(
            "Highlight marker {} at {}{}",
            marker.id,
            marker.spec.position,
            if marker.popup_open { " (popup open)" } else { "" }
        );
    }
    match &report.map.animation {
        Some(flight) => println!("Camera: flying to {} at zoom {}", flight.target, flight.zoom),
        None => println!("Camera: at {} zoom {}", report.map.center, report.map.zoom),
    }
    Ok(())
}

async fn replay(
    vessels: Vec<Vessel>,
    script: Vec<ScriptStep>,
    zoom: f64,
    config: &ConfigFile,
) -> Result<ReplayReport, CliError> {
    let shared = SharedMap::new(HeadlessMap::with_zoom(zoom));
    let mut overlay =
        VesselOverlay::new(shared.clone(), config.overlay_config()).with_vessels(vessels.clone());
    let attached = overlay.attach()?;

    let driver = OverlayDriver::spawn(overlay);
    let handle = driver.handle();
    let mut current = vessels;

    for (index, step) in script.iter().enumerate() {
        debug!(step = index, ?step, "Replaying step");
        apply_step(&shared, &handle, &mut current, step).await?;
    }

    let revision = driver
        .flush()
        .await?
        .map_or(attached.report.revision, |outcome| outcome.report.revision);
    let map = shared.lock().snapshot();
    driver.shutdown().await?;

    info!(steps = script.len(), revision, "Replay finished");
    Ok(ReplayReport {
        steps: script.len(),
        revision,
        map,
    })
}

async fn apply_step(
    shared: &SharedMap<HeadlessMap>,
    handle: &OverlayHandle,
    current: &mut Vec<Vessel>,
    step: &ScriptStep,
) -> Result<(), CliError> {
    match step {
        ScriptStep::Zoom { zoom } => {
            let zoomed = {
                let mut map = shared.lock();
                map.set_zoom(*zoom);
                !map.drain_zoom_end().is_empty()
            };
            if zoomed {
                handle.send(OverlayEvent::ZoomEnd)?;
            }
        }
        ScriptStep::Select { name } => {
            let selected = select_vessel(current, name)?;
            handle.send(OverlayEvent::SelectionChanged(Some(selected)))?;
        }
        ScriptStep::Clear => {
            handle.send(OverlayEvent::SelectionChanged(None))?;
        }
        ScriptStep::Vessels { vessels } => {
            *current = vessels.clone();
            handle.send(OverlayEvent::VesselsUpdated(vessels.clone()))?;
        }
        ScriptStep::Settle => {
            handle.flush().await?;
            let zoomed = {
                let mut map = shared.lock();
                map.finish_animation() && !map.drain_zoom_end().is_empty()
            };
            if zoomed {
                handle.send(OverlayEvent::ZoomEnd)?;
                handle.flush().await?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fleet() -> Vec<Vessel> {
        vec![
            Vessel::at(1.0, 1.0).named("Alpha").with_heading(90.0),
            Vessel::at(2.0, 2.0).named("Beta"),
        ]
    }

    #[test]
    fn test_parse_script() {
        let script: Vec<ScriptStep> = serde_json::from_str(
            r#"[
                {"event": "zoom", "zoom": 12.5},
                {"event": "select", "name": "Alpha"},
                {"event": "clear"},
                {"event": "vessels", "vessels": [{"name": "Gamma", "lat": 3, "lng": 3}]},
                {"event": "settle"}
            ]"#,
        )
        .unwrap();

        assert_eq!(script[0], ScriptStep::Zoom { zoom: 12.5 });
        assert_eq!(
            script[1],
            ScriptStep::Select {
                name: "Alpha".to_string()
            }
        );
        assert_eq!(script[2], ScriptStep::Clear);
        assert!(matches!(&script[3], ScriptStep::Vessels { vessels } if vessels.len() == 1));
        assert_eq!(script[4], ScriptStep::Settle);
    }

    #[test]
    fn test_unknown_step_rejected() {
        let result: Result<Vec<ScriptStep>, _> =
            serde_json::from_str(r#"[{"event": "teleport"}]"#);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_replay_select_and_settle() {
        let script = vec![
            ScriptStep::Select {
                name: "Alpha".to_string(),
            },
            ScriptStep::Settle,
        ];

        let report = replay(fleet(), script, 8.0, &ConfigFile::default())
            .await
            .unwrap();

        // The flight landed at zoom 15, and the layer was rebuilt there.
        assert_eq!(report.map.zoom, 15.0);
        assert!(report.map.animation.is_none());
        assert_eq!(report.map.markers.len(), 1);
        let alpha = &report.map.layers[0].markers[0];
        assert_eq!((alpha.icon.width(), alpha.icon.height()), (30.0, 67.5));
    }

    #[tokio::test]
    async fn test_replay_clear_removes_highlight() {
        let script = vec![
            ScriptStep::Select {
                name: "Beta".to_string(),
            },
            ScriptStep::Settle,
            ScriptStep::Clear,
        ];

        let report = replay(fleet(), script, 16.0, &ConfigFile::default())
            .await
            .unwrap();
        assert!(report.map.markers.is_empty());
        assert_eq!(report.map.layers[0].markers.len(), 2);
    }

    #[tokio::test]
    async fn test_replay_select_uses_latest_list() {
        let script = vec![
            ScriptStep::Vessels {
                vessels: vec![Vessel::at(5.0, 5.0).named("Delta")],
            },
            ScriptStep::Select {
                name: "Delta".to_string(),
            },
        ];

        let report = replay(fleet(), script, 16.0, &ConfigFile::default())
            .await
            .unwrap();
        assert_eq!(report.map.layers[0].markers.len(), 1);
        assert_eq!(report.map.markers.len(), 1);

        let missing = replay(
            fleet(),
            vec![ScriptStep::Select {
                name: "Delta".to_string(),
            }],
            16.0,
            &ConfigFile::default(),
        )
        .await;
        assert!(matches!(missing, Err(CliError::VesselNotFound(_))));
    }
}
