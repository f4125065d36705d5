//! Selection highlight: the single enlarged marker and the camera flight.
//!
//! # State Machine
//!
//! ```text
//! Idle --[select A]--> Highlighted(A)
//! Highlighted(A) --[select B]--> Highlighted(B)   (A's marker removed first)
//! Highlighted(A) --[clear]--> Idle                (A's marker removed)
//! Idle --[clear]--> Idle
//! ```
//!
//! The controller owns the highlight marker handle. There is never more than
//! one: the previous marker is removed before a new one is placed, and a
//! failed placement leaves the controller Idle rather than pointing at a
//! marker that does not exist.
//!
//! Re-running the cluster rebuild after a transition is the caller's job
//! (see [`crate::overlay::VesselOverlay`]); it is not deferred until the
//! camera lands.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::icon::{render, size_for};
use crate::map::{FlyToOptions, LatLng, MapBackend, MapError, MarkerId, MarkerSpec};
use crate::popup::PopupFormatter;
use crate::vessel::SelectedVessel;

/// Zoom the camera flies to when a vessel is selected.
pub const DEFAULT_FLY_TO_ZOOM: f64 = 15.0;

/// Duration of the fly-to animation.
pub const DEFAULT_FLY_TO_DURATION: Duration = Duration::from_secs(1);

/// Camera behaviour on selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// Target zoom of the flight.
    pub fly_to_zoom: f64,
    /// Flight duration.
    pub fly_to_duration: Duration,
    /// Animate, or jump straight to the target.
    pub animate: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fly_to_zoom: DEFAULT_FLY_TO_ZOOM,
            fly_to_duration: DEFAULT_FLY_TO_DURATION,
            animate: true,
        }
    }
}

impl CameraConfig {
    fn options(&self) -> FlyToOptions {
        FlyToOptions {
            animate: self.animate,
            duration: self.fly_to_duration,
        }
    }
}

/// Current highlight.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum HighlightState {
    /// No highlight marker on the map.
    #[default]
    Idle,
    /// One highlight marker on the map.
    Highlighted {
        /// The highlight marker.
        marker: MarkerId,
        /// Name of the highlighted vessel.
        vessel: String,
        /// Where the marker was placed.
        position: LatLng,
    },
}

impl HighlightState {
    /// The highlight marker, if any.
    pub fn marker(&self) -> Option<MarkerId> {
        match self {
            HighlightState::Idle => None,
            HighlightState::Highlighted { marker, .. } => Some(*marker),
        }
    }
}

/// What a selection change did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "transition", rename_all = "lowercase")]
pub enum HighlightTransition {
    /// A highlight was placed where there was none.
    Placed { marker: MarkerId },
    /// The previous highlight was removed and a new one placed.
    Replaced { previous: MarkerId, marker: MarkerId },
    /// The previous highlight was removed; now Idle.
    Cleared { previous: MarkerId },
    /// Selection cleared while already Idle.
    Unchanged,
}

/// Owns the highlight marker and drives the camera on selection.
#[derive(Debug)]
pub struct HighlightController {
    camera: CameraConfig,
    popups: PopupFormatter,
    state: HighlightState,
}

impl Default for HighlightController {
    fn default() -> Self {
        Self::new(CameraConfig::default(), PopupFormatter::default())
    }
}

impl HighlightController {
    /// Create an Idle controller.
    pub fn new(camera: CameraConfig, popups: PopupFormatter) -> Self {
        Self {
            camera,
            popups,
            state: HighlightState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> &HighlightState {
        &self.state
    }

    /// Camera configuration.
    pub fn camera(&self) -> &CameraConfig {
        &self.camera
    }

    /// Apply a selection change.
    ///
    /// With a selection: remove the old highlight, place the new one at the
    /// current zoom's selected size with its popup open, then start the
    /// camera flight. Without: remove the old highlight, if any.
    pub fn on_selection_change<M: MapBackend + ?Sized>(
        &mut self,
        map: &mut M,
        selected: Option<&SelectedVessel>,
    ) -> Result<HighlightTransition, MapError> {
        let Some(selected) = selected else {
            return Ok(match self.release(map)? {
                Some(previous) => {
                    info!(marker = %previous, "Selection cleared");
                    HighlightTransition::Cleared { previous }
                }
                None => HighlightTransition::Unchanged,
            });
        };

        // Sized at the zoom the user is looking at, not the flight target.
        let spec = size_for(map.zoom(), true);
        let icon = render(&spec, selected.heading);

        let previous = self.release(map)?;

        let position = selected.position();
        let marker_spec =
            MarkerSpec::new(position, icon).with_popup(self.popups.format_highlight(selected));
        let marker = map.place_marker(marker_spec, true)?;
        self.state = HighlightState::Highlighted {
            marker,
            vessel: selected.name.clone(),
            position,
        };

        map.fly_to(position, self.camera.fly_to_zoom, self.camera.options())?;

        info!(
            vessel = %selected.name,
            %position,
            %marker,
            size = %spec,
            "Vessel highlighted"
        );

        Ok(match previous {
            Some(previous) => HighlightTransition::Replaced { previous, marker },
            None => HighlightTransition::Placed { marker },
        })
    }

    /// Remove the highlight marker, if any, and return to Idle.
    ///
    /// On error the state is left unchanged so the removal can be retried.
    pub fn release<M: MapBackend + ?Sized>(
        &mut self,
        map: &mut M,
    ) -> Result<Option<MarkerId>, MapError> {
        let Some(marker) = self.state.marker() else {
            return Ok(None);
        };
        map.remove_marker(marker)?;
        debug!(%marker, "Highlight marker removed");
        self.state = HighlightState::Idle;
        Ok(Some(marker))
    }
}
