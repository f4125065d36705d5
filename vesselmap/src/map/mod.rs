//! Map collaborator interface.
//!
//! The overlay never renders tiles or clusters markers itself. It drives
//! whatever map widget hosts it through the narrow [`MapBackend`] trait:
//!
//! ```text
//! ┌──────────────────┐   create/clear/add    ┌──────────────────────┐
//! │ MarkerSynchronizer│ ───────────────────► │                      │
//! └──────────────────┘                       │     MapBackend       │
//! ┌──────────────────┐   place/remove/fly    │ (browser map, test   │
//! │HighlightController│ ───────────────────► │  double, headless)   │
//! └──────────────────┘                       │                      │
//! ┌──────────────────┐   subscribe/unsub     │                      │
//! │  VesselOverlay   │ ───────────────────►  │                      │
//! └──────────────────┘                       └──────────────────────┘
//! ```
//!
//! Two implementations ship with the crate:
//!
//! - [`HeadlessMap`]: in-memory map that records everything it is asked to do
//! - [`SharedMap`]: `Arc<Mutex<_>>` wrapper so a backend owned by the async
//!   driver can still be inspected from outside

mod headless;
mod shared;

pub use headless::{CameraAnimation, HeadlessMap, LayerSnapshot, MapSnapshot, PlacedMarker};
pub use shared::SharedMap;

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::icon::RenderableIcon;

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Create a new position.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}

macro_rules! handle_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

handle_id!(
    /// Handle of a cluster layer created by the backend.
    LayerId,
    "layer"
);
handle_id!(
    /// Handle of a marker placed directly on the map.
    MarkerId,
    "marker"
);
handle_id!(
    /// Handle of a registered event listener.
    ListenerId,
    "listener"
);

/// Construction options of a cluster layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterOptions {
    /// Markers closer than this many pixels are grouped.
    pub max_cluster_radius: u32,
}

/// A positioned marker with its icon and popup content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    /// Marker position.
    pub position: LatLng,
    /// Marker icon.
    pub icon: RenderableIcon,
    /// Popup HTML bound to the marker.
    pub popup: Option<String>,
}

impl MarkerSpec {
    /// Create a marker without a popup.
    pub fn new(position: LatLng, icon: RenderableIcon) -> Self {
        Self {
            position,
            icon,
            popup: None,
        }
    }

    /// Bind popup content.
    pub fn with_popup(mut self, popup: impl Into<String>) -> Self {
        self.popup = Some(popup.into());
        self
    }
}

/// Camera animation options for [`MapBackend::fly_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlyToOptions {
    /// Animate the transition instead of jumping.
    pub animate: bool,
    /// Animation duration.
    pub duration: Duration,
}

/// Map events the overlay listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapEventKind {
    /// The viewport finished a zoom change.
    ZoomEnd,
}

/// Errors reported by a map backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// The layer handle is not known to the backend.
    #[error("Unknown cluster layer: {0}")]
    UnknownLayer(LayerId),

    /// The marker handle is not known to the backend.
    #[error("Unknown marker: {0}")]
    UnknownMarker(MarkerId),

    /// The listener handle is not registered.
    #[error("Unknown listener: {0}")]
    UnknownListener(ListenerId),

    /// Backend-specific failure.
    #[error("Map backend error: {0}")]
    Backend(String),
}

/// Operations the overlay needs from its hosting map.
///
/// Implementations are driven from a single owner; none of the methods
/// need to be reentrant.
pub trait MapBackend {
    /// Current viewport zoom.
    fn zoom(&self) -> f64;

    /// Construct a cluster layer and add it to the map.
    fn create_cluster_layer(&mut self, options: ClusterOptions) -> Result<LayerId, MapError>;

    /// Remove every marker from a cluster layer.
    fn clear_layer(&mut self, layer: LayerId) -> Result<(), MapError>;

    /// Add a marker to a cluster layer.
    fn add_to_layer(&mut self, layer: LayerId, marker: MarkerSpec) -> Result<(), MapError>;

    /// Place a standalone marker on the map, optionally opening its popup.
    fn place_marker(&mut self, marker: MarkerSpec, open_popup: bool)
        -> Result<MarkerId, MapError>;

    /// Remove a standalone marker from the map.
    fn remove_marker(&mut self, marker: MarkerId) -> Result<(), MapError>;

    /// Animate the camera to a position and zoom.
    fn fly_to(&mut self, target: LatLng, zoom: f64, options: FlyToOptions)
        -> Result<(), MapError>;

    /// Register interest in a map event.
    fn subscribe(&mut self, event: MapEventKind) -> Result<ListenerId, MapError>;

    /// Drop a previously registered listener.
    fn unsubscribe(&mut self, listener: ListenerId) -> Result<(), MapError>;
}

impl<T: MapBackend + ?Sized> MapBackend for &mut T {
    fn zoom(&self) -> f64 {
        (**self).zoom()
    }

    fn create_cluster_layer(&mut self, options: ClusterOptions) -> Result<LayerId, MapError> {
        (**self).create_cluster_layer(options)
    }

    fn clear_layer(&mut self, layer: LayerId) -> Result<(), MapError> {
        (**self).clear_layer(layer)
    }

    fn add_to_layer(&mut self, layer: LayerId, marker: MarkerSpec) -> Result<(), MapError> {
        (**self).add_to_layer(layer, marker)
    }

    fn place_marker(
        &mut self,
        marker: MarkerSpec,
        open_popup: bool,
    ) -> Result<MarkerId, MapError> {
        (**self).place_marker(marker, open_popup)
    }

    fn remove_marker(&mut self, marker: MarkerId) -> Result<(), MapError> {
        (**self).remove_marker(marker)
    }

    fn fly_to(
        &mut self,
        target: LatLng,
        zoom: f64,
        options: FlyToOptions,
    ) -> Result<(), MapError> {
        (**self).fly_to(target, zoom, options)
    }

    fn subscribe(&mut self, event: MapEventKind) -> Result<ListenerId, MapError> {
        (**self).subscribe(event)
    }

    fn unsubscribe(&mut self, listener: ListenerId) -> Result<(), MapError> {
        (**self).unsubscribe(listener)
    }
}
