//! VesselMap - zoom-adaptive vessel markers for an interactive map
//!
//! This library keeps a map's vessel layer in step with a vessel list, the
//! viewport zoom and the user's selection:
//!
//! ```text
//!  vessel list ─┐                    ┌─► cluster layer (one marker per vessel,
//!  zoom-end    ─┼─► VesselOverlay ───┤    sized for zoom, rotated to heading)
//!  selection   ─┘    (single owner)  └─► highlight marker + camera flight
//! ```
//!
//! The map itself is an external collaborator behind [`map::MapBackend`];
//! [`map::HeadlessMap`] is an in-memory implementation for tests and tooling.
//!
//! # Modules
//!
//! - [`icon`]: zoom band → icon size table, icon rendering
//! - [`popup`]: popup HTML for clustered and highlight markers
//! - [`sync`]: full rebuild of the cluster layer
//! - [`highlight`]: selection state machine and camera flight
//! - [`overlay`]: single-writer orchestration and the async driver
//! - [`config`]: `~/.vesselmap/config.ini`
//! - [`logging`]: tracing subscriber setup

pub mod config;
pub mod highlight;
pub mod icon;
pub mod logging;
pub mod map;
pub mod overlay;
pub mod popup;
pub mod sync;
pub mod vessel;

pub use map::{HeadlessMap, LatLng, MapBackend, MapError};
pub use overlay::{OverlayConfig, OverlayError, OverlayEvent, VesselOverlay};
pub use vessel::{SelectedVessel, Vessel};
