//! Marker synchronization: rebuild the clustered vessel layer.
//!
//! Every trigger (zoom-end, new vessel list, selection change, first attach)
//! performs the same full rebuild:
//!
//! ```text
//! ┌──────────────┐   ┌────────────┐   ┌─────────────────────────────────────┐
//! │ layer exists?│──►│ clear_layer│──►│ for each vessel with lat + lng:     │
//! │  no: create  │   └────────────┘   │   selected? = identity match        │
//! └──────────────┘                    │   size_for(zoom, selected)          │
//!                                     │   render(spec, heading)             │
//!                                     │   add_to_layer(marker + popup)      │
//!                                     └─────────────────────────────────────┘
//! ```
//!
//! The layer is never diffed. Rebuilding from scratch costs O(n) per trigger
//! and makes the result depend only on the inputs, so two identical calls
//! leave an identical layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

use crate::icon::{render, size_for};
use crate::map::{ClusterOptions, LayerId, MapBackend, MapError, MarkerSpec};
use crate::popup::PopupFormatter;
use crate::vessel::{SelectedVessel, Vessel};

/// Default cluster radius in pixels.
pub const DEFAULT_CLUSTER_RADIUS_PX: u32 = 30;

/// How a vessel in the list is matched against the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKey {
    /// Name equality only.
    Name,
    /// IMO equality when both records carry one, name equality otherwise.
    #[default]
    Imo,
}

impl IdentityKey {
    /// Whether `vessel` is the selected vessel under this key.
    pub fn matches(&self, vessel: &Vessel, selected: &SelectedVessel) -> bool {
        if let (IdentityKey::Imo, Some(imo), Some(selected_imo)) = (self, vessel.imo, selected.imo)
        {
            return imo == selected_imo;
        }
        vessel.name.as_deref() == Some(selected.name.as_str())
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::Name => f.write_str("name"),
            IdentityKey::Imo => f.write_str("imo"),
        }
    }
}

impl FromStr for IdentityKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(IdentityKey::Name),
            "imo" => Ok(IdentityKey::Imo),
            other => Err(format!("unknown identity key '{}'", other)),
        }
    }
}

/// Configuration for [`MarkerSynchronizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Cluster radius in pixels.
    pub cluster_radius_px: u32,
    /// Selection identity rule.
    pub identity: IdentityKey,
    /// Popup builder for clustered markers.
    pub popups: PopupFormatter,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cluster_radius_px: DEFAULT_CLUSTER_RADIUS_PX,
            identity: IdentityKey::default(),
            popups: PopupFormatter::default(),
        }
    }
}

/// Outcome of one rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SyncReport {
    /// Monotonic rebuild counter, starting at 1.
    pub revision: u64,
    /// Markers added to the layer.
    pub placed: usize,
    /// Vessels skipped for missing coordinates.
    pub skipped: usize,
    /// Markers rendered in the selected style.
    pub selected: usize,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rev {}: {} placed, {} skipped, {} selected",
            self.revision, self.placed, self.skipped, self.selected
        )
    }
}

/// Owns the single cluster layer and rebuilds it on demand.
#[derive(Debug)]
pub struct MarkerSynchronizer {
    config: SyncConfig,
    layer: Option<LayerId>,
    revision: u64,
}

impl MarkerSynchronizer {
    /// Create a synchronizer. The layer is created lazily on first sync.
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            layer: None,
            revision: 0,
        }
    }

    /// The cluster layer, once created.
    pub fn layer(&self) -> Option<LayerId> {
        self.layer
    }

    /// Revision of the last completed rebuild (0 before the first).
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Active configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Rebuild the cluster layer from `vessels` at `zoom`.
    ///
    /// Map errors propagate unchanged; a failed rebuild does not bump the
    /// revision and may leave the layer partially populated until the next
    /// successful call.
    pub fn sync<M: MapBackend + ?Sized>(
        &mut self,
        map: &mut M,
        vessels: &[Vessel],
        zoom: f64,
        selected: Option<&SelectedVessel>,
    ) -> Result<SyncReport, MapError> {
        let layer = self.ensure_layer(map)?;
        map.clear_layer(layer)?;

        let mut report = SyncReport::default();
        for vessel in vessels {
            let Some(position) = vessel.position() else {
                trace!(name = ?vessel.name, "Skipping vessel without coordinates");
                report.skipped += 1;
                continue;
            };

            let is_selected = selected
                .map(|s| self.config.identity.matches(vessel, s))
                .unwrap_or(false);
            let spec = size_for(zoom, is_selected);
            let icon = render(&spec, vessel.heading);
            let marker =
                MarkerSpec::new(position, icon).with_popup(self.config.popups.format(vessel));

            map.add_to_layer(layer, marker)?;
            report.placed += 1;
            if is_selected {
                report.selected += 1;
            }
        }

        self.revision += 1;
        report.revision = self.revision;

        debug!(
            revision = report.revision,
            placed = report.placed,
            skipped = report.skipped,
            selected = report.selected,
            zoom,
            "Cluster layer rebuilt"
        );

        Ok(report)
    }

    fn ensure_layer<M: MapBackend + ?Sized>(&mut self, map: &mut M) -> Result<LayerId, MapError> {
        if let Some(layer) = self.layer {
            return Ok(layer);
        }
        let layer = map.create_cluster_layer(ClusterOptions {
            max_cluster_radius: self.config.cluster_radius_px,
        })?;
        debug!(%layer, radius = self.config.cluster_radius_px, "Cluster layer created");
        self.layer = Some(layer);
        Ok(layer)
    }
}

impl Default for MarkerSynchronizer {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}
