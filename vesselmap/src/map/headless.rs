//! In-memory map backend.
//!
//! `HeadlessMap` keeps every layer, marker, listener and camera move it is
//! asked for, without drawing anything. The CLI renders its state as text or
//! JSON, and the tests assert against it.
//!
//! Camera animations are not timed. `fly_to` records a [`CameraAnimation`]
//! and leaves the viewport untouched until [`HeadlessMap::finish_animation`]
//! is called, which mirrors a browser map where the zoom only changes once
//! the flight lands.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{
    ClusterOptions, FlyToOptions, LatLng, LayerId, ListenerId, MapBackend, MapError,
    MapEventKind, MarkerId, MarkerSpec,
};

/// Zoom used by [`HeadlessMap::default`].
const DEFAULT_ZOOM: f64 = 3.0;

/// A standalone marker placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedMarker {
    /// Marker handle.
    pub id: MarkerId,
    /// Position, icon and popup.
    pub spec: MarkerSpec,
    /// Whether the popup is currently open.
    pub popup_open: bool,
}

/// A camera flight that has been requested but has not landed yet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraAnimation {
    /// Destination center.
    pub target: LatLng,
    /// Destination zoom.
    pub zoom: f64,
    /// Options the flight was requested with.
    pub options: FlyToOptions,
}

#[derive(Debug, Clone)]
struct ClusterLayerState {
    options: ClusterOptions,
    markers: Vec<MarkerSpec>,
}

/// Serializable view of the whole map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSnapshot {
    /// Current zoom.
    pub zoom: f64,
    /// Current center.
    pub center: LatLng,
    /// Flight in progress, if any.
    pub animation: Option<CameraAnimation>,
    /// Cluster layers and their markers.
    pub layers: Vec<LayerSnapshot>,
    /// Standalone markers.
    pub markers: Vec<PlacedMarker>,
    /// Number of registered listeners.
    pub listeners: usize,
}

/// Serializable view of one cluster layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSnapshot {
    /// Layer handle.
    pub id: LayerId,
    /// Construction options.
    pub options: ClusterOptions,
    /// Markers currently in the layer.
    pub markers: Vec<MarkerSpec>,
}

/// In-memory [`MapBackend`].
#[derive(Debug, Clone)]
pub struct HeadlessMap {
    zoom: f64,
    center: LatLng,
    animation: Option<CameraAnimation>,
    layers: BTreeMap<LayerId, ClusterLayerState>,
    markers: BTreeMap<MarkerId, PlacedMarker>,
    listeners: BTreeMap<ListenerId, MapEventKind>,
    next_id: u64,
    zoom_end_pending: bool,
    layers_created: usize,
    clear_count: usize,
    peak_markers: usize,
    failure: Option<String>,
}

impl Default for HeadlessMap {
    fn default() -> Self {
        Self::new(LatLng::new(0.0, 0.0), DEFAULT_ZOOM)
    }
}

impl HeadlessMap {
    /// Create a map centered on `center` at `zoom`.
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            zoom,
            center,
            animation: None,
            layers: BTreeMap::new(),
            markers: BTreeMap::new(),
            listeners: BTreeMap::new(),
            next_id: 1,
            zoom_end_pending: false,
            layers_created: 0,
            clear_count: 0,
            peak_markers: 0,
            failure: None,
        }
    }

    /// Create a map at `zoom`, centered on (0, 0).
    pub fn with_zoom(zoom: f64) -> Self {
        Self::new(LatLng::new(0.0, 0.0), zoom)
    }

    /// Current center.
    pub fn center(&self) -> LatLng {
        self.center
    }

    /// Change the zoom as a user scroll would. Queues a zoom-end event if it changed.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom != self.zoom {
            self.zoom = zoom;
            self.zoom_end_pending = true;
        }
    }

    /// Flight in progress, if any.
    pub fn animation(&self) -> Option<&CameraAnimation> {
        self.animation.as_ref()
    }

    /// Land the current flight. Returns `false` if nothing was in flight.
    pub fn finish_animation(&mut self) -> bool {
        match self.animation.take() {
            Some(animation) => {
                self.center = animation.target;
                self.set_zoom(animation.zoom);
                true
            }
            None => false,
        }
    }

    /// Take the listeners that should be notified of a pending zoom-end.
    ///
    /// Returns an empty list if no zoom change happened since the last call.
    pub fn drain_zoom_end(&mut self) -> Vec<ListenerId> {
        if !std::mem::take(&mut self.zoom_end_pending) {
            return Vec::new();
        }
        self.listeners
            .iter()
            .filter(|(_, kind)| **kind == MapEventKind::ZoomEnd)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of live cluster layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Total cluster layers ever created.
    pub fn layers_created(&self) -> usize {
        self.layers_created
    }

    /// Total `clear_layer` calls.
    pub fn clear_count(&self) -> usize {
        self.clear_count
    }

    /// Markers in a cluster layer.
    pub fn layer_markers(&self, layer: LayerId) -> Option<&[MarkerSpec]> {
        self.layers.get(&layer).map(|l| l.markers.as_slice())
    }

    /// Markers across all cluster layers.
    pub fn clustered_markers(&self) -> Vec<&MarkerSpec> {
        self.layers.values().flat_map(|l| l.markers.iter()).collect()
    }

    /// Standalone markers, oldest first.
    pub fn markers(&self) -> impl Iterator<Item = &PlacedMarker> {
        self.markers.values()
    }

    /// Look up a standalone marker.
    pub fn marker(&self, id: MarkerId) -> Option<&PlacedMarker> {
        self.markers.get(&id)
    }

    /// Most standalone markers ever on the map at once.
    pub fn peak_marker_count(&self) -> usize {
        self.peak_markers
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Make every mutating call fail with `reason` until [`Self::recover`].
    pub fn fail_with(&mut self, reason: impl Into<String>) {
        self.failure = Some(reason.into());
    }

    /// Stop injecting failures.
    pub fn recover(&mut self) {
        self.failure = None;
    }

    /// Serializable view of the map.
    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            zoom: self.zoom,
            center: self.center,
            animation: self.animation,
            layers: self
                .layers
                .iter()
                .map(|(id, layer)| LayerSnapshot {
                    id: *id,
                    options: layer.options,
                    markers: layer.markers.clone(),
                })
                .collect(),
            markers: self.markers.values().cloned().collect(),
            listeners: self.listeners.len(),
        }
    }

    fn check(&self) -> Result<(), MapError> {
        match &self.failure {
            Some(reason) => Err(MapError::Backend(reason.clone())),
            None => Ok(()),
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl MapBackend for HeadlessMap {
    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn create_cluster_layer(&mut self, options: ClusterOptions) -> Result<LayerId, MapError> {
        self.check()?;
        let id = LayerId(self.next_id());
        self.layers.insert(
            id,
            ClusterLayerState {
                options,
                markers: Vec::new(),
            },
        );
        self.layers_created += 1;
        Ok(id)
    }

    fn clear_layer(&mut self, layer: LayerId) -> Result<(), MapError> {
        self.check()?;
        let state = self
            .layers
            .get_mut(&layer)
            .ok_or(MapError::UnknownLayer(layer))?;
        state.markers.clear();
        self.clear_count += 1;
        Ok(())
    }

    fn add_to_layer(&mut self, layer: LayerId, marker: MarkerSpec) -> Result<(), MapError> {
        self.check()?;
        self.layers
            .get_mut(&layer)
            .ok_or(MapError::UnknownLayer(layer))?
            .markers
            .push(marker);
        Ok(())
    }

    fn place_marker(
        &mut self,
        marker: MarkerSpec,
        open_popup: bool,
    ) -> Result<MarkerId, MapError> {
        self.check()?;
        let id = MarkerId(self.next_id());
        let popup_open = open_popup && marker.popup.is_some();
        // Leaflet keeps a single open popup per map.
        if popup_open {
            for placed in self.markers.values_mut() {
                placed.popup_open = false;
            }
        }
        self.markers.insert(
            id,
            PlacedMarker {
                id,
                spec: marker,
                popup_open,
            },
        );
        self.peak_markers = self.peak_markers.max(self.markers.len());
        Ok(id)
    }

    fn remove_marker(&mut self, marker: MarkerId) -> Result<(), MapError> {
        self.check()?;
        self.markers
            .remove(&marker)
            .map(|_| ())
            .ok_or(MapError::UnknownMarker(marker))
    }

    fn fly_to(
        &mut self,
        target: LatLng,
        zoom: f64,
        options: FlyToOptions,
    ) -> Result<(), MapError> {
        self.check()?;
        if options.animate {
            // A new flight re-targets any flight in progress.
            self.animation = Some(CameraAnimation {
                target,
                zoom,
                options,
            });
        } else {
            self.animation = None;
            self.center = target;
            self.set_zoom(zoom);
        }
        Ok(())
    }

    fn subscribe(&mut self, event: MapEventKind) -> Result<ListenerId, MapError> {
        self.check()?;
        let id = ListenerId(self.next_id());
        self.listeners.insert(id, event);
        Ok(id)
    }

    fn unsubscribe(&mut self, listener: ListenerId) -> Result<(), MapError> {
        self.check()?;
        self.listeners
            .remove(&listener)
            .map(|_| ())
            .ok_or(MapError::UnknownListener(listener))
    }
}
