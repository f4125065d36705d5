//! Shared handle around a map backend.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::{
    ClusterOptions, FlyToOptions, LatLng, LayerId, ListenerId, MapBackend, MapError,
    MapEventKind, MarkerId, MarkerSpec,
};

/// Cloneable, lockable handle to a [`MapBackend`].
///
/// The async overlay driver needs to own its backend, while the host (or a
/// test) still wants to look at the map and feed it viewport changes. Each
/// trait call takes the lock for the duration of that one call.
///
/// # Example
///
/// ```
/// use vesselmap::map::{HeadlessMap, MapBackend, SharedMap};
///
/// let shared = SharedMap::new(HeadlessMap::with_zoom(10.0));
/// let observer = shared.clone();
///
/// observer.lock().set_zoom(12.0);
/// assert_eq!(shared.zoom(), 12.0);
/// ```
#[derive(Debug, Default)]
pub struct SharedMap<M> {
    inner: Arc<Mutex<M>>,
}

impl<M> Clone for SharedMap<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M> SharedMap<M> {
    /// Wrap a backend.
    pub fn new(map: M) -> Self {
        Self {
            inner: Arc::new(Mutex::new(map)),
        }
    }

    /// Lock the backend for direct access.
    pub fn lock(&self) -> MutexGuard<'_, M> {
        self.inner.lock()
    }
}

impl<M: MapBackend> MapBackend for SharedMap<M> {
    fn zoom(&self) -> f64 {
        self.inner.lock().zoom()
    }

    fn create_cluster_layer(&mut self, options: ClusterOptions) -> Result<LayerId, MapError> {
        self.inner.lock().create_cluster_layer(options)
    }

    fn clear_layer(&mut self, layer: LayerId) -> Result<(), MapError> {
        self.inner.lock().clear_layer(layer)
    }

    fn add_to_layer(&mut self, layer: LayerId, marker: MarkerSpec) -> Result<(), MapError> {
        self.inner.lock().add_to_layer(layer, marker)
    }

    fn place_marker(
        &mut self,
        marker: MarkerSpec,
        open_popup: bool,
    ) -> Result<MarkerId, MapError> {
        self.inner.lock().place_marker(marker, open_popup)
    }

    fn remove_marker(&mut self, marker: MarkerId) -> Result<(), MapError> {
        self.inner.lock().remove_marker(marker)
    }

    fn fly_to(
        &mut self,
        target: LatLng,
        zoom: f64,
        options: FlyToOptions,
    ) -> Result<(), MapError> {
        self.inner.lock().fly_to(target, zoom, options)
    }

    fn subscribe(&mut self, event: MapEventKind) -> Result<ListenerId, MapError> {
        self.inner.lock().subscribe(event)
    }

    fn unsubscribe(&mut self, listener: ListenerId) -> Result<(), MapError> {
        self.inner.lock().unsubscribe(listener)
    }
}
