//! Vessel overlay: the single owner of one map's vessel markers.
//!
//! `VesselOverlay` ties the [`MarkerSynchronizer`] and the
//! [`HighlightController`] to one [`MapBackend`] and is the only thing that
//! mutates them. Triggers are queued and applied in batches:
//!
//! ```text
//! submit(ZoomEnd) ─┐
//! submit(Vessels) ─┼──► pending ──► process() ──► [highlight transition] ──► rebuild
//! submit(Select)  ─┘               (coalesce:     (last selection only)      (exactly once,
//!                                   latest wins)                              revision + 1)
//! ```
//!
//! Because every mutation goes through `&mut self`, a rebuild always runs
//! clear-then-repopulate to completion before the next batch starts. Hosts
//! with several producers use the async [`OverlayDriver`], which funnels
//! events from any number of [`OverlayHandle`]s into one overlay.
//!
//! # Example
//!
//! ```
//! use vesselmap::map::HeadlessMap;
//! use vesselmap::overlay::{OverlayConfig, OverlayEvent, VesselOverlay};
//! use vesselmap::vessel::{SelectedVessel, Vessel};
//!
//! let mut map = HeadlessMap::with_zoom(16.0);
//! let mut overlay = VesselOverlay::new(&mut map, OverlayConfig::default());
//! overlay.attach().unwrap();
//!
//! overlay.submit(OverlayEvent::VesselsUpdated(vec![
//!     Vessel::at(1.0, 1.0).named("Alpha"),
//! ]));
//! overlay.submit(OverlayEvent::SelectionChanged(Some(SelectedVessel::new("Alpha", 1.0, 1.0))));
//! let outcome = overlay.process().unwrap().unwrap();
//! assert_eq!(outcome.report.selected, 1);
//!
//! overlay.detach().unwrap();
//! ```

mod driver;

pub use driver::{OverlayDriver, OverlayHandle};

use std::collections::VecDeque;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::highlight::{CameraConfig, HighlightController, HighlightState, HighlightTransition};
use crate::map::{LayerId, ListenerId, MapBackend, MapError, MapEventKind};
use crate::sync::{MarkerSynchronizer, SyncConfig, SyncReport};
use crate::vessel::{SelectedVessel, Vessel};

/// Errors surfaced by the overlay.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlayError {
    /// The map backend rejected an operation.
    #[error(transparent)]
    Map(#[from] MapError),

    /// The async driver is no longer running.
    #[error("Overlay driver has shut down")]
    DriverClosed,

    /// The async driver task panicked or was cancelled.
    #[error("Overlay driver task failed: {0}")]
    DriverFailed(String),
}

/// Runtime configuration for a [`VesselOverlay`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayConfig {
    /// Cluster layer and popup settings.
    pub sync: SyncConfig,
    /// Camera behaviour on selection.
    pub camera: CameraConfig,
}

/// A trigger for the overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    /// The viewport finished zooming.
    ZoomEnd,
    /// A fresh vessel list replaced the old one.
    VesselsUpdated(Vec<Vessel>),
    /// The selection changed (or was cleared with `None`).
    SelectionChanged(Option<SelectedVessel>),
}

/// Result of one processed batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProcessOutcome {
    /// Events folded into this batch.
    pub events: usize,
    /// Highlight transition, if the batch changed the selection.
    pub transition: Option<HighlightTransition>,
    /// The rebuild that closed the batch.
    pub report: SyncReport,
}

/// Owns the vessel markers of one map.
pub struct VesselOverlay<M: MapBackend> {
    map: M,
    sync: MarkerSynchronizer,
    highlight: HighlightController,
    vessels: Vec<Vessel>,
    selected: Option<SelectedVessel>,
    listener: Option<ListenerId>,
    pending: VecDeque<OverlayEvent>,
}

impl<M: MapBackend> std::fmt::Debug for VesselOverlay<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VesselOverlay")
            .field("vessels", &self.vessels.len())
            .field("selected", &self.selected.as_ref().map(|s| &s.name))
            .field("listener", &self.listener)
            .field("pending", &self.pending.len())
            .field("revision", &self.sync.revision())
            .finish_non_exhaustive()
    }
}

impl<M: MapBackend> VesselOverlay<M> {
    /// Create a detached overlay over `map` with no vessels.
    pub fn new(map: M, config: OverlayConfig) -> Self {
        let highlight = HighlightController::new(config.camera, config.sync.popups.clone());
        Self {
            map,
            sync: MarkerSynchronizer::new(config.sync),
            highlight,
            vessels: Vec::new(),
            selected: None,
            listener: None,
            pending: VecDeque::new(),
        }
    }

    /// Start with a vessel list, applied on [`Self::attach`].
    pub fn with_vessels(mut self, vessels: Vec<Vessel>) -> Self {
        self.vessels = vessels;
        self
    }

    /// Start with a selection, highlighted on [`Self::attach`].
    pub fn with_selection(mut self, selected: Option<SelectedVessel>) -> Self {
        self.selected = selected;
        self
    }

    /// Subscribe to zoom-end and perform the initial rebuild.
    ///
    /// A preset selection is highlighted first. Calling this on an attached
    /// overlay only rebuilds.
    pub fn attach(&mut self) -> Result<ProcessOutcome, OverlayError> {
        let first = self.listener.is_none();
        if first {
            let listener = self.map.subscribe(MapEventKind::ZoomEnd)?;
            debug!(%listener, "Overlay attached");
            self.listener = Some(listener);
        }

        let transition = match (&self.selected, first) {
            (Some(selected), true) => {
                Some(self.highlight.on_selection_change(&mut self.map, Some(selected))?)
            }
            _ => None,
        };
        let report = self.rebuild()?;

        Ok(ProcessOutcome {
            events: 0,
            transition,
            report,
        })
    }

    /// Unsubscribe from the map and remove the highlight marker.
    ///
    /// The cluster layer stays on the map; it belongs to the map's lifetime.
    pub fn detach(&mut self) -> Result<(), OverlayError> {
        let unsubscribed = match self.listener.take() {
            Some(listener) => {
                debug!(%listener, "Overlay detached");
                self.map.unsubscribe(listener)
            }
            None => Ok(()),
        };
        let released = self.highlight.release(&mut self.map);

        unsubscribed?;
        released?;
        Ok(())
    }

    /// Whether the zoom-end listener is registered.
    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }

    /// The zoom-end listener, while attached.
    pub fn listener(&self) -> Option<ListenerId> {
        self.listener
    }

    /// Queue a trigger for the next [`Self::process`].
    pub fn submit(&mut self, event: OverlayEvent) {
        self.pending.push_back(event);
    }

    /// Number of queued triggers.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Apply every queued trigger as one batch.
    ///
    /// The last vessel list and the last selection in the queue win; any
    /// earlier ones are discarded without touching the map. The batch ends
    /// with exactly one rebuild. Returns `None` when nothing was queued.
    ///
    /// The selection is committed only once its highlight is on the map. If
    /// the map fails, the unfinished work stays queued for the next call.
    pub fn process(&mut self) -> Result<Option<ProcessOutcome>, OverlayError> {
        if self.pending.is_empty() {
            return Ok(None);
        }

        let mut events = 0;
        let mut vessels = None;
        let mut selection = None;
        for event in self.pending.drain(..) {
            events += 1;
            match event {
                OverlayEvent::ZoomEnd => {}
                OverlayEvent::VesselsUpdated(list) => vessels = Some(list),
                OverlayEvent::SelectionChanged(selected) => selection = Some(selected),
            }
        }

        if let Some(list) = vessels {
            self.vessels = list;
        }

        let transition = match selection {
            Some(selected) => {
                match self.highlight.on_selection_change(&mut self.map, selected.as_ref()) {
                    Ok(transition) => {
                        self.selected = selected;
                        Some(transition)
                    }
                    Err(e) => {
                        // Retried, with its rebuild, on the next batch.
                        self.pending.push_front(OverlayEvent::SelectionChanged(selected));
                        return Err(e.into());
                    }
                }
            }
            None => None,
        };

        let report = match self.rebuild() {
            Ok(report) => report,
            Err(e) => {
                self.pending.push_front(OverlayEvent::ZoomEnd);
                return Err(e);
            }
        };
        if events > 1 {
            debug!(events, revision = report.revision, "Coalesced overlay triggers");
        }

        Ok(Some(ProcessOutcome {
            events,
            transition,
            report,
        }))
    }

    /// Submit one trigger and process the queue.
    pub fn handle(&mut self, event: OverlayEvent) -> Result<ProcessOutcome, OverlayError> {
        self.submit(event);
        // The queue is non-empty, so a batch always runs.
        self.process().map(|outcome| outcome.unwrap_or_default())
    }

    /// Route a map event notification to the overlay.
    ///
    /// Notifications for listeners other than this overlay's are ignored.
    pub fn on_map_event(
        &mut self,
        listener: ListenerId,
    ) -> Result<Option<ProcessOutcome>, OverlayError> {
        if self.listener != Some(listener) {
            return Ok(None);
        }
        self.handle(OverlayEvent::ZoomEnd).map(Some)
    }

    /// The map backend.
    pub fn map(&self) -> &M {
        &self.map
    }

    /// Mutable access to the map backend.
    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    /// Current vessel list.
    pub fn vessels(&self) -> &[Vessel] {
        &self.vessels
    }

    /// Current selection.
    pub fn selected(&self) -> Option<&SelectedVessel> {
        self.selected.as_ref()
    }

    /// Highlight state.
    pub fn highlight(&self) -> &HighlightState {
        self.highlight.state()
    }

    /// The cluster layer, once created.
    pub fn layer(&self) -> Option<LayerId> {
        self.sync.layer()
    }

    /// Revision of the last rebuild.
    pub fn revision(&self) -> u64 {
        self.sync.revision()
    }

    fn rebuild(&mut self) -> Result<SyncReport, OverlayError> {
        let zoom = self.map.zoom();
        let report = self
            .sync
            .sync(&mut self.map, &self.vessels, zoom, self.selected.as_ref())?;
        Ok(report)
    }
}

impl<M: MapBackend> Drop for VesselOverlay<M> {
    fn drop(&mut self) {
        if self.listener.is_some() {
            if let Err(e) = self.detach() {
                warn!(error = %e, "Overlay teardown failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::HeadlessMap;

    fn fleet() -> Vec<Vessel> {
        vec![
            Vessel::at(1.0, 1.0).named("Alpha").with_heading(90.0),
            Vessel::at(2.0, 2.0).named("Beta"),
        ]
    }

    #[test]
    fn test_attach_subscribes_and_rebuilds() {
        let mut map = HeadlessMap::with_zoom(12.0);
        {
            let mut overlay =
                VesselOverlay::new(&mut map, OverlayConfig::default()).with_vessels(fleet());
            let outcome = overlay.attach().unwrap();
            assert_eq!(outcome.report.placed, 2);
            assert!(outcome.transition.is_none());
            assert!(overlay.is_attached());
            assert_eq!(overlay.map().listener_count(), 1);
        }
        // Dropping the overlay releases the listener.
        assert_eq!(map.listener_count(), 0);
    }

    #[test]
    fn test_attach_with_preset_selection_highlights() {
        let mut map = HeadlessMap::with_zoom(16.0);
        let mut overlay = VesselOverlay::new(&mut map, OverlayConfig::default())
            .with_vessels(fleet())
            .with_selection(Some(SelectedVessel::new("Alpha", 1.0, 1.0)));

        let outcome = overlay.attach().unwrap();
        assert!(matches!(
            outcome.transition,
            Some(HighlightTransition::Placed { .. })
        ));
        assert_eq!(outcome.report.selected, 1);
        assert!(overlay.map().animation().is_some());
    }

    #[test]
    fn test_second_attach_only_rebuilds() {
        let mut map = HeadlessMap::with_zoom(16.0);
        let mut overlay = VesselOverlay::new(&mut map, OverlayConfig::default())
            .with_vessels(fleet())
            .with_selection(Some(SelectedVessel::new("Alpha", 1.0, 1.0)));
        overlay.attach().unwrap();
        let marker = overlay.highlight().marker();
        overlay.map_mut().finish_animation();

        let outcome = overlay.attach().unwrap();
        assert!(outcome.transition.is_none());
        assert_eq!(outcome.report.selected, 1);
        assert!(overlay.map().animation().is_none());
        assert_eq!(overlay.map().markers().count(), 1);
        assert_eq!(overlay.highlight().marker(), marker);
        assert_eq!(overlay.map().listener_count(), 1);
    }

    #[test]
    fn test_batch_coalesces_to_one_rebuild() {
        let mut map = HeadlessMap::with_zoom(16.0);
        let mut overlay = VesselOverlay::new(&mut map, OverlayConfig::default());
        overlay.attach().unwrap();
        let clears_before = overlay.map().clear_count();

        overlay.submit(OverlayEvent::VesselsUpdated(vec![Vessel::at(9.0, 9.0)]));
        overlay.submit(OverlayEvent::SelectionChanged(Some(SelectedVessel::new(
            "Alpha", 1.0, 1.0,
        ))));
        overlay.submit(OverlayEvent::ZoomEnd);
        overlay.submit(OverlayEvent::VesselsUpdated(fleet()));
        overlay.submit(OverlayEvent::SelectionChanged(Some(SelectedVessel::new(
            "Beta", 2.0, 2.0,
        ))));

        let outcome = overlay.process().unwrap().unwrap();
        assert_eq!(outcome.events, 5);
        assert_eq!(overlay.map().clear_count(), clears_before + 1);
        assert_eq!(overlay.vessels().len(), 2);
        assert_eq!(overlay.selected().unwrap().name, "Beta");

        // Only Beta was ever highlighted.
        assert!(matches!(
            outcome.transition,
            Some(HighlightTransition::Placed { .. })
        ));
        assert_eq!(overlay.map().markers().count(), 1);
        assert_eq!(overlay.pending(), 0);
        assert!(overlay.process().unwrap().is_none());
    }

    #[test]
    fn test_zoom_end_rescales_markers() {
        let mut map = HeadlessMap::with_zoom(5.0);
        let mut overlay =
            VesselOverlay::new(&mut map, OverlayConfig::default()).with_vessels(fleet());
        overlay.attach().unwrap();
        assert_eq!(overlay.map().clustered_markers()[0].icon.width(), 7.0);

        overlay.map_mut().set_zoom(16.0);
        let listeners = overlay.map_mut().drain_zoom_end();
        assert_eq!(listeners.len(), 1);
        for listener in listeners {
            overlay.on_map_event(listener).unwrap();
        }
        assert_eq!(overlay.map().clustered_markers()[0].icon.width(), 25.0);
    }

    #[test]
    fn test_foreign_listener_is_ignored() {
        let mut map = HeadlessMap::with_zoom(12.0);
        let mut overlay = VesselOverlay::new(&mut map, OverlayConfig::default());
        overlay.attach().unwrap();
        let revision = overlay.revision();

        assert!(overlay.on_map_event(ListenerId(999)).unwrap().is_none());
        assert_eq!(overlay.revision(), revision);
    }

    #[test]
    fn test_clearing_selection_restores_normal_size() {
        let mut map = HeadlessMap::with_zoom(16.0);
        let mut overlay =
            VesselOverlay::new(&mut map, OverlayConfig::default()).with_vessels(fleet());
        overlay.attach().unwrap();

        overlay
            .handle(OverlayEvent::SelectionChanged(Some(SelectedVessel::new(
                "Alpha", 1.0, 1.0,
            ))))
            .unwrap();
        assert_eq!(overlay.map().clustered_markers()[0].icon.width(), 37.5);

        let outcome = overlay
            .handle(OverlayEvent::SelectionChanged(None))
            .unwrap();
        assert!(matches!(
            outcome.transition,
            Some(HighlightTransition::Cleared { .. })
        ));
        assert_eq!(overlay.map().clustered_markers()[0].icon.width(), 25.0);
        assert_eq!(overlay.map().markers().count(), 0);
    }

    #[test]
    fn test_detach_releases_everything() {
        let mut map = HeadlessMap::with_zoom(16.0);
        let mut overlay = VesselOverlay::new(&mut map, OverlayConfig::default())
            .with_vessels(fleet())
            .with_selection(Some(SelectedVessel::new("Alpha", 1.0, 1.0)));
        overlay.attach().unwrap();

        overlay.detach().unwrap();
        assert!(!overlay.is_attached());
        assert_eq!(overlay.map().listener_count(), 0);
        assert_eq!(overlay.map().markers().count(), 0);
        assert_eq!(overlay.highlight(), &HighlightState::Idle);
    }

    #[test]
    fn test_map_error_surfaces() {
        let mut map = HeadlessMap::with_zoom(12.0);
        let mut overlay = VesselOverlay::new(&mut map, OverlayConfig::default());
        overlay.attach().unwrap();

        overlay.map_mut().fail_with("context lost");
        let err = overlay.handle(OverlayEvent::ZoomEnd).unwrap_err();
        assert_eq!(
            err,
            OverlayError::Map(MapError::Backend("context lost".to_string()))
        );
        overlay.map_mut().recover();
    }

    #[test]
    fn test_failed_selection_change_is_retried() {
        let mut map = HeadlessMap::with_zoom(16.0);
        let mut overlay =
            VesselOverlay::new(&mut map, OverlayConfig::default()).with_vessels(fleet());
        overlay.attach().unwrap();
        overlay
            .handle(OverlayEvent::SelectionChanged(Some(SelectedVessel::new(
                "Alpha", 1.0, 1.0,
            ))))
            .unwrap();

        overlay.map_mut().fail_with("transient");
        let err = overlay
            .handle(OverlayEvent::SelectionChanged(Some(SelectedVessel::new(
                "Beta", 2.0, 2.0,
            ))))
            .unwrap_err();
        assert_eq!(
            err,
            OverlayError::Map(MapError::Backend("transient".to_string()))
        );

        // Nothing is committed until the highlight lands.
        assert_eq!(overlay.selected().unwrap().name, "Alpha");
        assert!(matches!(
            overlay.highlight(),
            HighlightState::Highlighted { vessel, .. } if vessel == "Alpha"
        ));
        assert_eq!(overlay.pending(), 1);

        overlay.map_mut().recover();
        let outcome = overlay.handle(OverlayEvent::ZoomEnd).unwrap();
        assert_eq!(outcome.events, 2);
        assert!(matches!(
            outcome.transition,
            Some(HighlightTransition::Replaced { .. })
        ));
        assert_eq!(overlay.selected().unwrap().name, "Beta");
        assert!(matches!(
            overlay.highlight(),
            HighlightState::Highlighted { vessel, .. } if vessel == "Beta"
        ));
        assert_eq!(overlay.map().markers().count(), 1);

        let widths: Vec<f64> = overlay
            .map()
            .clustered_markers()
            .iter()
            .map(|m| m.icon.width())
            .collect();
        assert_eq!(widths, vec![25.0, 37.5]);
    }

    #[test]
    fn test_failed_rebuild_is_retried() {
        let mut map = HeadlessMap::with_zoom(16.0);
        let mut overlay = VesselOverlay::new(&mut map, OverlayConfig::default());
        overlay.attach().unwrap();

        overlay.map_mut().fail_with("transient");
        assert!(overlay
            .handle(OverlayEvent::VesselsUpdated(fleet()))
            .is_err());
        assert_eq!(overlay.pending(), 1);

        overlay.map_mut().recover();
        let outcome = overlay.process().unwrap().unwrap();
        assert_eq!(outcome.report.placed, 2);
        assert_eq!(overlay.map().clustered_markers().len(), 2);
    }
}
