//! Integration tests for the vessel overlay.
//!
//! These tests verify the complete overlay flow against a headless map:
//! - vessel list → cluster layer with zoom-dependent icons and popups
//! - selection → highlight marker, camera flight, enlarged cluster icon
//! - zoom-end notifications → rebuild at the new size
//! - the async driver with several producers
//!
//! Run with: `cargo test --test overlay_integration`

use std::time::Duration;

use vesselmap::config::ConfigFile;
use vesselmap::highlight::{HighlightState, HighlightTransition};
use vesselmap::icon::{IconAsset, RenderableIcon};
use vesselmap::map::{HeadlessMap, LatLng, MarkerSpec, SharedMap};
use vesselmap::overlay::{OverlayConfig, OverlayDriver, OverlayEvent, VesselOverlay};
use vesselmap::sync::IdentityKey;
use vesselmap::vessel::{SelectedVessel, Vessel};

// ============================================================================
// Helper Functions
// ============================================================================

/// A small fleet near Rotterdam.
fn fleet() -> Vec<Vessel> {
    vec![
        Vessel::at(51.95, 4.05)
            .named("Alpha")
            .with_imo(9_321_483)
            .with_heading(90.0)
            .with_speed(12.0),
        Vessel::at(51.90, 4.20).named("Beta").with_speed(0.0),
        Vessel::at(51.88, 4.30).named("Gamma").with_heading(270.0),
        // No position: must never reach the map.
        Vessel {
            lat: None,
            ..Vessel::at(0.0, 0.0).named("Ghost")
        },
    ]
}

fn select(name: &str, lat: f64, lng: f64) -> OverlayEvent {
    OverlayEvent::SelectionChanged(Some(SelectedVessel::new(name, lat, lng)))
}

/// Find the clustered marker at a position.
fn cluster_marker_at<'a>(map: &'a HeadlessMap, position: LatLng) -> &'a MarkerSpec {
    map.clustered_markers()
        .into_iter()
        .find(|m| m.position == position)
        .unwrap_or_else(|| panic!("no clustered marker at {}", position))
}

fn size(icon: &RenderableIcon) -> (f64, f64) {
    (icon.width(), icon.height())
}

// ============================================================================
// Integration Tests
// ============================================================================

/// A vessel list lands on the map as one cluster layer.
#[test]
fn test_initial_render() {
    let mut map = HeadlessMap::with_zoom(16.0);
    let mut overlay = VesselOverlay::new(&mut map, OverlayConfig::default()).with_vessels(fleet());

    let outcome = overlay.attach().unwrap();
    assert_eq!(outcome.report.placed, 3);
    assert_eq!(outcome.report.skipped, 1);
    assert_eq!(outcome.report.revision, 1);

    let map = overlay.map();
    assert_eq!(map.layer_count(), 1);

    let alpha = cluster_marker_at(map, LatLng::new(51.95, 4.05));
    assert_eq!(size(&alpha.icon), (25.0, 50.0));
    match &alpha.icon {
        RenderableIcon::Image {
            asset, rotation_deg, ..
        } => {
            assert_eq!(*asset, IconAsset::Vessel);
            assert_eq!(*rotation_deg, 90.0);
        }
        other => panic!("expected image icon, got {:?}", other),
    }

    let popup = alpha.popup.as_deref().unwrap();
    assert!(popup.contains("Alpha"));
    assert!(popup.contains("9321483"));
    assert!(popup.contains("12 kn"));

    let beta = cluster_marker_at(map, LatLng::new(51.90, 4.20));
    assert!(beta.popup.as_deref().unwrap().contains("Berth"));
}

/// Selecting Alpha enlarges its cluster icon, places the highlight and flies.
/// Selecting Beta replaces the highlight.
#[test]
fn test_selection_scenario() {
    let mut map = HeadlessMap::with_zoom(16.0);
    let mut overlay = VesselOverlay::new(&mut map, OverlayConfig::default()).with_vessels(vec![
        Vessel::at(1.0, 1.0).named("Alpha").with_heading(90.0),
        Vessel::at(2.0, 2.0).named("Beta"),
    ]);
    overlay.attach().unwrap();

    let outcome = overlay.handle(select("Alpha", 1.0, 1.0)).unwrap();
    let Some(HighlightTransition::Placed { marker: alpha_marker }) = outcome.transition else {
        panic!("expected Placed, got {:?}", outcome.transition);
    };

    {
        let map = overlay.map();
        let cluster = cluster_marker_at(map, LatLng::new(1.0, 1.0));
        assert_eq!(size(&cluster.icon), (37.5, 75.0));
        assert_eq!(
            size(&cluster_marker_at(map, LatLng::new(2.0, 2.0)).icon),
            (25.0, 50.0)
        );

        let highlight = map.marker(alpha_marker).unwrap();
        assert_eq!(highlight.spec.position, LatLng::new(1.0, 1.0));
        assert!(highlight.popup_open);

        let flight = map.animation().unwrap();
        assert_eq!(flight.target, LatLng::new(1.0, 1.0));
        assert_eq!(flight.zoom, 15.0);
        assert_eq!(flight.options.duration, Duration::from_secs(1));
    }

    let outcome = overlay.handle(select("Beta", 2.0, 2.0)).unwrap();
    let Some(HighlightTransition::Replaced { previous, marker }) = outcome.transition else {
        panic!("expected Replaced, got {:?}", outcome.transition);
    };
    assert_eq!(previous, alpha_marker);

    let map = overlay.map();
    assert!(map.marker(alpha_marker).is_none());
    assert_eq!(map.markers().count(), 1);
    assert_eq!(map.marker(marker).unwrap().spec.position, LatLng::new(2.0, 2.0));
    assert_eq!(
        size(&cluster_marker_at(map, LatLng::new(1.0, 1.0)).icon),
        (25.0, 50.0)
    );
}

/// The camera landing fires zoom-end; the rebuild picks up the new zoom.
#[test]
fn test_camera_flight_triggers_rebuild() {
    let mut map = HeadlessMap::with_zoom(8.0);
    let mut overlay = VesselOverlay::new(&mut map, OverlayConfig::default()).with_vessels(fleet());
    overlay.attach().unwrap();

    overlay.handle(select("Gamma", 51.88, 4.30)).unwrap();
    let before = overlay.revision();

    assert!(overlay.map_mut().finish_animation());
    let listeners = overlay.map_mut().drain_zoom_end();
    for listener in listeners {
        overlay.on_map_event(listener).unwrap();
    }

    assert_eq!(overlay.revision(), before + 1);
    let gamma = cluster_marker_at(overlay.map(), LatLng::new(51.88, 4.30));
    // Zoom 15 sits in the (14.75, 15] band, selected.
    assert_eq!(size(&gamma.icon), (30.0, 67.5));
}

/// Repeating a rebuild with identical inputs yields an identical layer.
#[test]
fn test_rebuild_is_idempotent() {
    let mut map = HeadlessMap::with_zoom(12.0);
    let mut overlay = VesselOverlay::new(&mut map, OverlayConfig::default()).with_vessels(fleet());
    overlay.attach().unwrap();
    let first = overlay.map().snapshot();

    overlay.handle(OverlayEvent::ZoomEnd).unwrap();
    let second = overlay.map().snapshot();

    assert_eq!(first.layers, second.layers);
    assert_eq!(overlay.map().layers_created(), 1);
}

/// Name identity: two vessels sharing a name are both drawn selected.
#[test]
fn test_identity_by_name_matches_duplicates() {
    let mut config = ConfigFile::default();
    config.selection.identity = IdentityKey::Name;

    let vessels = vec![
        Vessel::at(1.0, 1.0).named("Twin").with_imo(1),
        Vessel::at(2.0, 2.0).named("Twin").with_imo(2),
    ];
    let mut selected = SelectedVessel::new("Twin", 1.0, 1.0);
    selected.imo = Some(1);

    let mut map = HeadlessMap::with_zoom(16.0);
    let mut overlay = VesselOverlay::new(&mut map, config.overlay_config())
        .with_vessels(vessels.clone())
        .with_selection(Some(selected.clone()));
    assert_eq!(overlay.attach().unwrap().report.selected, 2);
    drop(overlay);

    // The default IMO identity tells them apart.
    let mut map = HeadlessMap::with_zoom(16.0);
    let mut overlay = VesselOverlay::new(&mut map, OverlayConfig::default())
        .with_vessels(vessels)
        .with_selection(Some(selected));
    assert_eq!(overlay.attach().unwrap().report.selected, 1);
}

/// Detach leaves no listener and no highlight behind.
#[test]
fn test_teardown() {
    let mut map = HeadlessMap::with_zoom(16.0);
    {
        let mut overlay =
            VesselOverlay::new(&mut map, OverlayConfig::default()).with_vessels(fleet());
        overlay.attach().unwrap();
        overlay.handle(select("Alpha", 51.95, 4.05)).unwrap();
        assert!(matches!(
            overlay.highlight(),
            HighlightState::Highlighted { .. }
        ));
    }

    assert_eq!(map.listener_count(), 0);
    assert_eq!(map.markers().count(), 0);
    // The cluster layer belongs to the map and survives the overlay.
    assert_eq!(map.clustered_markers().len(), 3);
}

/// Several producers feed one driver; the final state reflects the last
/// vessel list and the last selection.
#[tokio::test]
async fn test_driver_end_to_end() {
    let shared = SharedMap::new(HeadlessMap::with_zoom(16.0));
    let mut overlay = VesselOverlay::new(shared.clone(), OverlayConfig::default());
    overlay.attach().unwrap();
    let driver = OverlayDriver::spawn(overlay);

    let feed = driver.handle();
    let ui = driver.handle();

    feed.send(OverlayEvent::VesselsUpdated(fleet())).unwrap();
    feed.flush().await.unwrap();

    ui.send(select("Alpha", 51.95, 4.05)).unwrap();
    let outcome = ui.flush().await.unwrap().unwrap();
    assert_eq!(outcome.report.selected, 1);

    {
        let mut map = shared.lock();
        map.finish_animation();
        map.set_zoom(10.0);
        assert_eq!(map.drain_zoom_end().len(), 1);
    }
    feed.send(OverlayEvent::ZoomEnd).unwrap();
    feed.flush().await.unwrap();

    {
        let map = shared.lock();
        let alpha = cluster_marker_at(&map, LatLng::new(51.95, 4.05));
        // (9.75, 10.75] band is 10x15, selected ×1.5.
        assert_eq!(size(&alpha.icon), (15.0, 22.5));
    }

    let overlay = driver.shutdown().await.unwrap();
    assert_eq!(overlay.vessels().len(), 4);
    assert_eq!(shared.lock().listener_count(), 0);
}
