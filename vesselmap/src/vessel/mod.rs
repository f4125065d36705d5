//! Vessel records as supplied by the surrounding application.
//!
//! The overlay only ever reads these. Every field except the position is
//! optional telemetry and is rendered as a placeholder when absent.

use serde::{Deserialize, Serialize};

use crate::map::LatLng;

/// A vessel as received from upstream (AIS feed, fleet API, etc.).
///
/// `lat` and `lng` are optional because upstream data is frequently
/// incomplete; vessels without both are skipped when rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vessel {
    /// Latitude in degrees.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude in degrees.
    #[serde(default)]
    pub lng: Option<f64>,
    /// Vessel name. Also the key of the detail view.
    #[serde(default)]
    pub name: Option<String>,
    /// IMO number.
    #[serde(default)]
    pub imo: Option<u64>,
    /// Speed over ground in knots.
    #[serde(default)]
    pub speed: Option<f64>,
    /// Heading in degrees (0 = north, clockwise).
    #[serde(default)]
    pub heading: Option<f64>,
    /// Estimated time of arrival, as provided upstream.
    #[serde(default)]
    pub eta: Option<String>,
    /// Destination port, as provided upstream.
    #[serde(default)]
    pub destination: Option<String>,
}

impl Vessel {
    /// Create a vessel at a position with no other telemetry.
    pub fn at(lat: f64, lng: f64) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
            ..Self::default()
        }
    }

    /// Set the name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the IMO number.
    pub fn with_imo(mut self, imo: u64) -> Self {
        self.imo = Some(imo);
        self
    }

    /// Set the heading in degrees.
    pub fn with_heading(mut self, heading: f64) -> Self {
        self.heading = Some(heading);
        self
    }

    /// Set the speed in knots.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Position, if both coordinates are present and finite.
    pub fn position(&self) -> Option<LatLng> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(LatLng::new(lat, lng))
            }
            _ => None,
        }
    }
}

/// The vessel the user selected. Name and position are mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedVessel {
    /// Vessel name.
    pub name: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// IMO number.
    #[serde(default)]
    pub imo: Option<u64>,
    /// Speed over ground in knots.
    #[serde(default)]
    pub speed: Option<f64>,
    /// Heading in degrees.
    #[serde(default)]
    pub heading: Option<f64>,
}

impl SelectedVessel {
    /// Create a selection from a name and position.
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lng,
            imo: None,
            speed: None,
            heading: None,
        }
    }

    /// Build a selection from a vessel record.
    ///
    /// Returns `None` if the vessel has no name or no usable position.
    pub fn from_vessel(vessel: &Vessel) -> Option<Self> {
        let position = vessel.position()?;
        let name = vessel.name.clone()?;
        Some(Self {
            name,
            lat: position.lat,
            lng: position.lng,
            imo: vessel.imo,
            speed: vessel.speed,
            heading: vessel.heading,
        })
    }

    /// Selected position.
    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_requires_both_coordinates() {
        assert!(Vessel::at(1.0, 2.0).position().is_some());

        let mut vessel = Vessel::at(1.0, 2.0);
        vessel.lat = None;
        assert!(vessel.position().is_none());

        let mut vessel = Vessel::at(1.0, 2.0);
        vessel.lng = Some(f64::NAN);
        assert!(vessel.position().is_none());
    }

    #[test]
    fn test_deserialize_sparse_record() {
        let vessel: Vessel = serde_json::from_str(r#"{"lat": 1.5, "name": "Alpha"}"#).unwrap();
        assert_eq!(vessel.lat, Some(1.5));
        assert_eq!(vessel.lng, None);
        assert_eq!(vessel.name.as_deref(), Some("Alpha"));
        assert!(vessel.position().is_none());
    }

    #[test]
    fn test_selected_from_vessel() {
        let vessel = Vessel::at(1.0, 2.0).named("Alpha").with_imo(9_321_483);
        let selected = SelectedVessel::from_vessel(&vessel).unwrap();
        assert_eq!(selected.name, "Alpha");
        assert_eq!(selected.imo, Some(9_321_483));
        assert_eq!(selected.position(), LatLng::new(1.0, 2.0));

        assert!(SelectedVessel::from_vessel(&Vessel::at(1.0, 2.0)).is_none());
    }
}
