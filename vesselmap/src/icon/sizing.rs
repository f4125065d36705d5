//! Icon sizing policy: zoom level and selection state to icon dimensions.
//!
//! The zoom axis is split into bands by a fixed, descending threshold table.
//! The first threshold the zoom strictly exceeds picks the base dimensions;
//! anything at or below the lowest threshold gets the fallback dot.
//!
//! ```text
//! zoom:   ≤6   6   7.75  8.75  9.75  10.75  11.5  12.75  13.75  14.75  15    23
//!        ─┼────┼────┼─────┼─────┼─────┼──────┼─────┼──────┼──────┼──────┼─────┼──►
//!        7x7  8x8  7x8   7x10  10x15 15x20  15x25 17x30  20x35  20x45  25x50 35x60
//!        point────┘ small──────────────────────────────────────┘ medium large XL
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Multiplier applied to both dimensions when the vessel is selected.
pub const SELECTED_SCALE: f64 = 1.5;

/// Visual category of a vessel icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconKind {
    /// Plain dot, used when zoomed far out.
    Point,
    /// Small rotated vessel image.
    Small,
    /// Medium rotated vessel image.
    Medium,
    /// Large rotated vessel image.
    Large,
    /// Closest zoom; rendered with the berth image.
    ExtraLarge,
}

impl IconKind {
    /// Stable lowercase name, as used in config and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            IconKind::Point => "point",
            IconKind::Small => "small",
            IconKind::Medium => "medium",
            IconKind::Large => "large",
            IconKind::ExtraLarge => "extra-large",
        }
    }
}

impl fmt::Display for IconKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved icon dimensions and category for one zoom/selection state.
///
/// Dimensions are in CSS pixels. They are floating point because the
/// selection multiplier produces half pixels (e.g. 25 × 1.5 = 37.5).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IconSpec {
    /// Icon width in pixels.
    pub width: f64,
    /// Icon height in pixels.
    pub height: f64,
    /// Icon category.
    pub kind: IconKind,
}

impl IconSpec {
    /// Create a new icon spec.
    pub const fn new(width: f64, height: f64, kind: IconKind) -> Self {
        Self {
            width,
            height,
            kind,
        }
    }

    /// Return this spec scaled for a selected vessel. Kind is unchanged.
    pub fn selected(self) -> Self {
        Self {
            width: self.width * SELECTED_SCALE,
            height: self.height * SELECTED_SCALE,
            kind: self.kind,
        }
    }
}

impl fmt::Display for IconSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.kind)
    }
}

/// One row of the threshold table: zoom strictly above `above` uses `spec`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomBand {
    /// Exclusive lower bound of the band.
    pub above: f64,
    /// Unselected icon spec for the band.
    pub spec: IconSpec,
}

const fn band(above: f64, width: f64, height: f64, kind: IconKind) -> ZoomBand {
    ZoomBand {
        above,
        spec: IconSpec::new(width, height, kind),
    }
}

/// Threshold table, highest zoom first. Evaluated top-down.
pub const ZOOM_BANDS: [ZoomBand; 11] = [
    band(23.0, 35.0, 60.0, IconKind::ExtraLarge),
    band(15.0, 25.0, 50.0, IconKind::Large),
    band(14.75, 20.0, 45.0, IconKind::Medium),
    band(13.75, 20.0, 35.0, IconKind::Small),
    band(12.75, 17.0, 30.0, IconKind::Small),
    band(11.5, 15.0, 25.0, IconKind::Small),
    band(10.75, 15.0, 20.0, IconKind::Small),
    band(9.75, 10.0, 15.0, IconKind::Small),
    band(8.75, 7.0, 10.0, IconKind::Small),
    band(7.75, 7.0, 8.0, IconKind::Small),
    band(6.0, 8.0, 8.0, IconKind::Point),
];

/// Spec for zoom at or below the lowest threshold (and for NaN).
const FALLBACK: IconSpec = IconSpec::new(7.0, 7.0, IconKind::Point);

/// Resolve the icon spec for a zoom level and selection state.
///
/// Pure and total: every `f64`, including NaN and infinities, maps to a spec.
#[inline]
pub fn size_for(zoom: f64, selected: bool) -> IconSpec {
    let base = ZOOM_BANDS
        .iter()
        .find(|band| zoom > band.above)
        .map(|band| band.spec)
        .unwrap_or(FALLBACK);

    if selected {
        base.selected()
    } else {
        base
    }
}
