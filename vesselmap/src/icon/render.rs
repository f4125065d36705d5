//! Icon renderer: turns an [`IconSpec`] and a heading into a marker icon.

use serde::{Deserialize, Serialize};

use super::sizing::{IconKind, IconSpec};

/// Default image for every vessel kind except extra-large.
pub const DEFAULT_VESSEL_ICON: &str = "/ship-popup.png";

/// Default image for the extra-large (berth) kind.
pub const DEFAULT_BERTH_ICON: &str = "/BERTH-ICON.PNG";

/// Which image an image icon shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconAsset {
    /// Regular vessel silhouette.
    Vessel,
    /// Berth image shown at the closest zoom.
    Berth,
}

impl IconAsset {
    /// Asset used for a given icon kind.
    pub fn for_kind(kind: IconKind) -> Self {
        match kind {
            IconKind::ExtraLarge => IconAsset::Berth,
            _ => IconAsset::Vessel,
        }
    }
}

/// Image paths for each [`IconAsset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconAssets {
    /// Path of the vessel image.
    pub vessel: String,
    /// Path of the berth image.
    pub berth: String,
}

impl Default for IconAssets {
    fn default() -> Self {
        Self {
            vessel: DEFAULT_VESSEL_ICON.to_string(),
            berth: DEFAULT_BERTH_ICON.to_string(),
        }
    }
}

impl IconAssets {
    /// Resolve the image path for an asset.
    pub fn path(&self, asset: IconAsset) -> &str {
        match asset {
            IconAsset::Vessel => &self.vessel,
            IconAsset::Berth => &self.berth,
        }
    }
}

/// Popup offset relative to the icon anchor, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopupAnchor {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset (negative is up).
    pub y: f64,
}

impl PopupAnchor {
    /// Anchor centered horizontally and raised by half the icon height.
    fn above(height: f64) -> Self {
        Self {
            x: 0.0,
            y: -height / 2.0,
        }
    }
}

/// A renderable marker icon description.
///
/// Constructing one has no side effects; attaching it to a map is up to
/// the [`crate::map::MapBackend`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RenderableIcon {
    /// Plain round dot, never rotated.
    Dot {
        width: f64,
        height: f64,
        popup_anchor: PopupAnchor,
    },
    /// Rotated image.
    Image {
        asset: IconAsset,
        width: f64,
        height: f64,
        rotation_deg: f64,
        popup_anchor: PopupAnchor,
    },
}

impl RenderableIcon {
    /// Icon width in pixels.
    pub fn width(&self) -> f64 {
        match self {
            RenderableIcon::Dot { width, .. } | RenderableIcon::Image { width, .. } => *width,
        }
    }

    /// Icon height in pixels.
    pub fn height(&self) -> f64 {
        match self {
            RenderableIcon::Dot { height, .. } | RenderableIcon::Image { height, .. } => *height,
        }
    }

    /// Where the popup opens relative to the icon.
    pub fn popup_anchor(&self) -> PopupAnchor {
        match self {
            RenderableIcon::Dot { popup_anchor, .. }
            | RenderableIcon::Image { popup_anchor, .. } => *popup_anchor,
        }
    }

    /// HTML fragment for embedding the icon in a web map.
    pub fn markup(&self, assets: &IconAssets) -> String {
        match self {
            RenderableIcon::Dot { width, height, .. } => format!(
                "<div style=\"width: {}px; height: {}px; background-color: red; border-radius: 50%;\"></div>",
                width, height
            ),
            RenderableIcon::Image {
                asset,
                width,
                height,
                rotation_deg,
                ..
            } => format!(
                "<div style=\"transform: rotate({}deg); width: {}px; height: {}px;\">\
                 <img src=\"{}\" style=\"width: 100%; height: 100%;\" /></div>",
                rotation_deg,
                width,
                height,
                assets.path(*asset)
            ),
        }
    }
}

/// Render an icon for a spec and an optional heading in degrees.
///
/// `point` specs become a [`RenderableIcon::Dot`]; everything else becomes a
/// rotated [`RenderableIcon::Image`]. A missing or non-finite heading rotates
/// by 0°.
pub fn render(spec: &IconSpec, heading: Option<f64>) -> RenderableIcon {
    let popup_anchor = PopupAnchor::above(spec.height);

    match spec.kind {
        IconKind::Point => RenderableIcon::Dot {
            width: spec.width,
            height: spec.height,
            popup_anchor,
        },
        kind => RenderableIcon::Image {
            asset: IconAsset::for_kind(kind),
            width: spec.width,
            height: spec.height,
            rotation_deg: heading.filter(|h| h.is_finite()).unwrap_or(0.0),
            popup_anchor,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::size_for;

    #[test]
    fn test_point_renders_dot_without_rotation() {
        let icon = render(&size_for(5.0, false), Some(45.0));
        assert_eq!(
            icon,
            RenderableIcon::Dot {
                width: 7.0,
                height: 7.0,
                popup_anchor: PopupAnchor { x: 0.0, y: -3.5 },
            }
        );
    }

    #[test]
    fn test_extra_large_uses_berth_asset() {
        let icon = render(&size_for(24.0, false), Some(10.0));
        match icon {
            RenderableIcon::Image {
                asset,
                rotation_deg,
                ..
            } => {
                assert_eq!(asset, IconAsset::Berth);
                assert_eq!(rotation_deg, 10.0);
            }
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_other_kinds_use_vessel_asset() {
        for zoom in [8.0, 12.0, 14.9, 16.0] {
            let icon = render(&size_for(zoom, false), None);
            assert!(
                matches!(icon, RenderableIcon::Image { asset: IconAsset::Vessel, .. }),
                "zoom {} should render the vessel image",
                zoom
            );
        }
    }

    #[test]
    fn test_missing_heading_rotates_zero() {
        let spec = size_for(16.0, false);
        let icon = render(&spec, None);
        assert!(matches!(icon, RenderableIcon::Image { rotation_deg, .. } if rotation_deg == 0.0));

        let icon = render(&spec, Some(f64::NAN));
        assert!(matches!(icon, RenderableIcon::Image { rotation_deg, .. } if rotation_deg == 0.0));
    }

    #[test]
    fn test_popup_anchor_is_half_height_above() {
        let icon = render(&size_for(16.0, true), Some(90.0));
        assert_eq!(icon.popup_anchor(), PopupAnchor { x: 0.0, y: -37.5 });
        assert_eq!(icon.width(), 37.5);
        assert_eq!(icon.height(), 75.0);
    }

    #[test]
    fn test_markup_uses_configured_assets() {
        let assets = IconAssets {
            vessel: "/img/ship.png".to_string(),
            berth: "/img/berth.png".to_string(),
        };
        let html = render(&size_for(16.0, false), Some(90.0)).markup(&assets);
        assert!(html.contains("rotate(90deg)"));
        assert!(html.contains("src=\"/img/ship.png\""));
        assert!(html.contains("width: 25px; height: 50px;"));

        let dot = render(&size_for(1.0, false), None).markup(&assets);
        assert!(dot.contains("border-radius: 50%"));
        assert!(!dot.contains("<img"));
    }
}
