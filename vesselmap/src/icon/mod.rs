//! Zoom-adaptive vessel icons.
//!
//! Icon selection happens in two steps:
//!
//! ```text
//! (zoom, selected) ──► size_for() ──► IconSpec ──► render(spec, heading) ──► RenderableIcon
//!                      (sizing)                    (render)
//! ```
//!
//! Both steps are pure. Attaching the rendered icon to a map is the caller's
//! job (see [`crate::sync`] and [`crate::highlight`]).
//!
//! # Example
//!
//! ```
//! use vesselmap::icon::{render, size_for, IconKind, RenderableIcon};
//!
//! let spec = size_for(16.0, true);
//! assert_eq!(spec.kind, IconKind::Large);
//! assert_eq!((spec.width, spec.height), (37.5, 75.0));
//!
//! let icon = render(&spec, Some(90.0));
//! assert!(matches!(icon, RenderableIcon::Image { rotation_deg, .. } if rotation_deg == 90.0));
//! ```

mod render;
mod sizing;

pub use render::{
    render, IconAsset, IconAssets, PopupAnchor, RenderableIcon, DEFAULT_BERTH_ICON,
    DEFAULT_VESSEL_ICON,
};
pub use sizing::{size_for, IconKind, IconSpec, ZoomBand, SELECTED_SCALE, ZOOM_BANDS};
