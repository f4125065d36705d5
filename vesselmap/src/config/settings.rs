//! Configuration structs and their defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::highlight::{CameraConfig, DEFAULT_FLY_TO_ZOOM};
use crate::icon::{IconAssets, DEFAULT_BERTH_ICON, DEFAULT_VESSEL_ICON};
use crate::logging::{default_log_dir, default_log_file};
use crate::overlay::OverlayConfig;
use crate::popup::{PopupFormatter, DEFAULT_DETAIL_BASE};
use crate::sync::{IdentityKey, SyncConfig, DEFAULT_CLUSTER_RADIUS_PX};

/// Default fly-to duration in milliseconds.
pub const DEFAULT_FLY_TO_DURATION_MS: u64 = 1000;

/// Contents of `config.ini`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    pub cluster: ClusterSettings,
    pub camera: CameraSettings,
    pub selection: SelectionSettings,
    pub assets: AssetSettings,
    pub links: LinkSettings,
    pub logging: LoggingSettings,
}

/// `[cluster]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSettings {
    /// Maximum cluster radius in pixels.
    pub radius: u32,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            radius: DEFAULT_CLUSTER_RADIUS_PX,
        }
    }
}

/// `[camera]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraSettings {
    pub fly_to_zoom: f64,
    pub fly_to_duration_ms: u64,
    pub animate: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fly_to_zoom: DEFAULT_FLY_TO_ZOOM,
            fly_to_duration_ms: DEFAULT_FLY_TO_DURATION_MS,
            animate: true,
        }
    }
}

/// `[selection]` section.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectionSettings {
    /// How list entries are matched against the selection.
    pub identity: IdentityKey,
}

/// `[assets]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetSettings {
    pub vessel_icon: String,
    pub berth_icon: String,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            vessel_icon: DEFAULT_VESSEL_ICON.to_string(),
            berth_icon: DEFAULT_BERTH_ICON.to_string(),
        }
    }
}

/// `[links]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSettings {
    /// Base path of the per-vessel detail page.
    pub detail_base: String,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            detail_base: DEFAULT_DETAIL_BASE.to_string(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(default_log_dir()),
            file: default_log_file().to_string(),
        }
    }
}

impl ConfigFile {
    /// Camera behaviour derived from `[camera]`.
    pub fn camera_config(&self) -> CameraConfig {
        CameraConfig {
            fly_to_zoom: self.camera.fly_to_zoom,
            fly_to_duration: Duration::from_millis(self.camera.fly_to_duration_ms),
            animate: self.camera.animate,
        }
    }

    /// Runtime overlay configuration.
    pub fn overlay_config(&self) -> OverlayConfig {
        OverlayConfig {
            sync: SyncConfig {
                cluster_radius_px: self.cluster.radius,
                identity: self.selection.identity,
                popups: PopupFormatter::new(self.links.detail_base.as_str()),
            },
            camera: self.camera_config(),
        }
    }

    /// Icon image paths from `[assets]`.
    pub fn icon_assets(&self) -> IconAssets {
        IconAssets {
            vessel: self.assets.vessel_icon.clone(),
            berth: self.assets.berth_icon.clone(),
        }
    }
}
