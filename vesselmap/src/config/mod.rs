//! User configuration loaded from `~/.vesselmap/config.ini`.
//!
//! Every key is optional; absent keys keep their defaults. The parsed
//! [`ConfigFile`] converts into the runtime types the overlay consumes:
//!
//! ```
//! use vesselmap::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! let overlay = config.overlay_config();
//! assert_eq!(overlay.sync.cluster_radius_px, 30);
//! assert_eq!(overlay.camera.fly_to_zoom, 15.0);
//! ```

mod file;
mod parser;
mod settings;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    AssetSettings, CameraSettings, ClusterSettings, ConfigFile, LinkSettings, LoggingSettings,
    SelectionSettings, DEFAULT_FLY_TO_DURATION_MS,
};
