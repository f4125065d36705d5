//! INI parsing: `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [cluster] section
    if let Some(section) = ini.section(Some("cluster")) {
        if let Some(v) = section.get("radius") {
            config.cluster.radius = v.trim().parse().map_err(|_| {
                invalid(
                    "cluster",
                    "radius",
                    v,
                    "must be a non-negative integer (pixels)",
                )
            })?;
        }
    }

    // [camera] section
    if let Some(section) = ini.section(Some("camera")) {
        if let Some(v) = section.get("fly_to_zoom") {
            let zoom: f64 = v
                .trim()
                .parse()
                .map_err(|_| invalid("camera", "fly_to_zoom", v, "must be a number"))?;
            if !zoom.is_finite() || zoom < 0.0 {
                return Err(invalid(
                    "camera",
                    "fly_to_zoom",
                    v,
                    "must be a finite, non-negative zoom level",
                ));
            }
            config.camera.fly_to_zoom = zoom;
        }
        if let Some(v) = section.get("fly_to_duration_ms") {
            config.camera.fly_to_duration_ms = v.trim().parse().map_err(|_| {
                invalid(
                    "camera",
                    "fly_to_duration_ms",
                    v,
                    "must be a non-negative integer (milliseconds)",
                )
            })?;
        }
        if let Some(v) = section.get("animate") {
            config.camera.animate = parse_bool(v)
                .ok_or_else(|| invalid("camera", "animate", v, "must be true or false"))?;
        }
    }

    // [selection] section
    if let Some(section) = ini.section(Some("selection")) {
        if let Some(v) = section.get("identity") {
            config.selection.identity = v
                .parse()
                .map_err(|_| invalid("selection", "identity", v, "must be 'imo' or 'name'"))?;
        }
    }

    // [assets] section
    if let Some(section) = ini.section(Some("assets")) {
        if let Some(v) = section.get("vessel_icon") {
            config.assets.vessel_icon = non_empty("assets", "vessel_icon", v)?;
        }
        if let Some(v) = section.get("berth_icon") {
            config.assets.berth_icon = non_empty("assets", "berth_icon", v)?;
        }
    }

    // [links] section
    if let Some(section) = ini.section(Some("links")) {
        if let Some(v) = section.get("detail_base") {
            // An empty base yields root-relative links ("/<name>").
            config.links.detail_base = v.trim().to_string();
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            config.logging.file = non_empty("logging", "file", v)?;
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn non_empty(section: &str, key: &str, value: &str) -> Result<String, ConfigFileError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid(section, key, value, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Expand a leading `~` to the home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
