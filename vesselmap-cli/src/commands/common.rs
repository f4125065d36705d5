//! Shared helpers for CLI commands.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use vesselmap::vessel::{SelectedVessel, Vessel};

use crate::error::CliError;

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let content = std::fs::read_to_string(path).map_err(|error| CliError::FileRead {
        path: path.to_path_buf(),
        error,
    })?;
    serde_json::from_str(&content).map_err(|error| CliError::JsonParse {
        path: path.to_path_buf(),
        error,
    })
}

/// Load a vessel list from a JSON array.
pub fn load_vessels(path: &Path) -> Result<Vec<Vessel>, CliError> {
    read_json(path)
}

/// Find a vessel by name.
pub fn find_vessel<'a>(vessels: &'a [Vessel], name: &str) -> Result<&'a Vessel, CliError> {
    vessels
        .iter()
        .find(|v| v.name.as_deref() == Some(name))
        .ok_or_else(|| CliError::VesselNotFound(name.to_string()))
}

/// Build the selection for a vessel by name.
pub fn select_vessel(vessels: &[Vessel], name: &str) -> Result<SelectedVessel, CliError> {
    let vessel = find_vessel(vessels, name)?;
    SelectedVessel::from_vessel(vessel)
        .ok_or_else(|| CliError::VesselWithoutPosition(name.to_string()))
}

/// Pretty-print a value as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(CliError::Output)?;
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_vessels() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vessels.json");
        std::fs::write(
            &path,
            r#"[{"name": "Alpha", "lat": 1.0, "lng": 1.0, "imo": 9321483}, {"name": "Drifter"}]"#,
        )
        .unwrap();

        let vessels = load_vessels(&path).unwrap();
        assert_eq!(vessels.len(), 2);
        assert_eq!(vessels[0].imo, Some(9_321_483));
        assert!(vessels[1].lat.is_none());
    }

    #[test]
    fn test_load_vessels_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load_vessels(&missing),
            Err(CliError::FileRead { .. })
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            load_vessels(&broken),
            Err(CliError::JsonParse { .. })
        ));
    }

    #[test]
    fn test_select_vessel() {
        let vessels = vec![
            Vessel::at(1.0, 2.0).named("Alpha"),
            Vessel {
                lat: None,
                ..Vessel::at(0.0, 0.0).named("Drifter")
            },
        ];

        let selected = select_vessel(&vessels, "Alpha").unwrap();
        assert_eq!((selected.lat, selected.lng), (1.0, 2.0));

        assert!(matches!(
            select_vessel(&vessels, "Drifter"),
            Err(CliError::VesselWithoutPosition(_))
        ));
        assert!(matches!(
            select_vessel(&vessels, "Nobody"),
            Err(CliError::VesselNotFound(_))
        ));
    }
}
