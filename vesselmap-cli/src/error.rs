//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;

use vesselmap::config::ConfigFileError;
use vesselmap::overlay::OverlayError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(std::io::Error),
    /// Configuration error
    Config(ConfigFileError),
    /// Failed to read an input file
    FileRead { path: PathBuf, error: std::io::Error },
    /// Input file is not the expected JSON
    JsonParse {
        path: PathBuf,
        error: serde_json::Error,
    },
    /// No vessel in the list has the requested name
    VesselNotFound(String),
    /// The vessel exists but has no usable position
    VesselWithoutPosition(String),
    /// Overlay or map failure
    Overlay(OverlayError),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Failed to serialize output
    Output(serde_json::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::JsonParse { .. } => {
                eprintln!();
                eprintln!("Vessel files are a JSON array of objects, for example:");
                eprintln!(r#"  [{{"name": "Alpha", "lat": 51.95, "lng": 4.05, "heading": 90}}]"#);
            }
            CliError::Config(_) => {
                eprintln!();
                eprintln!("Check the file passed with --config, or ~/.vesselmap/config.ini");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::FileRead { path, error } => {
                write!(f, "Failed to read '{}': {}", path.display(), error)
            }
            CliError::JsonParse { path, error } => {
                write!(f, "Invalid JSON in '{}': {}", path.display(), error)
            }
            CliError::VesselNotFound(name) => write!(f, "No vessel named '{}'", name),
            CliError::VesselWithoutPosition(name) => {
                write!(f, "Vessel '{}' has no position and cannot be selected", name)
            }
            CliError::Overlay(e) => write!(f, "Overlay error: {}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Output(e) => write!(f, "Failed to write output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::LoggingInit(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::FileRead { error, .. } => Some(error),
            CliError::JsonParse { error, .. } => Some(error),
            CliError::Overlay(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<OverlayError> for CliError {
    fn from(e: OverlayError) -> Self {
        CliError::Overlay(e)
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}
