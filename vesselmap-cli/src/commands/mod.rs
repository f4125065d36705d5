//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`icon`] - Icon size and markup for a zoom level
//! - [`popup`] - Popup HTML for one vessel
//! - [`render`] - One overlay pass on a headless map
//! - [`replay`] - Scripted session through the async driver

pub mod common;
pub mod icon;
pub mod popup;
pub mod render;
pub mod replay;
