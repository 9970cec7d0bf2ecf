//! pagecraft CLI library

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

pub mod commands;

pub use commands::{ExportCommand, ServeCommand, ThemesCommand};

use anyhow::Result;
use pagecraft::config::PagecraftConfig;
use std::path::Path;

/// Service name used for configuration lookup
pub const SERVICE_NAME: &str = "pagecraft";

/// Loads configuration from an explicit file or the standard locations
///
/// # Errors
///
/// Returns an error if the configuration cannot be extracted.
pub fn load_config(path: Option<&Path>) -> Result<PagecraftConfig> {
    match path {
        Some(path) => PagecraftConfig::load_from(&path.to_string_lossy()),
        None => PagecraftConfig::load_for_service(SERVICE_NAME),
    }
}
