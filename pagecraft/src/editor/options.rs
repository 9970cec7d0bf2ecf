//! Startup options handed to the embedded editor

use super::selectors::escape_name;
use super::upload::AssetUploader;
use crate::config::EditorSettings;
use crate::storage::AssetDescriptor;
use serde::Serialize;

/// Storage manager options; the core handles persistence itself
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StorageManagerOptions {
    /// Let the editor load stored data on its own
    pub autoload: bool,
}

/// Selector manager options
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorManagerOptions {
    /// Applied by the editor to every class name it registers
    #[serde(skip)]
    pub escape_name: fn(&str) -> String,
}

impl Default for SelectorManagerOptions {
    fn default() -> Self {
        Self { escape_name }
    }
}

impl SelectorManagerOptions {
    /// Escapes one class name
    #[must_use]
    pub fn escape(&self, name: &str) -> String {
        (self.escape_name)(name)
    }
}

/// Asset manager options
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetManagerOptions {
    /// Editor-side storage type (unused, persistence goes through the gateway)
    pub storage_type: String,

    /// Trigger a store after each asset change
    pub store_on_change: bool,

    /// Trigger a store after each upload
    pub store_after_upload: bool,

    /// Assets preloaded into the library
    pub assets: Vec<AssetDescriptor>,

    /// Upload handler; `None` leaves uploads at the editor default
    #[serde(skip)]
    pub uploader: Option<AssetUploader>,
}

impl Default for AssetManagerOptions {
    fn default() -> Self {
        Self {
            storage_type: String::new(),
            store_on_change: true,
            store_after_upload: true,
            assets: Vec::new(),
            uploader: None,
        }
    }
}

/// Complete editor startup options
///
/// # Examples
///
/// ```rust
/// use pagecraft::editor::EditorOptions;
///
/// let options = EditorOptions::default();
/// let json = serde_json::to_value(&options).unwrap();
/// assert_eq!(json["container"], "#gjs");
/// assert_eq!(json["storageManager"]["autoload"], false);
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorOptions {
    /// CSS selector of the mount element
    pub container: String,

    /// Editor height
    pub height: String,

    /// Storage manager options
    pub storage_manager: StorageManagerOptions,

    /// Show the device switcher
    pub show_devices: bool,

    /// Enable the traits editor
    pub traits_editor: bool,

    /// Selector manager options
    pub selector_manager: SelectorManagerOptions,

    /// Asset manager options
    pub asset_manager: AssetManagerOptions,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self::from_settings(&EditorSettings::default())
    }
}

impl EditorOptions {
    /// Options from the `[editor]` configuration section
    #[must_use]
    pub fn from_settings(settings: &EditorSettings) -> Self {
        Self {
            container: settings.container.clone(),
            height: settings.height.clone(),
            storage_manager: StorageManagerOptions { autoload: false },
            show_devices: settings.show_devices,
            traits_editor: settings.traits_editor,
            selector_manager: SelectorManagerOptions::default(),
            asset_manager: AssetManagerOptions::default(),
        }
    }

    /// Whether uploads are wired to the storage gateway
    #[must_use]
    pub const fn uploads_enabled(&self) -> bool {
        self.asset_manager.uploader.is_some()
    }
}
