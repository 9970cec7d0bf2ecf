//! Storage gateway for page templates, theme manifests and assets
//!
//! A single [`TemplateStorage`] trait covers the four backend operations
//! (load, save, upload, theme manifest). The URL builders in [`urls`] pick
//! the backend: an empty prefix for embedded mode, `http://localhost:<port>`
//! for standalone mode.
//!
//! # Examples
//!
//! ```rust
//! use pagecraft::storage::{asset_url, base_url};
//!
//! assert_eq!(base_url(false), "");
//! assert_eq!(
//!     asset_url(true, "/uploads/a.png"),
//!     "http://localhost:12785/api/builder/handle?type=asset&path=/uploads/a.png",
//! );
//! ```

pub mod http;
pub mod local;
pub mod traits;
pub mod types;
pub mod urls;

pub use http::HttpTemplateStorage;
pub use local::LocalTemplateStorage;
pub use traits::TemplateStorage;
pub use types::{
    AssetDescriptor, LoadResponse, ManifestEntry, PageRecord, SaveRequest, StorageError,
    StorageResult, TemplateContent, UploadedFile,
};
pub use urls::{asset_url, base_url, theme_url, Endpoint, DEFAULT_API_PATH, DEFAULT_STANDALONE_PORT};

#[cfg(test)]
pub use traits::MockTemplateStorage;
