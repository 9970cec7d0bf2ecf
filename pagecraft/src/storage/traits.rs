//! Template storage trait definitions

use super::types::{AssetDescriptor, ManifestEntry, StorageResult, TemplateContent, UploadedFile};
use async_trait::async_trait;

/// Uniform storage API used by the editor and the lifecycle controller
///
/// Two backends implement it:
/// - [`HttpTemplateStorage`](super::HttpTemplateStorage) talks to a builder
///   API over HTTP (standalone server or the host's own origin)
/// - [`LocalTemplateStorage`](super::LocalTemplateStorage) reads and writes
///   the on-disk layout directly and backs the builder API itself
///
/// # Examples
///
/// ```rust,no_run
/// use pagecraft::storage::{Endpoint, HttpTemplateStorage, TemplateContent, TemplateStorage};
///
/// # async fn example() -> anyhow::Result<()> {
/// let storage = HttpTemplateStorage::new(Endpoint::standalone(12785))?;
///
/// storage.save_template("/index", &TemplateContent::new("[]", "[]")).await?;
/// let raw = storage.load_template("/index").await?;
/// assert!(raw.is_some());
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemplateStorage: Send + Sync {
    /// Loads the stored content blob for a page
    ///
    /// Returns `Ok(None)` when nothing was saved for `page_path` yet. That is
    /// the normal "not yet built" state, not an error.
    ///
    /// # Errors
    ///
    /// Transport, backend and JSON failures are returned as-is.
    async fn load_template(&self, page_path: &str) -> StorageResult<Option<String>>;

    /// Replaces the stored template of a page
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects or cannot persist the content.
    async fn save_template(&self, page_path: &str, content: &TemplateContent) -> StorageResult<()>;

    /// Stores one uploaded file and returns the backend's descriptors for it
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails; nothing is stored in that case.
    async fn upload_file(&self, file: UploadedFile) -> StorageResult<Vec<AssetDescriptor>>;

    /// Loads the block manifest of a theme folder
    ///
    /// # Errors
    ///
    /// Returns an error if the theme cannot be read.
    async fn load_theme(&self, theme_folder: &str) -> StorageResult<Vec<ManifestEntry>>;
}
