//! In-memory storage backend for tests

use crate::storage::{
    AssetDescriptor, ManifestEntry, StorageError, StorageResult, TemplateContent, TemplateStorage,
    UploadedFile,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    pages: Mutex<HashMap<String, String>>,
    themes: Mutex<HashMap<String, Vec<ManifestEntry>>>,
    delays: Mutex<HashMap<String, Duration>>,
    fail_uploads: AtomicBool,
    saved: Notify,
}

/// Storage keeping everything in memory
///
/// Clones share the same data, so a test can keep a handle after giving
/// one to the code under test.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Inner>,
}

impl MemoryStorage {
    /// Registers a theme manifest
    pub fn add_theme(&self, folder: &str, manifest: Vec<ManifestEntry>) {
        self.inner.themes.lock().insert(folder.to_string(), manifest);
    }

    /// Delays manifest fetches of a theme
    pub fn delay_theme(&self, folder: &str, delay: Duration) {
        self.inner.delays.lock().insert(folder.to_string(), delay);
    }

    /// Stores a raw content blob without going through `save_template`
    pub fn insert_raw(&self, page_path: &str, raw: &str) {
        self.inner
            .pages
            .lock()
            .insert(page_path.to_string(), raw.to_string());
    }

    /// Raw content blob of a page
    #[must_use]
    pub fn raw(&self, page_path: &str) -> Option<String> {
        self.inner.pages.lock().get(page_path).cloned()
    }

    /// Parsed content of a page
    #[must_use]
    pub fn saved_content(&self, page_path: &str) -> Option<TemplateContent> {
        self.raw(page_path)
            .and_then(|raw| TemplateContent::parse(&raw).ok())
    }

    /// Makes every following upload fail
    pub fn fail_uploads(&self) {
        self.inner.fail_uploads.store(true, Ordering::SeqCst);
    }

    /// Waits for the next save (or returns at once if one happened unobserved)
    pub async fn wait_for_save(&self) {
        self.inner.saved.notified().await;
    }
}

#[async_trait]
impl TemplateStorage for MemoryStorage {
    async fn load_template(&self, page_path: &str) -> StorageResult<Option<String>> {
        Ok(self.raw(page_path))
    }

    async fn save_template(&self, page_path: &str, content: &TemplateContent) -> StorageResult<()> {
        let raw = content.to_json()?;
        self.insert_raw(page_path, &raw);
        self.inner.saved.notify_one();
        Ok(())
    }

    async fn upload_file(&self, file: UploadedFile) -> StorageResult<Vec<AssetDescriptor>> {
        if self.inner.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::Backend {
                status: 500,
                message: "upload rejected".to_string(),
            });
        }
        Ok(vec![AssetDescriptor {
            url: format!("/uploads/{}", file.filename),
            size: file.size(),
            name: file.filename,
            content_type: file.content_type,
        }])
    }

    async fn load_theme(&self, theme_folder: &str) -> StorageResult<Vec<ManifestEntry>> {
        let delay = self.inner.delays.lock().get(theme_folder).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.inner
            .themes
            .lock()
            .get(theme_folder)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("theme {theme_folder}")))
    }
}
