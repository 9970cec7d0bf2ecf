//! Asset upload bridge between the editor and the storage gateway

use super::{Editor, EditorError};
use crate::storage::{AssetDescriptor, TemplateStorage, UploadedFile};
use std::fmt;
use std::sync::Arc;

/// Uploads a file through the storage gateway and adds it to an editor's library
///
/// The uploader is created before the editor exists, so the editor is not
/// captured: every call receives it explicitly.
#[derive(Clone)]
pub struct AssetUploader {
    storage: Arc<dyn TemplateStorage>,
}

impl fmt::Debug for AssetUploader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetUploader").finish_non_exhaustive()
    }
}

impl AssetUploader {
    /// Creates an uploader over `storage`
    #[must_use]
    pub fn new(storage: Arc<dyn TemplateStorage>) -> Self {
        Self { storage }
    }

    /// Uploads `file` and adds the returned descriptors to `editor`
    ///
    /// # Errors
    ///
    /// Returns the storage error if the upload fails; the editor's asset
    /// library is left untouched in that case.
    pub async fn upload(
        &self,
        editor: &dyn Editor,
        file: UploadedFile,
    ) -> Result<Vec<AssetDescriptor>, EditorError> {
        let filename = file.filename.clone();
        let assets = self.storage.upload_file(file).await?;
        tracing::debug!(%filename, count = assets.len(), "adding uploaded assets to editor");
        editor.add_assets(assets.clone());
        Ok(assets)
    }
}
