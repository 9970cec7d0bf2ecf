//! Local filesystem storage implementation
//!
//! Backs the builder API served by the standalone server (or mounted inside a
//! host application). Layout:
//!
//! ```text
//! <data_dir>/
//! └── pages.json                  # Vec<PageRecord>, keyed by page path
//! <public_dir>/
//! ├── themes/
//! │   └── hyperui/
//! │       ├── hero1/
//! │       │   ├── index.html      # block source
//! │       │   └── preview.png
//! │       └── card2/ ...
//! └── uploads/
//!     └── 55/
//!         └── 550e8400-e29b-41d4-a716-446655440000/
//!             └── logo.png
//! ```

use super::traits::TemplateStorage;
use super::types::{
    AssetDescriptor, ManifestEntry, PageRecord, StorageError, StorageResult, TemplateContent,
    UploadedFile,
};
use super::urls::Endpoint;
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

const PAGES_FILE: &str = "pages.json";
const BLOCK_SOURCE_FILE: &str = "index.html";

/// Local filesystem storage backend
///
/// Page records live in a single JSON file that is rewritten wholesale on
/// every save (write to a temp file, then rename). Saves are serialized so
/// two concurrent saves cannot lose each other's records.
///
/// # Examples
///
/// ```rust,no_run
/// use pagecraft::storage::{Endpoint, LocalTemplateStorage, TemplateContent, TemplateStorage};
/// use std::path::PathBuf;
///
/// # async fn example() -> anyhow::Result<()> {
/// let storage = LocalTemplateStorage::new(
///     PathBuf::from("./data"),
///     PathBuf::from("./public"),
///     Endpoint::standalone(12785),
/// )?;
///
/// storage.save_template("/index", &TemplateContent::new("[]", "[]")).await?;
/// let pages = storage.load_all().await?;
/// assert_eq!(pages[0].name, "/index");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalTemplateStorage {
    /// Directory holding `pages.json`
    data_dir: PathBuf,

    /// Directory served through `type=asset` (themes and uploads)
    public_dir: PathBuf,

    /// Endpoint used to build URLs of uploaded assets
    endpoint: Endpoint,

    /// Serializes read-modify-write cycles on the pages file
    write_lock: Arc<Mutex<()>>,
}

impl LocalTemplateStorage {
    /// Creates a new local storage instance
    ///
    /// Directories are created lazily on first write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPath` if either path exists but is not a directory.
    pub fn new(data_dir: PathBuf, public_dir: PathBuf, endpoint: Endpoint) -> StorageResult<Self> {
        for dir in [&data_dir, &public_dir] {
            if dir.exists() && !dir.is_dir() {
                return Err(StorageError::InvalidPath(format!(
                    "{} is not a directory",
                    dir.display()
                )));
            }
        }

        Ok(Self {
            data_dir,
            public_dir,
            endpoint,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Path of the pages file
    fn pages_path(&self) -> PathBuf {
        self.data_dir.join(PAGES_FILE)
    }

    /// Gets the directory of an uploaded file, prefixed by the first 2 chars of its id
    fn upload_directory(&self, id: &str) -> PathBuf {
        let prefix = &id[..2.min(id.len())];
        self.public_dir.join("uploads").join(prefix).join(id)
    }

    /// Loads every stored page record
    ///
    /// This is the data set handed to render mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the pages file exists but cannot be read or parsed.
    pub async fn load_all(&self) -> StorageResult<Vec<PageRecord>> {
        let path = self.pages_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&json)?)
    }

    async fn write_all(&self, records: &[PageRecord]) -> StorageResult<()> {
        fs::create_dir_all(&self.data_dir).await?;

        let json = serde_json::to_string_pretty(records)?;
        let tmp = self.data_dir.join(format!(".{PAGES_FILE}.tmp"));
        let mut f = fs::File::create(&tmp).await?;
        f.write_all(json.as_bytes()).await?;
        f.flush().await?;
        drop(f);

        fs::rename(&tmp, self.pages_path()).await?;
        Ok(())
    }

    /// Resolves an asset path below the public directory
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPath` for paths escaping the public directory.
    pub fn resolve_asset_path(&self, asset_path: &str) -> StorageResult<PathBuf> {
        let mut resolved = self.public_dir.clone();
        for component in Path::new(asset_path).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::RootDir | Component::CurDir => {}
                Component::ParentDir | Component::Prefix(_) => {
                    return Err(StorageError::InvalidPath(asset_path.to_string()));
                }
            }
        }
        if resolved == self.public_dir {
            return Err(StorageError::InvalidPath(asset_path.to_string()));
        }
        Ok(resolved)
    }

    /// Reads an asset and guesses its content type from the extension
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the asset does not exist.
    pub async fn read_asset(&self, asset_path: &str) -> StorageResult<(Vec<u8>, String)> {
        let path = self.resolve_asset_path(asset_path)?;
        if !path.is_file() {
            return Err(StorageError::NotFound(asset_path.to_string()));
        }
        let data = fs::read(&path).await?;
        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok((data, content_type))
    }
}

fn validate_page_path(page_path: &str) -> StorageResult<()> {
    if page_path.trim().is_empty() {
        return Err(StorageError::InvalidPath("empty page path".to_string()));
    }
    Ok(())
}

/// Accepts a single plain path segment (theme folder, upload filename)
fn plain_segment(name: &str) -> StorageResult<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) => part
            .to_str()
            .ok_or_else(|| StorageError::InvalidPath(name.to_string())),
        _ => Err(StorageError::InvalidPath(name.to_string())),
    }
}

#[async_trait]
impl TemplateStorage for LocalTemplateStorage {
    async fn load_template(&self, page_path: &str) -> StorageResult<Option<String>> {
        validate_page_path(page_path)?;
        let records = self.load_all().await?;
        Ok(records
            .into_iter()
            .find(|record| record.name == page_path)
            .map(|record| record.content))
    }

    async fn save_template(&self, page_path: &str, content: &TemplateContent) -> StorageResult<()> {
        validate_page_path(page_path)?;
        let serialized = content.to_json()?;

        let _guard = self.write_lock.lock().await;
        let mut records = self.load_all().await?;
        let record = PageRecord {
            name: page_path.to_string(),
            content: serialized,
            updated_at: Some(Utc::now()),
        };

        // Overwritten wholesale, never merged
        match records.iter_mut().find(|r| r.name == page_path) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        self.write_all(&records).await?;

        tracing::info!(page = page_path, pages = records.len(), "template saved");
        Ok(())
    }

    async fn upload_file(&self, file: UploadedFile) -> StorageResult<Vec<AssetDescriptor>> {
        let filename = plain_segment(&file.filename)?.to_string();

        let id = Uuid::new_v4().to_string();
        let dir = self.upload_directory(&id);
        fs::create_dir_all(&dir).await?;

        let mut f = fs::File::create(dir.join(&filename)).await?;
        f.write_all(&file.data).await?;
        f.flush().await?;

        let prefix = &id[..2];
        let asset = AssetDescriptor {
            url: self
                .endpoint
                .asset_url(&format!("/uploads/{prefix}/{id}/{filename}")),
            name: filename,
            content_type: file.content_type.clone(),
            size: file.size(),
        };
        tracing::info!(%asset, "asset uploaded");
        Ok(vec![asset])
    }

    async fn load_theme(&self, theme_folder: &str) -> StorageResult<Vec<ManifestEntry>> {
        let folder = plain_segment(theme_folder)?;
        let dir = self.public_dir.join("themes").join(folder);
        if !dir.is_dir() {
            return Err(StorageError::NotFound(format!("theme {theme_folder}")));
        }

        let mut entries = Vec::new();
        let mut read_dir = fs::read_dir(&dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            if !entry.metadata().await?.is_dir() {
                continue;
            }
            let source_path = entry.path().join(BLOCK_SOURCE_FILE);
            if !source_path.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let source = fs::read_to_string(&source_path).await?;
            entries.push(ManifestEntry::new(name, source));
        }

        // Directory order is platform dependent
        entries.sort_by(|a, b| a.folder.cmp(&b.folder));
        Ok(entries)
    }
}
