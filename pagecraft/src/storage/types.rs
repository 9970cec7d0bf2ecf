//! Core types for template storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// Requested item not found in storage
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O error during storage operation
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid page path, asset path or identifier
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Transport failure talking to the backend
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with something that is not the expected JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned {status}: {message}")]
    Backend {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// File size exceeds limit
    #[error("File size {actual} exceeds limit of {limit} bytes")]
    FileSizeExceeded {
        /// Actual file size
        actual: u64,
        /// Maximum allowed size
        limit: u64,
    },

    /// Generic storage error
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Serialized editor state for one page
///
/// `components` and `styles` are opaque JSON strings produced by the editor.
/// `html` and `css` hold the editor's exported markup at save time and are
/// what render mode injects.
///
/// # Examples
///
/// ```rust
/// use pagecraft::storage::TemplateContent;
///
/// let content = TemplateContent::new(r#"[{"type":"text"}]"#, "[]");
/// let raw = content.to_json().unwrap();
/// assert_eq!(TemplateContent::parse(&raw).unwrap(), content);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TemplateContent {
    /// Stringified component tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<String>,

    /// Stringified style rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<String>,

    /// Exported page markup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    /// Exported page stylesheet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
}

impl TemplateContent {
    /// Creates content from a component tree and style rules
    #[must_use]
    pub fn new(components: impl Into<String>, styles: impl Into<String>) -> Self {
        Self {
            components: Some(components.into()),
            styles: Some(styles.into()),
            html: None,
            css: None,
        }
    }

    /// Attaches the exported markup and stylesheet
    #[must_use]
    pub fn with_export(mut self, html: impl Into<String>, css: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self.css = Some(css.into());
        self
    }

    /// Parses a stored content blob
    ///
    /// # Errors
    ///
    /// Returns the JSON error if `raw` is not a content object.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Serializes the content into the blob stored inside a [`PageRecord`]
    ///
    /// # Errors
    ///
    /// Returns the JSON error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Whether the component tree is present and non-empty
    #[must_use]
    pub fn has_components(&self) -> bool {
        self.components.as_deref().is_some_and(|c| !c.is_empty())
    }
}

/// Wire body of a save request: `{ "data": { components, styles } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveRequest {
    /// The template being saved
    pub data: TemplateContent,
}

/// Wire body of a load response: `{ "content": "..." }` or `{}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadResponse {
    /// Stored content blob, absent when the page was never saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Persisted record for one page, keyed by its path
///
/// A collection of these is the data set render mode works from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRecord {
    /// Page path (e.g. `/index`)
    pub name: String,

    /// Stringified [`TemplateContent`]
    pub content: String,

    /// Last save time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PageRecord {
    /// Creates a record without a timestamp
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            updated_at: None,
        }
    }
}

/// One entry of a theme manifest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Block folder name (e.g. `hero1`)
    pub folder: String,

    /// Block HTML source
    pub source: String,
}

impl ManifestEntry {
    /// Creates a manifest entry
    #[must_use]
    pub fn new(folder: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            source: source.into(),
        }
    }
}

/// A file that has been uploaded but not yet stored
///
/// # Examples
///
/// ```rust
/// use pagecraft::storage::UploadedFile;
///
/// let file = UploadedFile::new("logo.png", "image/png", vec![0x89, 0x50]);
/// assert_eq!(file.size(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original filename from the upload
    pub filename: String,

    /// MIME content type (e.g., "image/png")
    pub content_type: String,

    /// File data as bytes
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Creates a new uploaded file
    #[must_use]
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Returns the size of the file in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Validates the file size against a maximum limit
    ///
    /// # Errors
    ///
    /// Returns `StorageError::FileSizeExceeded` if the file is larger than `max_bytes`
    pub fn validate_size(&self, max_bytes: u64) -> StorageResult<()> {
        let size = self.size();
        if size > max_bytes {
            return Err(StorageError::FileSizeExceeded {
                actual: size,
                limit: max_bytes,
            });
        }
        Ok(())
    }
}

/// Backend description of a stored asset, added to the editor's asset library
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetDescriptor {
    /// URL the asset can be fetched from
    pub url: String,

    /// Original filename
    pub name: String,

    /// MIME content type
    #[serde(rename = "type")]
    pub content_type: String,

    /// Size in bytes
    pub size: u64,
}

impl fmt::Display for AssetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Asset(name={}, url={}, size={})", self.name, self.url, self.size)
    }
}
