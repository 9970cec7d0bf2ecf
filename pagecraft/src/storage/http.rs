//! HTTP client for the builder API

use super::traits::TemplateStorage;
use super::types::{
    AssetDescriptor, LoadResponse, ManifestEntry, SaveRequest, StorageError, StorageResult,
    TemplateContent, UploadedFile,
};
use super::urls::Endpoint;
use async_trait::async_trait;
use reqwest::{multipart, Client, Response, Url};
use std::time::Duration;

/// Multipart field name the builder API reads uploads from
pub const UPLOAD_FIELD: &str = "file-0";

/// Storage backend that talks to a builder API over HTTP
///
/// In standalone mode requests go to `http://localhost:<port>`. In embedded
/// mode the API lives on the host application's origin, which must be
/// supplied with [`HttpTemplateStorage::with_origin`].
///
/// # Examples
///
/// ```rust
/// use pagecraft::storage::{Endpoint, HttpTemplateStorage};
///
/// let storage = HttpTemplateStorage::with_origin(
///     Endpoint::embedded(),
///     "https://example.com",
/// ).unwrap();
/// assert_eq!(
///     storage.resolve(&storage.endpoint().theme_url("preline")).unwrap().as_str(),
///     "https://example.com/api/builder/handle?type=theme&name=preline",
/// );
/// ```
#[derive(Debug, Clone)]
pub struct HttpTemplateStorage {
    client: Client,
    endpoint: Endpoint,
    origin: Option<Url>,
}

impl HttpTemplateStorage {
    /// Creates a client for `endpoint` without a host origin
    ///
    /// Sufficient for standalone endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: Endpoint) -> StorageResult<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            endpoint,
            origin: None,
        })
    }

    /// Creates a client that resolves embedded URLs against `origin`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPath` if `origin` is not an absolute URL.
    pub fn with_origin(endpoint: Endpoint, origin: &str) -> StorageResult<Self> {
        let origin = Url::parse(origin)
            .map_err(|e| StorageError::InvalidPath(format!("invalid origin {origin}: {e}")))?;
        let mut storage = Self::new(endpoint)?;
        storage.origin = Some(origin);
        Ok(storage)
    }

    /// Endpoint this client talks to
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Turns a URL produced by [`Endpoint`] into an absolute request URL
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPath` for a relative URL without an origin.
    pub fn resolve(&self, url: &str) -> StorageResult<Url> {
        let parsed = match &self.origin {
            Some(origin) if !self.endpoint.standalone => origin.join(url),
            _ => Url::parse(url),
        };
        parsed.map_err(|e| StorageError::InvalidPath(format!("cannot resolve {url}: {e}")))
    }

    async fn check(response: Response) -> StorageResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(StorageError::Backend {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl TemplateStorage for HttpTemplateStorage {
    async fn load_template(&self, page_path: &str) -> StorageResult<Option<String>> {
        let url = self.resolve(&self.endpoint.template_url(page_path))?;
        tracing::debug!(%url, "loading template");

        let response = Self::check(self.client.get(url).send().await?).await?;
        let body: LoadResponse = response.json().await?;
        Ok(body.content)
    }

    async fn save_template(&self, page_path: &str, content: &TemplateContent) -> StorageResult<()> {
        let url = self.resolve(&self.endpoint.template_url(page_path))?;
        tracing::debug!(%url, "saving template");

        let body = SaveRequest {
            data: content.clone(),
        };
        Self::check(self.client.post(url).json(&body).send().await?).await?;
        Ok(())
    }

    async fn upload_file(&self, file: UploadedFile) -> StorageResult<Vec<AssetDescriptor>> {
        let url = self.resolve(&self.endpoint.upload_url())?;
        tracing::debug!(%url, filename = %file.filename, size = file.size(), "uploading asset");

        let part = multipart::Part::bytes(file.data)
            .file_name(file.filename)
            .mime_str(&file.content_type)?;
        let form = multipart::Form::new().part(UPLOAD_FIELD, part);

        let response = Self::check(self.client.post(url).multipart(form).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn load_theme(&self, theme_folder: &str) -> StorageResult<Vec<ManifestEntry>> {
        let url = self.resolve(&self.endpoint.theme_url(theme_folder))?;
        tracing::debug!(%url, "loading theme manifest");

        let response = Self::check(self.client.get(url).send().await?).await?;
        Ok(response.json().await?)
    }
}
