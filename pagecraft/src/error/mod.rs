//! Error types and error handling
//!
//! Each module has its own error enum; [`PagecraftError`] aggregates them
//! and maps them onto HTTP responses for the builder API.

use crate::catalog::CatalogError;
use crate::editor::EditorError;
use crate::lifecycle::LifecycleError;
use crate::render::RenderError;
use crate::storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum PagecraftError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bad request error
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Not Found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request body over the configured limit (413)
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Storage error
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Theme catalog error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Editor error
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// Lifecycle error
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Rendering error
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl PagecraftError {
    /// HTTP status for this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Storage(err) => storage_status(err),
            Self::Catalog(CatalogError::ThemeOutOfRange { .. }) => StatusCode::BAD_REQUEST,
            Self::Catalog(CatalogError::Storage(err)) => storage_status(err),
            Self::Config(_) | Self::Editor(_) | Self::Lifecycle(_) | Self::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

const fn storage_status(err: &StorageError) -> StatusCode {
    match err {
        StorageError::NotFound(_) => StatusCode::NOT_FOUND,
        StorageError::InvalidPath(_) => StatusCode::BAD_REQUEST,
        StorageError::FileSizeExceeded { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for PagecraftError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
