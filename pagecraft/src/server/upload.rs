//! Multipart extractor for builder uploads

use crate::error::PagecraftError;
use crate::storage::http::UPLOAD_FIELD;
use crate::storage::UploadedFile;
use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::StatusCode,
};

/// The file posted in the `file-0` field of a multipart upload
///
/// Other fields are ignored.
#[derive(Debug)]
pub struct BuilderUpload(pub UploadedFile);

fn multipart_error(err: &MultipartError) -> PagecraftError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PagecraftError::PayloadTooLarge(err.body_text())
    } else {
        PagecraftError::BadRequest(err.body_text())
    }
}

impl<S> FromRequest<S> for BuilderUpload
where
    S: Send + Sync,
{
    type Rejection = PagecraftError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| PagecraftError::BadRequest(e.body_text()))?;

        while let Some(field) = multipart.next_field().await.map_err(|e| multipart_error(&e))? {
            if field.name() != Some(UPLOAD_FIELD) {
                continue;
            }

            let filename = field
                .file_name()
                .ok_or_else(|| PagecraftError::BadRequest("upload has no filename".to_string()))?
                .to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await.map_err(|e| multipart_error(&e))?;

            return Ok(Self(UploadedFile::new(filename, content_type, data.to_vec())));
        }

        Err(PagecraftError::BadRequest(format!("missing multipart field {UPLOAD_FIELD}")))
    }
}
