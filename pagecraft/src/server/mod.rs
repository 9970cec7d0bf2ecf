//! Builder API server
//!
//! A single endpoint (`/api/builder/handle` by default) dispatches on the
//! `type` query parameter:
//!
//! | Method | Query | Body | Response |
//! |---|---|---|---|
//! | GET | `type=data&path=<page>` | | `{content}` or `{}` |
//! | POST | `type=data&path=<page>` | `{data: {components, styles}}` | `{ok: true}` |
//! | GET | `type=theme&name=<folder>` | | `[{folder, source}]` |
//! | GET | `type=asset&path=<asset>` | | asset bytes |
//! | POST multipart | `type=data` | field `file-0` | `[{url, ...}]` |
//!
//! [`api_router`] holds only that endpoint, for hosts that merge it into
//! their own router. [`router`] adds a fallback rendering stored pages and
//! the CORS, tracing and body-limit layers.

pub mod upload;

pub use upload::BuilderUpload;

use crate::error::PagecraftError;
use crate::lifecycle::find_page;
use crate::render::RenderedPage;
use crate::state::PagecraftState;
use crate::storage::{LoadResponse, SaveRequest, TemplateStorage};
use axum::{
    extract::{DefaultBodyLimit, FromRequest, Query, Request, State},
    http::{header, HeaderMap, Method, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Operation selected by the `type` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleKind {
    /// Templates and uploads
    Data,
    /// Theme manifests
    Theme,
    /// Stored assets
    Asset,
}

/// Query string of the builder endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct HandleQuery {
    /// Operation
    #[serde(rename = "type")]
    pub kind: HandleKind,

    /// Page or asset path
    pub path: Option<String>,

    /// Theme folder
    pub name: Option<String>,
}

impl HandleQuery {
    fn require_path(&self) -> Result<&str, PagecraftError> {
        self.path
            .as_deref()
            .ok_or_else(|| PagecraftError::BadRequest("missing path parameter".to_string()))
    }

    fn require_name(&self) -> Result<&str, PagecraftError> {
        self.name
            .as_deref()
            .ok_or_else(|| PagecraftError::BadRequest("missing name parameter".to_string()))
    }
}

/// Router with only the builder endpoint
pub fn api_router(state: PagecraftState) -> Router {
    let api_path = state.config().server.api_path.clone();
    Router::new()
        .route(&api_path, get(handle_get).post(handle_post))
        .with_state(state)
}

/// Complete standalone router
pub fn router(state: PagecraftState) -> Router {
    let max_upload = usize::try_from(state.config().server.max_upload_bytes).unwrap_or(usize::MAX);
    let api_path = state.config().server.api_path.clone();

    Router::new()
        .route(&api_path, get(handle_get).post(handle_post))
        .fallback(render_page)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(max_upload.saturating_add(MULTIPART_OVERHEAD))),
        )
        .with_state(state)
}

/// Serves `router(state)` on `listener` until `shutdown` resolves
///
/// # Errors
///
/// Returns an error if the server fails while running.
pub async fn serve(
    listener: TcpListener,
    state: PagecraftState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, api_path = %state.config().server.api_path, "builder server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("builder server stopped");
    Ok(())
}

async fn handle_get(
    State(state): State<PagecraftState>,
    Query(query): Query<HandleQuery>,
) -> Result<Response, PagecraftError> {
    let storage = state.storage();
    match query.kind {
        HandleKind::Data => {
            let content = storage.load_template(query.require_path()?).await?;
            Ok(Json(LoadResponse { content }).into_response())
        }
        HandleKind::Theme => {
            let manifest = storage.load_theme(query.require_name()?).await?;
            Ok(Json(manifest).into_response())
        }
        HandleKind::Asset => {
            let (data, content_type) = storage.read_asset(query.require_path()?).await?;
            Ok(([(header::CONTENT_TYPE, content_type)], data).into_response())
        }
    }
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

async fn handle_post(
    State(state): State<PagecraftState>,
    Query(query): Query<HandleQuery>,
    request: Request,
) -> Result<Response, PagecraftError> {
    if query.kind != HandleKind::Data {
        return Err(PagecraftError::BadRequest(format!("cannot POST {:?}", query.kind)));
    }

    if is_multipart(request.headers()) {
        let BuilderUpload(file) = BuilderUpload::from_request(request, &state).await?;
        file.validate_size(state.config().server.max_upload_bytes)?;
        let assets = state.storage().upload_file(file).await?;
        return Ok(Json(assets).into_response());
    }

    let page_path = query.require_path()?;
    let Json(SaveRequest { data }) = Json::<SaveRequest>::from_request(request, &state)
        .await
        .map_err(|e| PagecraftError::BadRequest(e.body_text()))?;
    state.storage().save_template(page_path, &data).await?;
    Ok(Json(json!({ "ok": true })).into_response())
}

/// Renders the stored page matching the request path
///
/// `/` falls back to the `/index` page when no record is stored under `/`.
async fn render_page(
    State(state): State<PagecraftState>,
    method: Method,
    uri: Uri,
) -> Result<Html<String>, PagecraftError> {
    let path = uri.path();
    if method != Method::GET {
        return Err(PagecraftError::NotFound(path.to_string()));
    }

    let records = state.storage().load_all().await?;
    let policy = state.config().render.content_policy;
    let mut page: Option<RenderedPage> = find_page(&records, path, policy)?;
    if page.is_none() && path == "/" {
        page = find_page(&records, "/index", policy)?;
    }

    let page = page.ok_or_else(|| PagecraftError::NotFound(path.to_string()))?;
    Ok(Html(state.shell().document(path, &page)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PagecraftConfig;
    use crate::storage::{AssetDescriptor, ManifestEntry, TemplateContent};
    use crate::testing::TestServer;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use tempfile::TempDir;

    const API: &str = "/api/builder/handle";

    fn setup(max_upload_bytes: u64) -> (TestServer, TempDir) {
        let temp = TempDir::new().unwrap();
        let mut config = PagecraftConfig::default();
        config.server.data_dir = temp.path().join("data");
        config.server.public_dir = temp.path().join("public");
        config.server.max_upload_bytes = max_upload_bytes;
        config.render.stylesheet_url = "tw.css".to_string();

        let state = PagecraftState::with_config(config).unwrap();
        (TestServer::new(router(state)).unwrap(), temp)
    }

    fn write_block(temp: &TempDir, theme: &str, block: &str, source: &str) {
        let dir = temp.path().join("public/themes").join(theme).join(block);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), source).unwrap();
    }

    #[tokio::test]
    async fn test_load_unsaved_page_is_empty_object() {
        let (server, _temp) = setup(1024);
        let response = server
            .get(API)
            .add_query_param("type", "data")
            .add_query_param("path", "/index")
            .await;

        response.assert_status_ok();
        assert_eq!(response.text(), "{}");
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let (server, _temp) = setup(1024);
        let response = server
            .get(API)
            .add_query_param("type", "data")
            .add_query_param("path", "/index")
            .add_header(header::ORIGIN, axum::http::HeaderValue::from_static("https://host.test"))
            .await;

        response.assert_status_ok();
        assert_eq!(response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), "*");
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let (server, _temp) = setup(1024);
        let content = TemplateContent::new(r#"[{"type":"text"}]"#, "[]");

        let response = server
            .post(API)
            .add_query_param("type", "data")
            .add_query_param("path", "/index")
            .json(&json!({ "data": content }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<serde_json::Value>(), json!({ "ok": true }));

        let loaded: LoadResponse = server
            .get(API)
            .add_query_param("type", "data")
            .add_query_param("path", "/index")
            .await
            .json();
        assert_eq!(TemplateContent::parse(&loaded.content.unwrap()).unwrap(), content);
    }

    #[tokio::test]
    async fn test_missing_or_unknown_parameters() {
        let (server, _temp) = setup(1024);

        server
            .get(API)
            .add_query_param("type", "data")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .get(API)
            .add_query_param("type", "bogus")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .post(API)
            .add_query_param("type", "theme")
            .json(&json!({}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_save_body() {
        let (server, _temp) = setup(1024);
        server
            .post(API)
            .add_query_param("type", "data")
            .add_query_param("path", "/index")
            .json(&json!({ "wrong": 1 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_theme_manifest() {
        let (server, temp) = setup(1024);
        write_block(&temp, "hyperui", "hero1", "<section>hero</section>");
        write_block(&temp, "hyperui", "card2", "<div>card</div>");

        let manifest: Vec<ManifestEntry> = server
            .get(API)
            .add_query_param("type", "theme")
            .add_query_param("name", "hyperui")
            .await
            .json();

        assert_eq!(
            manifest,
            vec![
                ManifestEntry::new("card2", "<div>card</div>"),
                ManifestEntry::new("hero1", "<section>hero</section>"),
            ]
        );

        server
            .get(API)
            .add_query_param("type", "theme")
            .add_query_param("name", "missing")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_and_fetch_asset() {
        let (server, _temp) = setup(1024);
        let form = MultipartForm::new()
            .add_text("note", "ignored")
            .add_part("file-0", Part::bytes(vec![1, 2, 3]).file_name("logo.png").mime_type("image/png"));

        let response = server.post(API).add_query_param("type", "data").multipart(form).await;
        response.assert_status_ok();
        let assets: Vec<AssetDescriptor> = response.json();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].name, "logo.png");
        assert_eq!(assets[0].size, 3);

        let asset_path = assets[0].url.split("path=").nth(1).unwrap();
        let asset = server
            .get(API)
            .add_query_param("type", "asset")
            .add_query_param("path", asset_path)
            .await;
        asset.assert_status_ok();
        assert_eq!(asset.header("content-type"), "image/png");
        assert_eq!(asset.as_bytes().as_ref(), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn test_upload_over_limit() {
        let (server, _temp) = setup(4);
        let form = MultipartForm::new()
            .add_part("file-0", Part::bytes(vec![0; 16]).file_name("big.bin"));

        server
            .post(API)
            .add_query_param("type", "data")
            .multipart(form)
            .await
            .assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_upload_without_file_field() {
        let (server, _temp) = setup(1024);
        let form = MultipartForm::new().add_text("other", "x");

        server
            .post(API)
            .add_query_param("type", "data")
            .multipart(form)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_asset_traversal_rejected() {
        let (server, _temp) = setup(1024);
        server
            .get(API)
            .add_query_param("type", "asset")
            .add_query_param("path", "/../data/pages.json")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_fallback_renders_stored_page() {
        let (server, _temp) = setup(1024);
        let content = TemplateContent::new("[]", "[]").with_export(
            r#"<h1 onclick="x()">Welcome</h1><script>bad()</script>"#,
            "h1{font-weight:700}",
        );
        server
            .post(API)
            .add_query_param("type", "data")
            .add_query_param("path", "/index")
            .json(&json!({ "data": content }))
            .await
            .assert_status_ok();

        for path in ["/index", "/"] {
            let response = server.get(path).await;
            response.assert_status_ok();
            let html = response.text();
            assert!(html.contains("<h1>Welcome</h1>"));
            assert!(html.contains("h1{font-weight:700}"));
            assert!(!html.contains("bad()"));
        }

        server.get("/missing").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_router_has_no_fallback() {
        let temp = TempDir::new().unwrap();
        let mut config = PagecraftConfig::default();
        config.server.data_dir = temp.path().join("data");
        config.server.public_dir = temp.path().join("public");
        let state = PagecraftState::with_config(config).unwrap();
        let server = TestServer::new(api_router(state)).unwrap();

        server.get("/index").await.assert_status(StatusCode::NOT_FOUND);
        server
            .get(API)
            .add_query_param("type", "data")
            .add_query_param("path", "/index")
            .await
            .assert_status_ok();
    }
}
