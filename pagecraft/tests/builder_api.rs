//! End-to-end tests: the builder server on an ephemeral port, driven through
//! the HTTP storage gateway

use pagecraft::catalog::{SelectOutcome, ThemeCatalog, ThemeDescriptor};
use pagecraft::config::PagecraftConfig;
use pagecraft::server;
use pagecraft::state::PagecraftState;
use pagecraft::storage::{
    Endpoint, HttpTemplateStorage, StorageError, TemplateContent, TemplateStorage, UploadedFile,
};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct RunningServer {
    port: u16,
    temp: TempDir,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl RunningServer {
    async fn start() -> Self {
        let temp = TempDir::new().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut config = PagecraftConfig::default();
        config.server.port = port;
        config.server.data_dir = temp.path().join("data");
        config.server.public_dir = temp.path().join("public");
        let state = PagecraftState::with_config(config).unwrap();

        let (shutdown, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server::serve(listener, state, async move {
            let _ = rx.await;
        }));

        Self {
            port,
            temp,
            shutdown: Some(shutdown),
            handle,
        }
    }

    fn standalone_client(&self) -> HttpTemplateStorage {
        HttpTemplateStorage::new(Endpoint::standalone(self.port)).unwrap()
    }

    fn embedded_client(&self) -> HttpTemplateStorage {
        let origin = format!("http://127.0.0.1:{}", self.port);
        HttpTemplateStorage::with_origin(Endpoint::embedded(), &origin).unwrap()
    }

    fn write_block(&self, theme: &str, block: &str, source: &str) {
        let dir = self.temp.path().join("public/themes").join(theme).join(block);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), source).unwrap();
    }

    async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn test_unsaved_page_loads_as_none() {
    let server = RunningServer::start().await;

    let loaded = server.standalone_client().load_template("/index").await.unwrap();
    assert!(loaded.is_none());

    server.stop().await;
}

#[tokio::test]
async fn test_save_then_load_round_trips() {
    let server = RunningServer::start().await;
    let client = server.standalone_client();
    let content = TemplateContent::new(
        r#"[{"tagName":"h1","components":[{"type":"textnode","content":"Hi"}]}]"#,
        r##"[{"selectors":["#ix"],"style":{"color":"red"}}]"##,
    )
    .with_export("<h1>Hi</h1>", "#ix{color:red}");

    client.save_template("/index", &content).await.unwrap();
    let raw = client.load_template("/index").await.unwrap().unwrap();
    assert_eq!(TemplateContent::parse(&raw).unwrap(), content);

    // Both modes reach the same backend
    let embedded = server.embedded_client().load_template("/index").await.unwrap();
    assert_eq!(embedded.as_deref(), Some(raw.as_str()));

    server.stop().await;
}

#[tokio::test]
async fn test_saved_page_is_served_rendered() {
    let server = RunningServer::start().await;
    let content = TemplateContent::new("[]", "[]").with_export("<main>About us</main>", "main{}");
    server
        .embedded_client()
        .save_template("/about", &content)
        .await
        .unwrap();

    let html = reqwest::get(format!("http://127.0.0.1:{}/about", server.port))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("<main>About us</main>"));

    server.stop().await;
}

const TEST_THEMES: &[ThemeDescriptor] = &[ThemeDescriptor {
    name: "Hyper UI",
    folder: "hyperui",
}];

#[tokio::test]
async fn test_theme_catalog_over_http() {
    let server = RunningServer::start().await;
    server.write_block("hyperui", "hero1", "<section>hero</section>");
    server.write_block("hyperui", "card2", "<div>card</div>");

    let catalog = ThemeCatalog::with_themes(Arc::new(server.standalone_client()), TEST_THEMES);
    assert_eq!(catalog.select_theme(0).await.unwrap(), SelectOutcome::Published);

    let state = catalog.snapshot();
    let names: Vec<_> = state.components.iter().map(|c| c.display_name.as_str()).collect();
    assert_eq!(names, vec!["card 2", "hero 1"]);
    assert_eq!(state.categories, vec!["card", "hero"]);
    assert_eq!(state.components[1].source, "<section>hero</section>");

    server.stop().await;
}

#[tokio::test]
async fn test_missing_theme_is_backend_error() {
    let server = RunningServer::start().await;

    let err = server.standalone_client().load_theme("nope").await.unwrap_err();
    assert!(matches!(err, StorageError::Backend { status: 404, .. }));

    server.stop().await;
}

#[tokio::test]
async fn test_upload_then_fetch_asset() {
    let server = RunningServer::start().await;
    let client = server.standalone_client();

    let assets = client
        .upload_file(UploadedFile::new("logo.png", "image/png", vec![137, 80, 78, 71]))
        .await
        .unwrap();
    assert_eq!(assets.len(), 1);
    assert!(assets[0]
        .url
        .starts_with(&format!("http://localhost:{}/api/builder/handle?type=asset&path=/uploads/", server.port)));

    let asset_path = assets[0].url.split("path=").nth(1).unwrap();
    let fetched = reqwest::get(format!(
        "http://127.0.0.1:{}/api/builder/handle?type=asset&path={asset_path}",
        server.port
    ))
    .await
    .unwrap();
    assert_eq!(fetched.headers()["content-type"], "image/png");
    assert_eq!(fetched.bytes().await.unwrap().as_ref(), &[137, 80, 78, 71]);

    server.stop().await;
}

#[tokio::test]
async fn test_page_paths_with_reserved_characters_stay_distinct() {
    let server = RunningServer::start().await;
    let client = server.standalone_client();

    let a = TemplateContent::new(r#"["A"]"#, "[]");
    let ab = TemplateContent::new(r#"["AB"]"#, "[]");
    let cpp = TemplateContent::new(r#"["C"]"#, "[]");
    client.save_template("/a", &a).await.unwrap();
    client.save_template("/a&b", &ab).await.unwrap();
    client.save_template("/c++", &cpp).await.unwrap();

    for (path, expected) in [("/a", &a), ("/a&b", &ab), ("/c++", &cpp)] {
        let raw = client.load_template(path).await.unwrap().unwrap();
        assert_eq!(&TemplateContent::parse(&raw).unwrap(), expected, "page {path}");
    }

    let records = pagecraft::storage::LocalTemplateStorage::new(
        server.temp.path().join("data"),
        server.temp.path().join("public"),
        Endpoint::standalone(server.port),
    )
    .unwrap()
    .load_all()
    .await
    .unwrap();
    let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["/a", "/a&b", "/c++"]);

    server.stop().await;
}
