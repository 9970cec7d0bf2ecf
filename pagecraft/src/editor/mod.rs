//! Editor bootstrap adapter
//!
//! The WYSIWYG editor itself is an external collaborator, seen through the
//! [`Editor`] and [`EditorFactory`] traits. This module builds its startup
//! options, wires uploads to the storage gateway, runs the loaders in stage
//! order and appends the canvas CSS.
//!
//! # Examples
//!
//! ```rust,ignore
//! use pagecraft::editor::{BlockPalette, EditorBootstrap};
//!
//! let handle = EditorBootstrap::new(factory, storage, endpoint)
//!     .with_plugin(BlockPalette::new(catalog.reader()))
//!     .with_canvas_stylesheet("https://unpkg.com/tailwindcss@^2/dist/tailwind.min.css")
//!     .bootstrap(true, true)?;
//! ```

pub mod options;
pub mod plugins;
pub mod selectors;
pub mod upload;

pub use options::{AssetManagerOptions, EditorOptions, SelectorManagerOptions, StorageManagerOptions};
pub use plugins::{BlockDefinition, BlockPalette, EditorPlugin, PluginContext, PluginStage};
pub use selectors::escape_name;
pub use upload::AssetUploader;

use crate::config::PagecraftConfig;
use crate::storage::{AssetDescriptor, Endpoint, StorageError, TemplateContent, TemplateStorage, UploadedFile};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;

/// Errors raised by the editor adapter
#[derive(Debug, Error)]
pub enum EditorError {
    /// The editor could not be created
    #[error("Editor initialization failed: {0}")]
    Init(String),

    /// A loader failed
    #[error("Loader '{name}' failed: {message}")]
    Plugin {
        /// Loader name
        name: &'static str,
        /// Failure description
        message: String,
    },

    /// Upload requested but not wired to the storage gateway
    #[error("Uploads are not configured for this editor")]
    UploadNotConfigured,

    /// Storage gateway failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Component tree or styles could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Events emitted by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    /// The editor asks for its state to be stored
    StorageStore,
}

/// A live editor instance
///
/// Implementations use interior mutability; one instance is shared as
/// `Arc<dyn Editor>` per mount.
pub trait Editor: Send + Sync {
    /// Current component tree
    fn components(&self) -> Value;

    /// Current style rules
    fn styles(&self) -> Value;

    /// Exported page markup
    fn html(&self) -> String;

    /// Exported page stylesheet
    fn css(&self) -> String;

    /// Replaces the component tree
    fn set_components(&self, components: Value);

    /// Replaces the style rules
    fn set_style(&self, styles: Value);

    /// Adds assets to the asset library
    fn add_assets(&self, assets: Vec<AssetDescriptor>);

    /// Registers a palette block
    fn add_block(&self, block: BlockDefinition);

    /// Appends CSS to the canvas
    fn append_css(&self, css: &str);

    /// Subscribes to editor events
    fn subscribe(&self) -> broadcast::Receiver<EditorEvent>;
}

/// Creates editor instances
pub trait EditorFactory: Send + Sync {
    /// Initializes an editor with `options`
    ///
    /// # Errors
    ///
    /// Returns `EditorError::Init` if the editor cannot be created.
    fn init(&self, options: &EditorOptions) -> Result<Arc<dyn Editor>, EditorError>;
}

/// Serializes the editor's current state into a template
///
/// # Errors
///
/// Returns `EditorError::Serialize` if the component tree or styles cannot
/// be serialized.
pub fn capture_template(editor: &dyn Editor) -> Result<TemplateContent, EditorError> {
    let components = serde_json::to_string(&editor.components())?;
    let styles = serde_json::to_string(&editor.styles())?;
    Ok(TemplateContent::new(components, styles).with_export(editor.html(), editor.css()))
}

/// A bootstrapped editor
#[derive(Clone)]
pub struct EditorHandle {
    editor: Arc<dyn Editor>,
    options: EditorOptions,
}

impl std::fmt::Debug for EditorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorHandle")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl EditorHandle {
    /// The editor instance
    #[must_use]
    pub fn editor(&self) -> &Arc<dyn Editor> {
        &self.editor
    }

    /// Options the editor was started with
    #[must_use]
    pub const fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Uploads a file and adds the resulting assets to the editor
    ///
    /// # Errors
    ///
    /// - `EditorError::UploadNotConfigured` when bootstrapped without a server
    /// - `EditorError::Storage` if the upload fails
    pub async fn upload(&self, file: UploadedFile) -> Result<Vec<AssetDescriptor>, EditorError> {
        let uploader = self
            .options
            .asset_manager
            .uploader
            .as_ref()
            .ok_or(EditorError::UploadNotConfigured)?;
        uploader.upload(self.editor.as_ref(), file).await
    }
}

/// Builds and starts an editor
pub struct EditorBootstrap {
    factory: Arc<dyn EditorFactory>,
    storage: Arc<dyn TemplateStorage>,
    endpoint: Endpoint,
    options: EditorOptions,
    plugins: Vec<Arc<dyn EditorPlugin>>,
    canvas_css: Vec<String>,
}

impl EditorBootstrap {
    /// Bootstrap with default options and no loaders
    #[must_use]
    pub fn new(
        factory: Arc<dyn EditorFactory>,
        storage: Arc<dyn TemplateStorage>,
        endpoint: Endpoint,
    ) -> Self {
        Self {
            factory,
            storage,
            endpoint,
            options: EditorOptions::default(),
            plugins: Vec::new(),
            canvas_css: Vec::new(),
        }
    }

    /// Bootstrap configured from the `[server]`, `[render]` and `[editor]` sections
    ///
    /// Options come from `[editor]`, the endpoint from `[server]`, and the
    /// canvas imports `render.stylesheet_url`.
    #[must_use]
    pub fn from_config(
        factory: Arc<dyn EditorFactory>,
        storage: Arc<dyn TemplateStorage>,
        config: &PagecraftConfig,
    ) -> Self {
        Self::new(factory, storage, config.server.endpoint())
            .with_options(EditorOptions::from_settings(&config.editor))
            .with_canvas_stylesheet(&config.render.stylesheet_url)
    }

    /// Replaces the base options
    #[must_use]
    pub fn with_options(mut self, options: EditorOptions) -> Self {
        self.options = options;
        self
    }

    /// Adds a loader
    #[must_use]
    pub fn with_plugin(mut self, plugin: impl EditorPlugin + 'static) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Imports an external stylesheet into the canvas
    #[must_use]
    pub fn with_canvas_stylesheet(mut self, url: &str) -> Self {
        self.canvas_css.push(format!("@import url({url});"));
        self
    }

    /// Appends raw CSS to the canvas
    #[must_use]
    pub fn with_css_override(mut self, css: impl Into<String>) -> Self {
        self.canvas_css.push(css.into());
        self
    }

    /// Creates the editor, runs every loader and appends the canvas CSS
    ///
    /// With `start_server` the asset manager uploads through the storage
    /// gateway; without it uploads stay at the editor's default.
    ///
    /// # Errors
    ///
    /// Returns the factory's error or the first failing loader's error.
    pub fn bootstrap(&self, start_server: bool, standalone: bool) -> Result<EditorHandle, EditorError> {
        let mut options = self.options.clone();
        if start_server {
            options.asset_manager.uploader = Some(AssetUploader::new(Arc::clone(&self.storage)));
        }

        let editor = self.factory.init(&options)?;
        tracing::debug!(start_server, standalone, "editor initialized");

        let ctx = PluginContext {
            start_server,
            standalone,
            endpoint: Endpoint {
                standalone,
                ..self.endpoint.clone()
            },
        };

        let mut plugins = self.plugins.clone();
        plugins.sort_by_key(|plugin| plugin.stage());
        for plugin in &plugins {
            plugin.load(editor.as_ref(), &ctx).map_err(|e| {
                tracing::error!(plugin = plugin.name(), error = %e, "editor loader failed");
                e
            })?;
            tracing::trace!(plugin = plugin.name(), stage = ?plugin.stage(), "loader finished");
        }

        for css in &self.canvas_css {
            editor.append_css(css);
        }

        Ok(EditorHandle { editor, options })
    }
}
