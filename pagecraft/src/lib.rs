//! pagecraft: template persistence and render-mode core for a visual page builder
//!
//! A page is either edited in a WYSIWYG editor or rendered from its stored
//! markup. This crate decides which, moves templates between the editor and
//! a storage backend, feeds the editor's block palette from theme catalogs
//! and ships the builder API server that backs standalone mode.
//!
//! # Design Principles
//!
//! 1. **One storage API**: the same [`TemplateStorage`](storage::TemplateStorage)
//!    trait talks to an embedding host or to the standalone server
//! 2. **Decide once**: the render decision is computed per mount and never revisited
//! 3. **Opaque templates**: component trees and styles are stored exactly as
//!    the editor serialized them
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pagecraft::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     pagecraft::observability::init()?;
//!
//!     let config = PagecraftConfig::load_for_service("pagecraft")?;
//!     let listener = tokio::net::TcpListener::bind(config.server.socket_addr()?).await?;
//!     let state = PagecraftState::with_config(config)?;
//!
//!     pagecraft::server::serve(listener, state, async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await
//! }
//! ```
//!
//! # Modules
//!
//! - [`storage`] - Storage gateway: URL builders, HTTP client, local backend
//! - [`catalog`] - Theme catalog feeding the block palette
//! - [`editor`] - Editor bootstrap, options, loaders, uploads
//! - [`lifecycle`] - Render decision, restore and save wiring
//! - [`render`] - Rendering shell and sanitizing
//! - [`server`] - Builder API router

// Lint configuration is handled at the workspace level in Cargo.toml

pub mod catalog;
pub mod config;
pub mod editor;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod render;
pub mod server;
pub mod state;
pub mod storage;

#[cfg(test)]
pub mod testing;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! # Examples
    //!
    //! ```rust
    //! use pagecraft::prelude::*;
    //! ```

    // Storage
    pub use crate::storage::{
        AssetDescriptor, Endpoint, HttpTemplateStorage, LocalTemplateStorage, ManifestEntry,
        PageRecord, StorageError, TemplateContent, TemplateStorage, UploadedFile,
    };

    // Catalog
    pub use crate::catalog::{CatalogReader, CatalogState, ComponentDescriptor, ThemeCatalog, THEMES};

    // Editor
    pub use crate::editor::{
        BlockPalette, Editor, EditorBootstrap, EditorError, EditorEvent, EditorFactory,
        EditorHandle, EditorOptions, EditorPlugin, PluginStage,
    };

    // Lifecycle
    pub use crate::lifecycle::{
        ContentPolicy, LifecycleError, MountProps, Mounted, RenderDecision, RenderMode,
        TemplateController,
    };

    // Rendering
    pub use crate::render::{RenderedPage, RenderingShell, StylesheetGate};

    // Configuration, state and errors
    pub use crate::config::PagecraftConfig;
    pub use crate::error::PagecraftError;
    pub use crate::state::PagecraftState;
}
