//! Loaders run against a freshly initialized editor
//!
//! Trait, panel and component loaders are supplied by the embedding
//! application. The block loader for the theme catalog ships here.

use super::{Editor, EditorError};
use crate::catalog::{CatalogReader, ComponentDescriptor};
use crate::storage::Endpoint;
use serde::Serialize;

/// Order in which loaders run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PluginStage {
    /// Component traits
    Traits,
    /// Panels and commands
    Panels,
    /// Component types
    Components,
    /// Block palette
    Blocks,
}

/// Information available to loaders
#[derive(Debug, Clone)]
pub struct PluginContext {
    /// Persistence is handled by this core
    pub start_server: bool,

    /// Running against the standalone server
    pub standalone: bool,

    /// Endpoint for URLs the loader emits
    pub endpoint: Endpoint,
}

/// A loader invoked once during editor bootstrap
pub trait EditorPlugin: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &'static str;

    /// Stage the loader belongs to
    fn stage(&self) -> PluginStage;

    /// Registers whatever the loader provides
    ///
    /// # Errors
    ///
    /// A failing loader aborts the bootstrap.
    fn load(&self, editor: &dyn Editor, ctx: &PluginContext) -> Result<(), EditorError>;
}

/// A block of the editor's palette
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockDefinition {
    /// Unique block id
    pub id: String,

    /// Label shown in the palette
    pub label: String,

    /// Palette category
    pub category: String,

    /// HTML inserted when the block is dropped
    pub content: String,

    /// Preview markup
    pub media: String,
}

impl BlockDefinition {
    /// Block for a catalog component
    #[must_use]
    pub fn from_component(component: &ComponentDescriptor, endpoint: &Endpoint) -> Self {
        let preview = endpoint.preview_image_url(&component.theme_folder, &component.block_folder);
        Self {
            id: component.block_id(),
            label: component.display_name.clone(),
            category: component.category.clone(),
            content: component.source.clone(),
            media: preview_markup(&preview),
        }
    }
}

fn preview_markup(src: &str) -> String {
    format!(r#"<img src="{src}" style="width: 100%; object-fit: cover; aspect-ratio: 1.81">"#)
}

/// Registers the current theme's components as palette blocks
#[derive(Debug, Clone)]
pub struct BlockPalette {
    catalog: CatalogReader,
}

impl BlockPalette {
    /// Palette fed by `catalog`
    #[must_use]
    pub const fn new(catalog: CatalogReader) -> Self {
        Self { catalog }
    }
}

impl EditorPlugin for BlockPalette {
    fn name(&self) -> &'static str {
        "block-palette"
    }

    fn stage(&self) -> PluginStage {
        PluginStage::Blocks
    }

    fn load(&self, editor: &dyn Editor, ctx: &PluginContext) -> Result<(), EditorError> {
        let state = self.catalog.current();
        for component in &state.components {
            editor.add_block(BlockDefinition::from_component(component, &ctx.endpoint));
        }
        tracing::debug!(blocks = state.components.len(), "block palette loaded");
        Ok(())
    }
}
