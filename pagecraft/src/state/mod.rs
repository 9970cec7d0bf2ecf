//! Application state for the builder API server
//!
//! Shared by every handler: configuration, the local storage backend and
//! the rendering shell used by the page fallback.

use crate::config::PagecraftConfig;
use crate::render::{RenderingShell, StylesheetGate};
use crate::storage::{LocalTemplateStorage, StorageResult};
use std::sync::Arc;

/// Application state for the builder API
///
/// # Example
///
/// ```rust,no_run
/// use pagecraft::{config::PagecraftConfig, server, state::PagecraftState};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = PagecraftConfig::load_for_service("pagecraft")?;
/// let state = PagecraftState::with_config(config)?;
/// let app = server::router(state);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PagecraftState {
    /// Application configuration
    config: Arc<PagecraftConfig>,

    /// Pages, themes and uploads on the local filesystem
    storage: Arc<LocalTemplateStorage>,

    /// Renders stored pages server-side
    shell: RenderingShell,
}

impl PagecraftState {
    /// Create application state from configuration
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPath` if the configured data or public
    /// directory exists but is not a directory.
    pub fn with_config(config: PagecraftConfig) -> StorageResult<Self> {
        let storage = LocalTemplateStorage::new(
            config.server.data_dir.clone(),
            config.server.public_dir.clone(),
            config.server.endpoint(),
        )?;
        // The browser loads the stylesheet of server-rendered pages itself
        let shell = RenderingShell::new(false, config.render.stylesheet_url.clone(), StylesheetGate::opened());

        Ok(Self {
            config: Arc::new(config),
            storage: Arc::new(storage),
            shell,
        })
    }

    /// Get configuration reference
    #[must_use]
    pub fn config(&self) -> &PagecraftConfig {
        &self.config
    }

    /// Storage backend
    #[must_use]
    pub const fn storage(&self) -> &Arc<LocalTemplateStorage> {
        &self.storage
    }

    /// Rendering shell
    #[must_use]
    pub const fn shell(&self) -> &RenderingShell {
        &self.shell
    }
}
