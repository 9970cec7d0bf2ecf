//! Theme catalog feeding the editor's block palette
//!
//! [`ThemeCatalog`] is the single writer of [`CatalogState`]; any number of
//! [`CatalogReader`]s observe it. Selecting a theme updates the index right
//! away, fetches the theme's manifest, derives and sorts the components and
//! publishes them together with their categories in one state replacement.
//!
//! Overlapping selections are tagged with a sequence number; a fetch that
//! completes after a newer selection was issued is discarded.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pagecraft::catalog::ThemeCatalog;
//! use pagecraft::storage::{Endpoint, HttpTemplateStorage};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let storage = Arc::new(HttpTemplateStorage::new(Endpoint::standalone(12785))?);
//! let catalog = ThemeCatalog::new(storage);
//! let reader = catalog.reader();
//!
//! catalog.select_theme(1).await?;
//! for component in &reader.current().components {
//!     println!("{} ({})", component.display_name, component.category);
//! }
//! # Ok(())
//! # }
//! ```

pub mod component;
pub mod themes;

pub use component::{build_components, categories, category, display_name, natural_cmp, ComponentDescriptor};
pub use themes::{theme_names, ThemeDescriptor, THEMES};

use crate::storage::{StorageError, TemplateStorage};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

/// Errors raised while selecting a theme
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Index outside the theme list
    #[error("Theme index {index} out of range (0..{count})")]
    ThemeOutOfRange {
        /// Requested index
        index: usize,
        /// Number of themes
        count: usize,
    },

    /// Manifest could not be fetched
    #[error("Failed to load theme manifest: {0}")]
    Storage(#[from] StorageError),
}

/// Shared, read-mostly catalog state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogState {
    /// Components of the current theme, sorted by display name
    pub components: Vec<ComponentDescriptor>,

    /// De-duplicated categories of `components`
    pub categories: Vec<String>,

    /// Index of the selected theme
    pub theme_index: usize,

    /// Display names of all themes
    pub theme_names: Vec<String>,
}

/// Result of a completed theme selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Components were published
    Published,
    /// A newer selection was issued while fetching; the result was dropped
    Superseded,
}

/// Read-only view on the catalog state
#[derive(Debug, Clone)]
pub struct CatalogReader {
    rx: watch::Receiver<CatalogState>,
}

impl CatalogReader {
    /// Snapshot of the current state
    #[must_use]
    pub fn current(&self) -> CatalogState {
        self.rx.borrow().clone()
    }

    /// Waits until the state changes and returns the new snapshot
    ///
    /// Returns `None` once the catalog was dropped.
    pub async fn changed(&mut self) -> Option<CatalogState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Owner of the catalog state
pub struct ThemeCatalog {
    storage: Arc<dyn TemplateStorage>,
    themes: &'static [ThemeDescriptor],
    state: watch::Sender<CatalogState>,
    latest: AtomicU64,
}

impl std::fmt::Debug for ThemeCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeCatalog")
            .field("themes", &self.themes.len())
            .field("latest", &self.latest.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl ThemeCatalog {
    /// Catalog over the built-in [`THEMES`]
    #[must_use]
    pub fn new(storage: Arc<dyn TemplateStorage>) -> Self {
        Self::with_themes(storage, THEMES)
    }

    /// Catalog over a custom theme list
    #[must_use]
    pub fn with_themes(storage: Arc<dyn TemplateStorage>, themes: &'static [ThemeDescriptor]) -> Self {
        let initial = CatalogState {
            theme_names: theme_names(themes),
            ..CatalogState::default()
        };
        let (state, _rx) = watch::channel(initial);
        Self {
            storage,
            themes,
            state,
            latest: AtomicU64::new(0),
        }
    }

    /// Number of selectable themes
    #[must_use]
    pub const fn theme_count(&self) -> usize {
        self.themes.len()
    }

    /// Theme descriptors, in index order
    #[must_use]
    pub const fn themes(&self) -> &'static [ThemeDescriptor] {
        self.themes
    }

    /// Creates a new reader
    #[must_use]
    pub fn reader(&self) -> CatalogReader {
        CatalogReader {
            rx: self.state.subscribe(),
        }
    }

    /// Snapshot of the current state
    #[must_use]
    pub fn snapshot(&self) -> CatalogState {
        self.state.borrow().clone()
    }

    /// Selects a theme and publishes its components
    ///
    /// # Errors
    ///
    /// - `CatalogError::ThemeOutOfRange` if `index` is not a valid theme; the
    ///   state is left untouched
    /// - `CatalogError::Storage` if the manifest fetch fails; the index was
    ///   already updated, the previous components stay published
    pub async fn select_theme(&self, index: usize) -> Result<SelectOutcome, CatalogError> {
        let Some(theme) = self.themes.get(index) else {
            return Err(CatalogError::ThemeOutOfRange {
                index,
                count: self.themes.len(),
            });
        };

        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| state.theme_index = index);
        tracing::debug!(theme = theme.folder, seq, "selecting theme");

        let manifest = self.storage.load_theme(theme.folder).await?;
        let components = build_components(theme.folder, manifest);
        let categories = categories(&components);
        let count = components.len();

        // Compared under the channel's lock so a newer publish cannot be overwritten
        let published = self.state.send_if_modified(|state| {
            if self.latest.load(Ordering::SeqCst) != seq {
                return false;
            }
            state.components = components;
            state.categories = categories;
            true
        });

        if published {
            tracing::info!(theme = theme.folder, components = count, "theme catalog published");
            Ok(SelectOutcome::Published)
        } else {
            tracing::debug!(theme = theme.folder, seq, "discarding superseded theme manifest");
            Ok(SelectOutcome::Superseded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ManifestEntry, MockTemplateStorage};
    use crate::testing::MemoryStorage;
    use std::time::Duration;

    const TEST_THEMES: &[ThemeDescriptor] = &[
        ThemeDescriptor { name: "Alpha", folder: "alpha" },
        ThemeDescriptor { name: "Beta", folder: "beta" },
    ];

    fn manifest(folders: &[&str]) -> Vec<ManifestEntry> {
        folders.iter().map(|f| ManifestEntry::new(*f, "<div/>")).collect()
    }

    #[tokio::test]
    async fn test_initial_state() {
        let catalog = ThemeCatalog::new(Arc::new(MemoryStorage::default()));
        let state = catalog.snapshot();
        assert_eq!(state.theme_index, 0);
        assert!(state.components.is_empty());
        assert_eq!(state.theme_names.len(), THEMES.len());
        assert_eq!(catalog.theme_count(), 6);
    }

    #[tokio::test]
    async fn test_select_publishes_sorted_components() {
        let storage = MemoryStorage::default();
        storage.add_theme("hyperui", manifest(&["hero1", "card2"]));
        let catalog = ThemeCatalog::new(Arc::new(storage));

        let outcome = catalog.select_theme(0).await.unwrap();
        assert_eq!(outcome, SelectOutcome::Published);

        let state = catalog.snapshot();
        let names: Vec<_> = state.components.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, vec!["card 2", "hero 1"]);
        assert_eq!(state.categories, vec!["card", "hero"]);
        assert_eq!(state.components[1].category, "hero");
    }

    #[tokio::test]
    async fn test_selection_is_idempotent() {
        let storage = MemoryStorage::default();
        storage.add_theme("alpha", manifest(&["b2", "a1", "a10"]));
        let catalog = ThemeCatalog::with_themes(Arc::new(storage), TEST_THEMES);

        catalog.select_theme(0).await.unwrap();
        let first = catalog.snapshot();
        catalog.select_theme(0).await.unwrap();
        assert_eq!(catalog.snapshot(), first);
    }

    #[tokio::test]
    async fn test_categories_match_components_for_every_theme() {
        let storage = MemoryStorage::default();
        storage.add_theme("alpha", manifest(&["hero1", "hero2", "card1"]));
        storage.add_theme("beta", manifest(&["cta3", "footer"]));
        let catalog = ThemeCatalog::with_themes(Arc::new(storage), TEST_THEMES);

        for index in 0..catalog.theme_count() {
            catalog.select_theme(index).await.unwrap();
            let state = catalog.snapshot();
            assert_eq!(state.theme_index, index);
            assert_eq!(state.categories, categories(&state.components));
        }
    }

    #[tokio::test]
    async fn test_out_of_range_leaves_state() {
        let storage = MemoryStorage::default();
        storage.add_theme("alpha", manifest(&["a1"]));
        let catalog = ThemeCatalog::with_themes(Arc::new(storage), TEST_THEMES);
        catalog.select_theme(0).await.unwrap();
        let before = catalog.snapshot();

        let err = catalog.select_theme(2).await.unwrap_err();
        assert!(matches!(err, CatalogError::ThemeOutOfRange { index: 2, count: 2 }));
        assert_eq!(catalog.snapshot(), before);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_previous_components() {
        let mut storage = MockTemplateStorage::new();
        storage
            .expect_load_theme()
            .withf(|folder| folder.starts_with("alpha"))
            .returning(|_| Ok(vec![ManifestEntry::new("a1", "")]));
        storage
            .expect_load_theme()
            .withf(|folder| folder.starts_with("beta"))
            .returning(|_| Err(StorageError::NotFound("beta".to_string())));
        let catalog = ThemeCatalog::with_themes(Arc::new(storage), TEST_THEMES);

        catalog.select_theme(0).await.unwrap();
        assert!(matches!(
            catalog.select_theme(1).await.unwrap_err(),
            CatalogError::Storage(StorageError::NotFound(_))
        ));

        let state = catalog.snapshot();
        assert_eq!(state.theme_index, 1);
        assert_eq!(state.components[0].block_folder, "a1");
    }

    #[tokio::test]
    async fn test_stale_fetch_is_discarded() {
        let storage = MemoryStorage::default();
        storage.add_theme("alpha", manifest(&["slow1"]));
        storage.add_theme("beta", manifest(&["fast1"]));
        storage.delay_theme("alpha", Duration::from_millis(200));
        let catalog = Arc::new(ThemeCatalog::with_themes(Arc::new(storage), TEST_THEMES));

        let slow = {
            let catalog = Arc::clone(&catalog);
            tokio::spawn(async move { catalog.select_theme(0).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        let fast = catalog.select_theme(1).await.unwrap();

        assert_eq!(fast, SelectOutcome::Published);
        assert_eq!(slow.await.unwrap().unwrap(), SelectOutcome::Superseded);

        let state = catalog.snapshot();
        assert_eq!(state.theme_index, 1);
        assert_eq!(state.components[0].block_folder, "fast1");
    }

    #[tokio::test]
    async fn test_reader_sees_single_publish() {
        let storage = MemoryStorage::default();
        storage.add_theme("alpha", manifest(&["x1", "y1"]));
        let catalog = ThemeCatalog::with_themes(Arc::new(storage), TEST_THEMES);
        let mut reader = catalog.reader();

        catalog.select_theme(0).await.unwrap();

        // Both the index update and the publish happened; the reader only
        // ever observes complete component lists
        let state = reader.changed().await.unwrap();
        assert_eq!(state.components.len(), 2);
        assert_eq!(state.categories, vec!["x", "y"]);
    }
}
