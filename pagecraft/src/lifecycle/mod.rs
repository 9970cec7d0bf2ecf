//! Template lifecycle controller
//!
//! Decides per mount whether a page shows the editor or its rendered
//! content, restores saved templates into the editor, persists the editor's
//! state whenever it asks to be stored, and extracts the stored markup in
//! render mode.
//!
//! A controller mounts exactly once:
//!
//! ```text
//! Uninitialized ──► EditorBootstrapping ──► Ready
//!              └──► ContentLoading ─────────┘
//! ```

use crate::config::PagecraftConfig;
use crate::editor::{capture_template, Editor, EditorBootstrap, EditorError, EditorEvent, EditorHandle};
use crate::render::RenderedPage;
use crate::storage::{PageRecord, StorageError, TemplateContent, TemplateStorage};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

/// What a mount shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// The WYSIWYG editor
    ShowEditor,
    /// The stored page markup
    ShowRenderedContent,
}

/// Mode decision computed once per mount
///
/// # Examples
///
/// ```rust
/// use pagecraft::lifecycle::{RenderDecision, RenderMode};
///
/// let decision = RenderDecision::decide(false, false, true);
/// assert_eq!(decision.mode, RenderMode::ShowEditor);
/// assert!(decision.should_auto_start_local_server);
///
/// let decision = RenderDecision::decide(true, false, true);
/// assert_eq!(decision.mode, RenderMode::ShowRenderedContent);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderDecision {
    /// Selected mode
    pub mode: RenderMode,

    /// Persistence is wired to the storage gateway
    pub should_auto_start_local_server: bool,

    /// Running against the standalone server
    pub standalone: bool,
}

impl RenderDecision {
    /// Edit mode without data or when forced; persistence only without data
    /// and without forcing
    #[must_use]
    pub const fn decide(has_persisted_data: bool, force_editor_in_production: bool, standalone: bool) -> Self {
        let mode = if !has_persisted_data || force_editor_in_production {
            RenderMode::ShowEditor
        } else {
            RenderMode::ShowRenderedContent
        };
        Self {
            mode,
            should_auto_start_local_server: !has_persisted_data && !force_editor_in_production,
            standalone,
        }
    }
}

/// Mount progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Not mounted yet
    Uninitialized,
    /// Editor is starting
    EditorBootstrapping,
    /// Stored content is being extracted
    ContentLoading,
    /// Mount finished
    Ready,
}

/// Handling of persisted content that cannot be used
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentPolicy {
    /// Surface the problem as an error
    Strict,
    /// Log a warning and continue as if nothing was stored
    #[default]
    Lenient,
}

/// Errors raised while mounting or saving
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The controller was mounted before
    #[error("Controller is already mounted")]
    AlreadyMounted,

    /// Stored content is not valid JSON
    #[error("Malformed content for {page_path}: {source}")]
    MalformedContent {
        /// Page the content belongs to
        page_path: String,
        /// Parse failure
        #[source]
        source: serde_json::Error,
    },

    /// Component tree present but styles missing or unusable
    #[error("Incomplete template for {page_path}: {reason}")]
    IncompleteTemplate {
        /// Page the template belongs to
        page_path: String,
        /// What is missing
        reason: String,
    },

    /// Storage gateway failure
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Editor failure
    #[error(transparent)]
    Editor(#[from] EditorError),
}

impl ContentPolicy {
    /// Applies the policy to an unusable-content error
    fn absorb(self, err: LifecycleError) -> Result<(), LifecycleError> {
        match self {
            Self::Strict => Err(err),
            Self::Lenient => {
                tracing::warn!(error = %err, "ignoring unusable stored content");
                Ok(())
            }
        }
    }
}

/// Inputs of a mount
#[derive(Debug, Clone, Default)]
pub struct MountProps {
    /// Persisted page records; `None` means no data was supplied
    pub data: Option<Vec<PageRecord>>,

    /// Show the editor even when data was supplied
    pub show_editor_in_prod: bool,

    /// Running against the standalone server
    pub standalone: bool,
}

impl MountProps {
    /// Props taking `show_editor_in_prod` and `standalone` from configuration
    #[must_use]
    pub fn from_config(config: &PagecraftConfig, data: Option<Vec<PageRecord>>) -> Self {
        Self {
            data,
            show_editor_in_prod: config.editor.show_editor_in_prod,
            standalone: config.server.standalone,
        }
    }

    /// Props carrying render data
    #[must_use]
    pub fn with_data(data: Vec<PageRecord>) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }
}

/// Result of a mount
#[derive(Debug)]
pub enum Mounted {
    /// Editor mode
    Editor(EditorSession),
    /// Render mode; `None` when no stored page matches the path
    Rendered(Option<RenderedPage>),
}

/// A mounted editor together with its persistence wiring
pub struct EditorSession {
    handle: EditorHandle,
    page_path: String,
    storage: Arc<dyn TemplateStorage>,
    decision: RenderDecision,
    listener: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("page_path", &self.page_path)
            .field("decision", &self.decision)
            .field("listening", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// The bootstrapped editor
    #[must_use]
    pub const fn handle(&self) -> &EditorHandle {
        &self.handle
    }

    /// Shortcut for the editor instance
    #[must_use]
    pub fn editor(&self) -> &Arc<dyn Editor> {
        self.handle.editor()
    }

    /// Page this session edits
    #[must_use]
    pub fn page_path(&self) -> &str {
        &self.page_path
    }

    /// Decision the session was mounted with
    #[must_use]
    pub const fn decision(&self) -> RenderDecision {
        self.decision
    }

    /// Whether store events are persisted
    #[must_use]
    pub const fn is_persisting(&self) -> bool {
        self.listener.is_some()
    }

    /// Saves the editor's current state immediately
    ///
    /// # Errors
    ///
    /// Returns the serialization or storage error; nothing is retried.
    pub async fn save_now(&self) -> Result<(), LifecycleError> {
        save_snapshot(self.editor().as_ref(), self.storage.as_ref(), &self.page_path).await
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

/// Per-mount controller
pub struct TemplateController {
    storage: Arc<dyn TemplateStorage>,
    bootstrap: EditorBootstrap,
    policy: ContentPolicy,
    state: Mutex<LifecycleState>,
}

impl std::fmt::Debug for TemplateController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateController")
            .field("policy", &self.policy)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl TemplateController {
    /// Controller using the lenient content policy
    #[must_use]
    pub fn new(storage: Arc<dyn TemplateStorage>, bootstrap: EditorBootstrap) -> Self {
        Self {
            storage,
            bootstrap,
            policy: ContentPolicy::default(),
            state: Mutex::new(LifecycleState::Uninitialized),
        }
    }

    /// Sets the content policy
    #[must_use]
    pub const fn with_policy(mut self, policy: ContentPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current mount progress
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    fn enter(&self, next: LifecycleState) -> Result<(), LifecycleError> {
        let mut state = self.state.lock();
        if *state != LifecycleState::Uninitialized {
            return Err(LifecycleError::AlreadyMounted);
        }
        *state = next;
        Ok(())
    }

    /// Mounts the page at `page_path`
    ///
    /// Edit mode with persistence subscribes to store events, then restores
    /// the saved template (when usable). Render mode extracts the stored
    /// markup for `page_path` from `props.data`.
    ///
    /// # Errors
    ///
    /// - `LifecycleError::AlreadyMounted` on a second call
    /// - `LifecycleError::Storage` / `LifecycleError::Editor` on backend or
    ///   editor failure
    /// - `LifecycleError::MalformedContent` / `LifecycleError::IncompleteTemplate`
    ///   under [`ContentPolicy::Strict`]
    pub async fn mount(&self, page_path: &str, props: MountProps) -> Result<Mounted, LifecycleError> {
        let decision = RenderDecision::decide(props.data.is_some(), props.show_editor_in_prod, props.standalone);
        tracing::debug!(page_path, ?decision, "mounting page");

        let mounted = match decision.mode {
            RenderMode::ShowEditor => {
                self.enter(LifecycleState::EditorBootstrapping)?;
                Mounted::Editor(self.mount_editor(page_path, decision).await?)
            }
            RenderMode::ShowRenderedContent => {
                self.enter(LifecycleState::ContentLoading)?;
                let records = props.data.unwrap_or_default();
                Mounted::Rendered(find_page(&records, page_path, self.policy)?)
            }
        };

        *self.state.lock() = LifecycleState::Ready;
        Ok(mounted)
    }

    async fn mount_editor(&self, page_path: &str, decision: RenderDecision) -> Result<EditorSession, LifecycleError> {
        let start_server = decision.should_auto_start_local_server;
        let handle = self.bootstrap.bootstrap(start_server, decision.standalone)?;

        let mut session = EditorSession {
            handle,
            page_path: page_path.to_string(),
            storage: Arc::clone(&self.storage),
            decision,
            listener: None,
        };

        if start_server {
            let events = session.editor().subscribe();
            session.listener = Some(tokio::spawn(save_on_store(
                Arc::clone(session.editor()),
                Arc::clone(&self.storage),
                page_path.to_string(),
                events,
            )));

            let stored = self.storage.load_template(page_path).await?;
            let restored = restore_template(session.editor().as_ref(), page_path, stored.as_deref(), self.policy)?;
            tracing::info!(page_path, restored, "editor ready");
        }

        Ok(session)
    }
}

/// Restores a stored content blob into `editor`
///
/// Returns whether anything was restored. Absent content, or content
/// without a component tree, leaves the editor blank.
///
/// # Errors
///
/// Under [`ContentPolicy::Strict`], `MalformedContent` when the blob or the
/// component tree does not parse and `IncompleteTemplate` when the styles are
/// missing or do not parse.
pub fn restore_template(
    editor: &dyn Editor,
    page_path: &str,
    stored: Option<&str>,
    policy: ContentPolicy,
) -> Result<bool, LifecycleError> {
    let Some(raw) = stored else {
        return Ok(false);
    };

    let content = match TemplateContent::parse(raw) {
        Ok(content) => content,
        Err(source) => {
            return policy
                .absorb(LifecycleError::MalformedContent {
                    page_path: page_path.to_string(),
                    source,
                })
                .map(|()| false)
        }
    };

    match parse_template(page_path, &content) {
        Ok(Some((components, styles))) => {
            editor.set_components(components);
            editor.set_style(styles);
            Ok(true)
        }
        Ok(None) => Ok(false),
        Err(err) => policy.absorb(err).map(|()| false),
    }
}

fn parse_template(page_path: &str, content: &TemplateContent) -> Result<Option<(Value, Value)>, LifecycleError> {
    if !content.has_components() {
        return Ok(None);
    }
    let components_raw = content.components.as_deref().unwrap_or_default();
    let components = serde_json::from_str(components_raw).map_err(|source| LifecycleError::MalformedContent {
        page_path: page_path.to_string(),
        source,
    })?;

    let styles_raw = content.styles.as_deref().ok_or_else(|| LifecycleError::IncompleteTemplate {
        page_path: page_path.to_string(),
        reason: "styles missing".to_string(),
    })?;
    let styles = serde_json::from_str(styles_raw).map_err(|e| LifecycleError::IncompleteTemplate {
        page_path: page_path.to_string(),
        reason: format!("styles do not parse: {e}"),
    })?;

    Ok(Some((components, styles)))
}

/// Extracts the rendered markup of `page_path` from a set of page records
///
/// No matching record is not an error: `Ok(None)`.
///
/// # Errors
///
/// Under [`ContentPolicy::Strict`], `MalformedContent` when the matching
/// record's content does not parse.
pub fn find_page(
    records: &[PageRecord],
    page_path: &str,
    policy: ContentPolicy,
) -> Result<Option<RenderedPage>, LifecycleError> {
    let Some(record) = records.iter().find(|record| record.name == page_path) else {
        tracing::debug!(page_path, "no stored page matches");
        return Ok(None);
    };

    match TemplateContent::parse(&record.content) {
        Ok(content) => Ok(Some(RenderedPage::new(
            content.css.unwrap_or_default(),
            content.html.unwrap_or_default(),
        ))),
        Err(source) => policy
            .absorb(LifecycleError::MalformedContent {
                page_path: page_path.to_string(),
                source,
            })
            .map(|()| None),
    }
}

async fn save_snapshot(editor: &dyn Editor, storage: &dyn TemplateStorage, page_path: &str) -> Result<(), LifecycleError> {
    let content = capture_template(editor)?;
    storage.save_template(page_path, &content).await?;
    tracing::debug!(page_path, "template saved");
    Ok(())
}

/// Persists the editor's state on every store event until the channel closes
async fn save_on_store(
    editor: Arc<dyn Editor>,
    storage: Arc<dyn TemplateStorage>,
    page_path: String,
    mut events: broadcast::Receiver<EditorEvent>,
) {
    loop {
        match events.recv().await {
            Ok(EditorEvent::StorageStore) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "store events lagged, saving latest state");
            }
            Err(RecvError::Closed) => break,
        }

        if let Err(e) = save_snapshot(editor.as_ref(), storage.as_ref(), &page_path).await {
            tracing::error!(page_path = %page_path, error = %e, "failed to save template");
        }
    }
    tracing::debug!(page_path = %page_path, "save listener stopped");
}
