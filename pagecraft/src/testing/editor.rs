//! Recording editor doubles

use crate::editor::{BlockDefinition, Editor, EditorError, EditorEvent, EditorFactory, EditorOptions};
use crate::storage::AssetDescriptor;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Editor that records every call
#[derive(Debug)]
pub struct FakeEditor {
    components: Mutex<Value>,
    styles: Mutex<Value>,
    export: Mutex<(String, String)>,
    assets: Mutex<Vec<AssetDescriptor>>,
    blocks: Mutex<Vec<BlockDefinition>>,
    css: Mutex<Vec<String>>,
    restored: AtomicBool,
    events: broadcast::Sender<EditorEvent>,
}

impl Default for FakeEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeEditor {
    /// A blank editor
    #[must_use]
    pub fn new() -> Self {
        let (events, _rx) = broadcast::channel(16);
        Self {
            components: Mutex::new(json!([])),
            styles: Mutex::new(json!([])),
            export: Mutex::new((String::new(), String::new())),
            assets: Mutex::new(Vec::new()),
            blocks: Mutex::new(Vec::new()),
            css: Mutex::new(Vec::new()),
            restored: AtomicBool::new(false),
            events,
        }
    }

    /// Sets what `html()` and `css()` return
    pub fn set_export(&self, html: &str, css: &str) {
        *self.export.lock() = (html.to_string(), css.to_string());
    }

    /// Fires an editor event
    pub fn emit(&self, event: EditorEvent) {
        let _ = self.events.send(event);
    }

    /// Whether both components and styles were set
    #[must_use]
    pub fn was_restored(&self) -> bool {
        self.restored.load(Ordering::SeqCst)
    }

    /// Assets added so far
    #[must_use]
    pub fn assets(&self) -> Vec<AssetDescriptor> {
        self.assets.lock().clone()
    }

    /// Blocks registered so far
    #[must_use]
    pub fn blocks(&self) -> Vec<BlockDefinition> {
        self.blocks.lock().clone()
    }

    /// CSS appended so far
    #[must_use]
    pub fn appended_css(&self) -> Vec<String> {
        self.css.lock().clone()
    }
}

impl Editor for FakeEditor {
    fn components(&self) -> Value {
        self.components.lock().clone()
    }

    fn styles(&self) -> Value {
        self.styles.lock().clone()
    }

    fn html(&self) -> String {
        self.export.lock().0.clone()
    }

    fn css(&self) -> String {
        self.export.lock().1.clone()
    }

    fn set_components(&self, components: Value) {
        *self.components.lock() = components;
    }

    fn set_style(&self, styles: Value) {
        *self.styles.lock() = styles;
        self.restored.store(true, Ordering::SeqCst);
    }

    fn add_assets(&self, assets: Vec<AssetDescriptor>) {
        self.assets.lock().extend(assets);
    }

    fn add_block(&self, block: BlockDefinition) {
        self.blocks.lock().push(block);
    }

    fn append_css(&self, css: &str) {
        self.css.lock().push(css.to_string());
    }

    fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.events.subscribe()
    }
}

/// Factory handing out [`FakeEditor`]s and remembering them
#[derive(Debug, Clone, Default)]
pub struct FakeEditorFactory {
    editors: Arc<Mutex<Vec<Arc<FakeEditor>>>>,
    options: Arc<Mutex<Vec<EditorOptions>>>,
}

impl FakeEditorFactory {
    /// The most recently created editor
    #[must_use]
    pub fn last(&self) -> Option<Arc<FakeEditor>> {
        self.editors.lock().last().cloned()
    }

    /// Options of every `init` call
    #[must_use]
    pub fn options(&self) -> Vec<EditorOptions> {
        self.options.lock().clone()
    }
}

impl EditorFactory for FakeEditorFactory {
    fn init(&self, options: &EditorOptions) -> Result<Arc<dyn Editor>, EditorError> {
        let editor = Arc::new(FakeEditor::new());
        self.editors.lock().push(Arc::clone(&editor));
        self.options.lock().push(options.clone());
        Ok(editor as Arc<dyn Editor>)
    }
}
