//! Stylesheet load gate
//!
//! In standalone mode rendered markup depends on an external stylesheet and
//! stays hidden until the host reports it loaded.

use std::sync::Arc;
use tokio::sync::watch;

/// One-way flag flipped when the external stylesheet finished loading
///
/// Clones share the same flag.
#[derive(Debug, Clone)]
pub struct StylesheetGate {
    loaded: Arc<watch::Sender<bool>>,
}

impl Default for StylesheetGate {
    fn default() -> Self {
        Self::new()
    }
}

impl StylesheetGate {
    /// A closed gate
    #[must_use]
    pub fn new() -> Self {
        let (loaded, _rx) = watch::channel(false);
        Self {
            loaded: Arc::new(loaded),
        }
    }

    /// An already opened gate
    #[must_use]
    pub fn opened() -> Self {
        let gate = Self::new();
        gate.mark_loaded();
        gate
    }

    /// Records that the stylesheet loaded; idempotent
    pub fn mark_loaded(&self) {
        self.loaded.send_if_modified(|loaded| !std::mem::replace(loaded, true));
    }

    /// Whether the stylesheet loaded
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        *self.loaded.borrow()
    }

    /// Waits until the stylesheet loaded
    pub async fn loaded(&self) {
        let mut rx = self.loaded.subscribe();
        // The sender lives in `self`, so the channel cannot close while waiting
        let _ = rx.wait_for(|loaded| *loaded).await;
    }
}
