//! Testing utilities for pagecraft
//!
//! - [`TestServer`] - Wrapper around `axum-test` for router testing
//! - [`MemoryStorage`] - In-memory [`TemplateStorage`](crate::storage::TemplateStorage)
//! - [`FakeEditor`] / [`FakeEditorFactory`] - Recording stand-ins for the editor widget
//!
//! Mocks generated by `mockall` live next to their traits
//! (e.g. [`MockTemplateStorage`](crate::storage::MockTemplateStorage)).

pub mod editor;
pub mod memory;
pub mod server;

pub use editor::{FakeEditor, FakeEditorFactory};
pub use memory::MemoryStorage;
pub use server::TestServer;
