//! Rendering shell
//!
//! Turns a stored page into markup: the external stylesheet link, a
//! `<style>` block with the page CSS and the sanitized page HTML. In
//! standalone mode the page HTML is held back until the
//! [`StylesheetGate`] opens so unstyled content never shows.

pub mod gate;
pub mod sanitize;

pub use gate::StylesheetGate;
pub use sanitize::{sanitize_css, sanitize_html};

use askama::Template;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while rendering markup
#[derive(Debug, Error)]
pub enum RenderError {
    /// Template rendering failed
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Markup and stylesheet extracted from a stored page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderedPage {
    /// Page stylesheet
    pub css: String,

    /// Page markup
    pub html: String,
}

impl RenderedPage {
    /// Creates a rendered page
    #[must_use]
    pub fn new(css: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            css: css.into(),
            html: html.into(),
        }
    }
}

#[derive(Template)]
#[template(
    source = r#"<link rel="stylesheet" href="{{ stylesheet_url }}">
<style>{{ css|safe }}</style>
{% if let Some(body) = body %}<div>{{ body|safe }}</div>
{% endif %}"#,
    ext = "html"
)]
struct ShellTemplate<'a> {
    stylesheet_url: &'a str,
    css: &'a str,
    body: Option<&'a str>,
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{ title }}</title>
{{ head|safe }}</head>
<body>
{{ body|safe }}</body>
</html>
"#,
    ext = "html"
)]
struct DocumentTemplate<'a> {
    title: &'a str,
    head: &'a str,
    body: &'a str,
}

#[derive(Template)]
#[template(
    source = r#"<div style="height: 100%; margin: 0 auto"><div id="{{ id }}"></div></div>"#,
    ext = "html"
)]
struct EditorMountTemplate<'a> {
    id: &'a str,
}

/// Markup for the element the editor mounts into
///
/// `container` is the editor's container selector; a leading `#` is dropped.
///
/// # Errors
///
/// Returns `RenderError::Template` if rendering fails.
pub fn editor_mount_markup(container: &str) -> Result<String, RenderError> {
    let id = container.strip_prefix('#').unwrap_or(container);
    Ok(EditorMountTemplate { id }.render()?)
}

/// Renders stored pages, gated on the external stylesheet in standalone mode
///
/// # Examples
///
/// ```rust
/// use pagecraft::render::{RenderedPage, RenderingShell, StylesheetGate};
///
/// let gate = StylesheetGate::new();
/// let shell = RenderingShell::new(true, "/tw.css", gate.clone());
/// let page = RenderedPage::new("h1{}", "<h1>Hi</h1>");
///
/// assert!(!shell.markup(&page).unwrap().contains("<h1>Hi</h1>"));
/// gate.mark_loaded();
/// assert!(shell.markup(&page).unwrap().contains("<h1>Hi</h1>"));
/// ```
#[derive(Debug, Clone)]
pub struct RenderingShell {
    standalone: bool,
    stylesheet_url: String,
    gate: StylesheetGate,
}

impl RenderingShell {
    /// Creates a shell
    #[must_use]
    pub fn new(standalone: bool, stylesheet_url: impl Into<String>, gate: StylesheetGate) -> Self {
        Self {
            standalone,
            stylesheet_url: stylesheet_url.into(),
            gate,
        }
    }

    /// The shell's gate
    #[must_use]
    pub const fn gate(&self) -> &StylesheetGate {
        &self.gate
    }

    /// Whether page markup may be emitted now
    #[must_use]
    pub fn content_visible(&self) -> bool {
        !self.standalone || self.gate.is_loaded()
    }

    /// Renders the shell as of now
    ///
    /// The page HTML is omitted while [`content_visible`](Self::content_visible)
    /// is false; the stylesheet link and page CSS are always present.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Template` if rendering fails.
    pub fn markup(&self, page: &RenderedPage) -> Result<String, RenderError> {
        let css = sanitize_css(&page.css);
        let html = self.content_visible().then(|| sanitize_html(&page.html));
        let shell = ShellTemplate {
            stylesheet_url: &self.stylesheet_url,
            css: &css,
            body: html.as_deref(),
        };
        Ok(shell.render()?)
    }

    /// Waits for the gate when needed, then renders the complete shell
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Template` if rendering fails.
    pub async fn render(&self, page: &RenderedPage) -> Result<String, RenderError> {
        if self.standalone {
            self.gate.loaded().await;
        }
        self.markup(page)
    }

    /// Renders a complete HTML document around the page
    ///
    /// Used server-side, where the browser loads the stylesheet itself, so
    /// the page HTML is always included.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Template` if rendering fails.
    pub fn document(&self, title: &str, page: &RenderedPage) -> Result<String, RenderError> {
        let ungated = Self::new(false, self.stylesheet_url.clone(), self.gate.clone());
        let body = ungated.markup(page)?;
        let document = DocumentTemplate {
            title,
            head: "",
            body: &body,
        };
        Ok(document.render()?)
    }
}
