//! Markup sanitizing for injected pages

use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::unwrap_used)] // Patterns are compile-time constants
static SCRIPT_ELEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap());

#[allow(clippy::unwrap_used)]
static SCRIPT_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</?script\b[^>]*>").unwrap());

#[allow(clippy::unwrap_used)]
static EVENT_HANDLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).unwrap()
});

#[allow(clippy::unwrap_used)]
static STYLE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</style").unwrap());

/// Removes `<script>` elements and inline `on*` handlers
///
/// # Examples
///
/// ```rust
/// use pagecraft::render::sanitize_html;
///
/// let html = r#"<p onclick="steal()">Hi</p><script>alert(1)</script>"#;
/// assert_eq!(sanitize_html(html), "<p>Hi</p>");
/// ```
#[must_use]
pub fn sanitize_html(html: &str) -> String {
    let without_elements = SCRIPT_ELEMENT.replace_all(html, "");
    let without_tags = SCRIPT_TAG.replace_all(&without_elements, "");
    EVENT_HANDLER.replace_all(&without_tags, "").into_owned()
}

/// Keeps CSS from closing its `<style>` block
#[must_use]
pub fn sanitize_css(css: &str) -> String {
    STYLE_CLOSE.replace_all(css, r"<\/style").into_owned()
}
