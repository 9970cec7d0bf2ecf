//! Selector name escaping
//!
//! Tailwind class names contain characters such as `/` and `:` that the
//! editor's selector manager would otherwise mangle.

use once_cell::sync::Lazy;
use regex::Regex;

static UNSAFE_RUN: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)] // Pattern is a compile-time constant
    Regex::new(r"[^A-Za-z0-9_:/-]+").unwrap()
});

/// Trims a class name and replaces each run of unsupported characters with `-`
///
/// # Examples
///
/// ```rust
/// use pagecraft::editor::escape_name;
///
/// assert_eq!(escape_name(" w-1/2 "), "w-1/2");
/// assert_eq!(escape_name("hover:bg-blue-500"), "hover:bg-blue-500");
/// assert_eq!(escape_name("p-[12px]"), "p--12px-");
/// ```
#[must_use]
pub fn escape_name(name: &str) -> String {
    UNSAFE_RUN.replace_all(name.trim(), "-").into_owned()
}
