//! Built-in theme list

use serde::Serialize;

/// A named collection of pre-built blocks stored under one folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeDescriptor {
    /// Display name
    pub name: &'static str,

    /// Folder below `themes/` holding the theme's blocks
    pub folder: &'static str,
}

/// Themes available in the editor's block palette
pub const THEMES: &[ThemeDescriptor] = &[
    ThemeDescriptor { name: "Hyper UI", folder: "hyperui" },
    ThemeDescriptor { name: "Tailblocks", folder: "tailblocks" },
    ThemeDescriptor { name: "Flowrift", folder: "flowrift" },
    ThemeDescriptor { name: "Meraki UI", folder: "meraki-light" },
    ThemeDescriptor { name: "Preline", folder: "preline" },
    ThemeDescriptor { name: "Flowbite", folder: "flowbite" },
];

/// Display names of `themes`, in order
#[must_use]
pub fn theme_names(themes: &[ThemeDescriptor]) -> Vec<String> {
    themes.iter().map(|t| t.name.to_string()).collect()
}
