//! Component descriptors derived from a theme manifest

use crate::storage::ManifestEntry;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One reusable block of a theme, as shown in the editor's palette
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    /// Block folder with a space before its number (`hero10` → `hero 10`)
    pub display_name: String,

    /// Block folder without digits (`hero10` → `hero`)
    pub category: String,

    /// Block HTML source
    pub source: String,

    /// Theme folder the block belongs to
    pub theme_folder: String,

    /// Block folder name
    pub block_folder: String,
}

impl ComponentDescriptor {
    /// Derives a descriptor from a manifest entry of `theme_folder`
    #[must_use]
    pub fn from_manifest(theme_folder: &str, entry: ManifestEntry) -> Self {
        Self {
            display_name: display_name(&entry.folder),
            category: category(&entry.folder),
            source: entry.source,
            theme_folder: theme_folder.to_string(),
            block_folder: entry.folder,
        }
    }

    /// Palette id of the block (`<theme>-<block>`)
    #[must_use]
    pub fn block_id(&self) -> String {
        format!("{}-{}", self.theme_folder, self.block_folder)
    }
}

/// Inserts a space before the first digit of a block folder name
///
/// ```rust
/// use pagecraft::catalog::display_name;
///
/// assert_eq!(display_name("hero10"), "hero 10");
/// assert_eq!(display_name("footer"), "footer");
/// ```
#[must_use]
pub fn display_name(block_folder: &str) -> String {
    match block_folder.find(|c: char| c.is_ascii_digit()) {
        Some(at) => format!("{} {}", &block_folder[..at], &block_folder[at..]),
        None => block_folder.to_string(),
    }
}

/// Strips every digit from a block folder name
///
/// ```rust
/// use pagecraft::catalog::category;
///
/// assert_eq!(category("card2"), "card");
/// assert_eq!(category("cta1b2"), "ctab");
/// ```
#[must_use]
pub fn category(block_folder: &str) -> String {
    block_folder.chars().filter(|c| !c.is_ascii_digit()).collect()
}

#[derive(Debug, Clone, Copy)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .find(|c: char| c.is_ascii_digit() != digits)
            .unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(if digits { Chunk::Digits(chunk) } else { Chunk::Text(chunk) })
    }
}

fn compare_chunks(a: Chunk<'_>, b: Chunk<'_>) -> Ordering {
    match (a, b) {
        (Chunk::Digits(x), Chunk::Digits(y)) => {
            let x = x.trim_start_matches('0');
            let y = y.trim_start_matches('0');
            x.len().cmp(&y.len()).then_with(|| x.cmp(y))
        }
        (Chunk::Text(x), Chunk::Text(y)) => x
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(y.chars().flat_map(char::to_lowercase)),
        // Digits against text: decided by the leading characters
        (Chunk::Digits(x), Chunk::Text(y)) | (Chunk::Text(x), Chunk::Digits(y)) => x
            .chars()
            .flat_map(char::to_lowercase)
            .next()
            .cmp(&y.chars().flat_map(char::to_lowercase).next()),
    }
}

/// Case-insensitive comparison that orders digit runs by numeric value
///
/// ```rust
/// use pagecraft::catalog::natural_cmp;
/// use std::cmp::Ordering;
///
/// assert_eq!(natural_cmp("Block 2", "Block 10"), Ordering::Less);
/// assert_eq!(natural_cmp("hero", "Hero"), Ordering::Equal);
/// ```
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Chunks { rest: a };
    let mut right = Chunks { rest: b };
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match compare_chunks(x, y) {
                Ordering::Equal => {}
                ord => return ord,
            },
        }
    }
}

/// Maps a manifest into descriptors sorted by display name
#[must_use]
pub fn build_components(theme_folder: &str, manifest: Vec<ManifestEntry>) -> Vec<ComponentDescriptor> {
    let mut components: Vec<_> = manifest
        .into_iter()
        .map(|entry| ComponentDescriptor::from_manifest(theme_folder, entry))
        .collect();
    components.sort_by(|a, b| natural_cmp(&a.display_name, &b.display_name));
    components
}

/// De-duplicated categories in first-seen order
#[must_use]
pub fn categories(components: &[ComponentDescriptor]) -> Vec<String> {
    let mut seen = Vec::new();
    for component in components {
        if !seen.contains(&component.category) {
            seen.push(component.category.clone());
        }
    }
    seen
}
