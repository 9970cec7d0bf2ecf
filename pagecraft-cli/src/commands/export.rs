//! Static export command

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use pagecraft::config::PagecraftConfig;
use pagecraft::lifecycle::{find_page, ContentPolicy};
use pagecraft::state::PagecraftState;
use pagecraft::storage::PageRecord;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Render every stored page to a static HTML file
pub struct ExportCommand {
    config: PagecraftConfig,
    out_dir: PathBuf,
}

/// What an export produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Pages written to disk
    pub written: usize,

    /// Records skipped: unusable name or content, or a file already
    /// written by another record (`/` and `/index`)
    pub skipped: usize,
}

impl ExportCommand {
    /// Create a new command instance
    #[must_use]
    pub const fn new(config: PagecraftConfig, out_dir: PathBuf) -> Self {
        Self { config, out_dir }
    }

    /// Execute the command
    ///
    /// Malformed records are skipped under either content policy. The first
    /// record mapped to a file wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the pages cannot be loaded, rendered or written.
    pub async fn execute(self) -> Result<ExportSummary> {
        let policy = self.config.render.content_policy;
        let state = PagecraftState::with_config(self.config.clone())?;
        let records = state.storage().load_all().await?;

        let progress = ProgressBar::new(records.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let mut summary = ExportSummary::default();
        let mut written = HashSet::new();
        for record in &records {
            progress.set_message(record.name.clone());
            if self.export_page(&state, &records, &record.name, policy, &mut written).await? {
                summary.written += 1;
            } else {
                summary.skipped += 1;
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        println!(
            "{} {} page(s) to {}",
            style("Exported").green().bold(),
            summary.written,
            style(self.out_dir.display()).cyan()
        );
        if summary.skipped > 0 {
            println!("{} {} page(s) skipped", style("!").yellow().bold(), summary.skipped);
        }

        Ok(summary)
    }

    /// Writes one page; `false` when it was skipped
    async fn export_page(
        &self,
        state: &PagecraftState,
        records: &[PageRecord],
        page_path: &str,
        policy: ContentPolicy,
        written: &mut HashSet<PathBuf>,
    ) -> Result<bool> {
        let Some(target) = output_path(&self.out_dir, page_path) else {
            tracing::warn!(page = page_path, "page name escapes the output directory, skipped");
            return Ok(false);
        };
        if written.contains(&target) {
            tracing::warn!(page = page_path, target = %target.display(), "file already exported by another page, skipped");
            return Ok(false);
        }

        let page = match find_page(records, page_path, policy) {
            Ok(Some(page)) => page,
            Ok(None) => return Ok(false),
            Err(e) => {
                tracing::warn!(page = page_path, error = %e, "unusable page content, skipped");
                return Ok(false);
            }
        };

        let html = state.shell().document(page_path, &page)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&target, html)
            .await
            .with_context(|| format!("Failed to write {}", target.display()))?;
        written.insert(target);
        Ok(true)
    }
}

/// File an exported page is written to
///
/// `/` and `/index` both land on `index.html`. Names that would escape
/// `out_dir` yield `None`.
#[must_use]
pub fn output_path(out_dir: &Path, page_path: &str) -> Option<PathBuf> {
    let relative = Path::new(page_path.trim_start_matches('/'));
    let mut target = out_dir.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => target.push(segment),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if target == out_dir {
        target.push("index");
    }
    target.set_extension("html");
    Some(target)
}
