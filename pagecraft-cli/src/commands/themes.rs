//! Theme listing command

use anyhow::Result;
use console::style;
use pagecraft::catalog::{build_components, categories, THEMES};
use pagecraft::config::PagecraftConfig;
use pagecraft::state::PagecraftState;
use pagecraft::storage::{StorageError, TemplateStorage};

/// List the built-in themes and the blocks found for each
pub struct ThemesCommand {
    config: PagecraftConfig,
}

impl ThemesCommand {
    /// Create a new command instance
    #[must_use]
    pub const fn new(config: PagecraftConfig) -> Self {
        Self { config }
    }

    /// Execute the command
    ///
    /// A theme missing from the public directory is reported, not fatal.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be opened or a theme folder cannot be read.
    pub async fn execute(self) -> Result<()> {
        let state = PagecraftState::with_config(self.config)?;

        for theme in THEMES {
            let manifest = match state.storage().load_theme(theme.folder).await {
                Ok(manifest) => manifest,
                Err(StorageError::NotFound(_)) => {
                    println!(
                        "{} {}",
                        style(theme.name).bold(),
                        style("(not installed)").dim()
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let components = build_components(theme.folder, manifest);
            println!(
                "{} {} {}",
                style(theme.name).bold(),
                style(format!("[{}]", theme.folder)).dim(),
                style(format!("{} block(s)", components.len())).green()
            );
            println!("  {}", categories(&components).join(", "));
            for component in &components {
                println!("    {} {}", style("-").dim(), component.display_name);
            }
        }

        Ok(())
    }
}
