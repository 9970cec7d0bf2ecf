//! Standalone server command

use anyhow::{Context, Result};
use console::style;
use pagecraft::config::PagecraftConfig;
use pagecraft::state::PagecraftState;
use tokio::net::TcpListener;

/// Run the builder API server until Ctrl+C
pub struct ServeCommand {
    config: PagecraftConfig,
}

impl ServeCommand {
    /// Create a new command instance
    #[must_use]
    pub const fn new(config: PagecraftConfig) -> Self {
        Self { config }
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if logging, binding or serving fails.
    pub async fn execute(self) -> Result<()> {
        pagecraft::observability::init()?;

        let addr = self.config.server.socket_addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        let state = PagecraftState::with_config(self.config)?;

        println!(
            "{} {}",
            style("Serving").green().bold(),
            style(format!("http://{addr}")).cyan()
        );

        pagecraft::server::serve(listener, state, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await
    }
}
