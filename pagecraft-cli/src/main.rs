//! pagecraft CLI tool

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use pagecraft_cli_lib::{ExportCommand, ServeCommand, ThemesCommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pagecraft")]
#[command(version)]
#[command(about = "Backend and tooling for the pagecraft page builder", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the standard locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the standalone builder server
    Serve,
    /// Render every stored page to static HTML
    Export {
        /// Output directory
        #[arg(short, long, default_value = "dist")]
        out: PathBuf,
    },
    /// List themes and their blocks
    Themes,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = pagecraft_cli_lib::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => {
            ServeCommand::new(config).execute().await?;
        }
        Commands::Export { out } => {
            ExportCommand::new(config, out).execute().await?;
        }
        Commands::Themes => {
            ThemesCommand::new(config).execute().await?;
        }
    }

    Ok(())
}
