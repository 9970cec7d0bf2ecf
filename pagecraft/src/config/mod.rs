//! Configuration management for pagecraft
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `PAGECRAFT_` prefix, `__` for nesting)
//! 2. `./config.toml` (development)
//! 3. `~/.config/pagecraft/{service_name}/config.toml` (user config)
//! 4. `/etc/pagecraft/{service_name}/config.toml` (system config)
//! 5. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # config.toml
//! [server]
//! port = 12785
//! data_dir = "./data"
//! public_dir = "./public"
//! max_upload_bytes = 10485760
//!
//! [render]
//! stylesheet_url = "https://unpkg.com/tailwindcss@^2/dist/tailwind.min.css"
//! content_policy = "strict"
//!
//! [editor]
//! show_editor_in_prod = false
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use pagecraft::config::PagecraftConfig;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = PagecraftConfig::load_for_service("pagecraft")?;
//! let addr = config.server.socket_addr()?;
//! # Ok(())
//! # }
//! ```

use crate::lifecycle::ContentPolicy;
use crate::storage::{Endpoint, DEFAULT_API_PATH, DEFAULT_STANDALONE_PORT};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Stylesheet loaded by rendered pages and the editor canvas
pub const DEFAULT_STYLESHEET_URL: &str = "https://unpkg.com/tailwindcss@^2/dist/tailwind.min.css";

const ENV_PREFIX: &str = "PAGECRAFT_";

/// Builder API server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,

    /// Listening port
    pub port: u16,

    /// Path of the builder API endpoint
    pub api_path: String,

    /// Directory holding persisted pages
    pub data_dir: PathBuf,

    /// Directory holding themes and uploads
    pub public_dir: PathBuf,

    /// Maximum upload body size in bytes
    pub max_upload_bytes: u64,

    /// Run as the standalone builder server
    pub standalone: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_STANDALONE_PORT,
            api_path: DEFAULT_API_PATH.to_string(),
            data_dir: PathBuf::from("./data"),
            public_dir: PathBuf::from("./public"),
            max_upload_bytes: 10 * 1024 * 1024, // 10MB
            standalone: true,
        }
    }
}

impl ServerSettings {
    /// Address to bind
    ///
    /// # Errors
    ///
    /// Returns an error if `host` is not an IP address.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(SocketAddr::new(self.host.parse()?, self.port))
    }

    /// Storage endpoint matching these settings
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            standalone: self.standalone,
            port: self.port,
            api_path: self.api_path.clone(),
        }
    }
}

/// Render mode configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RenderSettings {
    /// External stylesheet rendered pages depend on
    pub stylesheet_url: String,

    /// Handling of malformed persisted content
    pub content_policy: ContentPolicy,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            stylesheet_url: DEFAULT_STYLESHEET_URL.to_string(),
            content_policy: ContentPolicy::default(),
        }
    }
}

/// Editor configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EditorSettings {
    /// CSS selector of the mount element
    pub container: String,

    /// Editor height
    pub height: String,

    /// Show the editor even when persisted data exists
    pub show_editor_in_prod: bool,

    /// Show the device switcher
    pub show_devices: bool,

    /// Enable the traits editor
    pub traits_editor: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            container: "#gjs".to_string(),
            height: "100%".to_string(),
            show_editor_in_prod: false,
            show_devices: false,
            traits_editor: true,
        }
    }
}

/// Complete pagecraft configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PagecraftConfig {
    /// Server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Render settings
    #[serde(default)]
    pub render: RenderSettings,

    /// Editor settings
    #[serde(default)]
    pub editor: EditorSettings,
}

impl PagecraftConfig {
    /// Load configuration for a specific service
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file cannot be parsed or a value
    /// has the wrong type.
    pub fn load_for_service(service_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let system_config = PathBuf::from("/etc/pagecraft")
            .join(service_name)
            .join("config.toml");
        if system_config.exists() {
            figment = figment.merge(Toml::file(&system_config));
        }

        let user_config = Self::recommended_path(service_name);
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }

        let local_config = PathBuf::from("./config.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// A missing file yields the defaults (plus environment overrides).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value has the
    /// wrong type.
    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true))
            .extract()?;

        Ok(config)
    }

    /// Get the recommended user config path for a service
    ///
    /// # Example
    ///
    /// ```rust
    /// use pagecraft::config::PagecraftConfig;
    ///
    /// let path = PagecraftConfig::recommended_path("my-site");
    /// assert!(path.ends_with("config.toml"));
    /// ```
    #[must_use]
    pub fn recommended_path(service_name: &str) -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from("./config.toml"),
            |config_dir| {
                config_dir
                    .join("pagecraft")
                    .join(service_name)
                    .join("config.toml")
            },
        )
    }
}
