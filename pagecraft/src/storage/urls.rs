//! URL construction for the builder API
//!
//! Pure functions, no I/O. Embedded mode uses an empty base so that URLs are
//! resolved against the host's own origin; standalone mode targets the local
//! builder server on a fixed port.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Port the standalone builder server listens on by default
pub const DEFAULT_STANDALONE_PORT: u16 = 12785;

/// Path of the single builder API endpoint
pub const DEFAULT_API_PATH: &str = "/api/builder/handle";

/// Which backend the storage operations talk to
///
/// # Examples
///
/// ```rust
/// use pagecraft::storage::Endpoint;
///
/// let standalone = Endpoint::standalone(12785);
/// assert_eq!(standalone.base_url(), "http://localhost:12785");
///
/// let embedded = Endpoint::embedded();
/// assert_eq!(embedded.theme_url("hyperui"), "/api/builder/handle?type=theme&name=hyperui");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Talk to the standalone server instead of the host origin
    pub standalone: bool,

    /// Standalone server port
    pub port: u16,

    /// API path on either backend
    pub api_path: String,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::embedded()
    }
}

impl Endpoint {
    /// Endpoint for the given mode with default port and path
    #[must_use]
    pub fn for_mode(standalone: bool) -> Self {
        Self {
            standalone,
            port: DEFAULT_STANDALONE_PORT,
            api_path: DEFAULT_API_PATH.to_string(),
        }
    }

    /// Endpoint on the host's own origin
    #[must_use]
    pub fn embedded() -> Self {
        Self::for_mode(false)
    }

    /// Endpoint on a standalone server listening on `port`
    #[must_use]
    pub fn standalone(port: u16) -> Self {
        Self {
            port,
            ..Self::for_mode(true)
        }
    }

    /// Base URL prefix for every request
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.standalone {
            format!("http://localhost:{}", self.port)
        } else {
            String::new()
        }
    }

    fn handle(&self, query: &str) -> String {
        format!("{}{}?{query}", self.base_url(), self.api_path)
    }

    /// Load/save URL for a page's template
    #[must_use]
    pub fn template_url(&self, page_path: &str) -> String {
        self.handle(&format!("type=data&path={}", query_value(page_path)))
    }

    /// Manifest URL for a theme folder
    #[must_use]
    pub fn theme_url(&self, theme_folder: &str) -> String {
        self.handle(&format!("type=theme&name={}", query_value(theme_folder)))
    }

    /// URL serving a stored asset
    #[must_use]
    pub fn asset_url(&self, asset_path: &str) -> String {
        self.handle(&format!("type=asset&path={}", query_value(asset_path)))
    }

    /// Multipart upload URL
    #[must_use]
    pub fn upload_url(&self) -> String {
        self.handle("type=data")
    }

    /// Preview image of a theme block
    #[must_use]
    pub fn preview_image_url(&self, theme_folder: &str, block_folder: &str) -> String {
        self.asset_url(&format!("/themes/{theme_folder}/{block_folder}/preview.png"))
    }
}

/// Form-encodes a query value, leaving `/` readable
///
/// `/` never needs escaping inside a query value; `&`, `+`, `#`, `%`, `=`
/// and spaces do, or the server would decode a different key.
fn query_value(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace("%2F", "/")
}

/// Base URL for the given mode
#[must_use]
pub fn base_url(standalone: bool) -> String {
    Endpoint::for_mode(standalone).base_url()
}

/// Theme manifest URL for the given mode
#[must_use]
pub fn theme_url(standalone: bool, theme_folder: &str) -> String {
    Endpoint::for_mode(standalone).theme_url(theme_folder)
}

/// Asset URL for the given mode
#[must_use]
pub fn asset_url(standalone: bool, asset_path: &str) -> String {
    Endpoint::for_mode(standalone).asset_url(asset_path)
}
