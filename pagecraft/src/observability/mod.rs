//! Observability (logging and tracing)
//!
//! Structured logging through `tracing`: pretty output in debug builds, JSON
//! in release builds, filtered by `RUST_LOG`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name recorded on startup
    pub service_name: String,

    /// Filter used when `RUST_LOG` is unset
    pub default_filter: String,

    /// Emit JSON lines instead of pretty output
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::new("pagecraft")
    }
}

impl ObservabilityConfig {
    /// Create new observability config with build-dependent defaults
    pub fn new(service_name: impl Into<String>) -> Self {
        let (default_filter, json) = if cfg!(debug_assertions) {
            ("debug,pagecraft=trace,tower_http=debug", false)
        } else {
            ("info", true)
        };
        Self {
            service_name: service_name.into(),
            default_filter: default_filter.to_string(),
            json,
        }
    }

    /// Override the fallback filter
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    /// Force JSON output
    #[must_use]
    pub const fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_filter))
    }
}

/// Initialize observability stack with defaults
///
/// # Example
///
/// ```rust,no_run
/// use pagecraft::observability;
///
/// # fn main() -> anyhow::Result<()> {
/// observability::init()?;
/// tracing::info!("Application started");
/// # Ok(())
/// # }
/// ```
pub fn init() -> anyhow::Result<()> {
    try_init(&ObservabilityConfig::default())
}

/// Initialize observability stack from `config`
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn try_init(config: &ObservabilityConfig) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(config.env_filter());

    if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?;
    }

    tracing::debug!(service = %config.service_name, json = config.json, "observability initialized");
    Ok(())
}
