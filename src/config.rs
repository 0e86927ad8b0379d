//! Server configuration.

use crate::error::{Result, ViewerError};
use std::time::Duration;
use url::Url;

/// Origin of the Nutrient web SDK CDN.
pub const CDN_ORIGIN: &str = "https://cdn.cloud.pspdfkit.com";

/// Default SDK version served from the CDN.
pub const DEFAULT_SDK_VERSION: &str = "2024.7.0";

/// Default interval between widget polls of the host channel.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Configuration for the MCP server and the widgets it serves.
///
/// # Example
///
/// ```
/// let config = nutrient_mcp::Config::default()
///     .with_base_url("https://viewer.example.com")
///     .unwrap()
///     .with_sdk_version("2024.8.1");
/// assert_eq!(
///     config.sdk_base_url(),
///     "https://cdn.cloud.pspdfkit.com/pspdfkit-web@2024.8.1/"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) base_url: Url,
    pub(crate) sdk_version: String,
    pub(crate) poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Url::parse("http://localhost:3000").expect("static URL is valid"),
            sdk_version: DEFAULT_SDK_VERSION.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl Config {
    /// Build from `NUTRIENT_MCP_BASE_URL`, `NUTRIENT_SDK_VERSION` and
    /// `NUTRIENT_POLL_INTERVAL_MS`, falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(url) = non_empty_var("NUTRIENT_MCP_BASE_URL") {
            config = config.with_base_url(url)?;
        }
        if let Some(version) = non_empty_var("NUTRIENT_SDK_VERSION") {
            config = config.with_sdk_version(version);
        }
        if let Some(ms) = non_empty_var("NUTRIENT_POLL_INTERVAL_MS") {
            let ms: u64 = ms.parse().map_err(|_| {
                ViewerError::Config(format!("NUTRIENT_POLL_INTERVAL_MS is not a number: {}", ms))
            })?;
            config = config.with_poll_interval(Duration::from_millis(ms))?;
        }
        Ok(config)
    }

    /// Override the app's own origin.
    pub fn with_base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();
        self.base_url = Url::parse(url)
            .map_err(|e| ViewerError::Config(format!("invalid base URL {}: {}", url, e)))?;
        Ok(self)
    }

    /// Override the CDN SDK version.
    pub fn with_sdk_version(mut self, version: impl Into<String>) -> Self {
        self.sdk_version = version.into();
        self
    }

    /// Override the widget poll interval. Zero is rejected.
    pub fn with_poll_interval(mut self, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(ViewerError::Config("poll interval must be non-zero".into()));
        }
        self.poll_interval = interval;
        Ok(self)
    }

    /// Scheme, host and port of the app, as it appears in CSP lists.
    pub fn origin(&self) -> String {
        self.base_url.origin().ascii_serialization()
    }

    pub fn sdk_version(&self) -> &str {
        &self.sdk_version
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// `baseUrl` handed to the SDK loader.
    pub fn sdk_base_url(&self) -> String {
        format!("{}/pspdfkit-web@{}/", CDN_ORIGIN, self.sdk_version)
    }

    /// URL of the SDK script tag.
    pub fn sdk_script_url(&self) -> String {
        format!("{}pspdfkit.js", self.sdk_base_url())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
