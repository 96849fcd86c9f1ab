//! Run configuration.
//!
//! Loaded from YAML and then overridden by command-line flags. Every section
//! has defaults, so an empty file is a valid configuration.

use crate::identity::ProxySettings;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default base URL of the source interface
pub const DEFAULT_SOURCE_URL: &str = "http://127.0.0.1:8080";

/// Browser launch options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserOptions {
    /// Run in headless mode
    pub headless: bool,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<PathBuf>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            chromium_path: None,
            sandbox: true,
            viewport_width: 1280,
            viewport_height: 1024,
        }
    }
}

impl BrowserOptions {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }
}

/// Complete configuration for a scenario run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Base URL of the source interface
    pub source_url: String,
    /// Browser launch options
    pub browser: BrowserOptions,
    /// Polling for UI changes
    pub wait: WaitOptions,
    /// Tor proxy used for onion targets and Tor Browser sessions
    pub proxy: ProxySettings,
    /// Route every session through the proxy, not just onion targets
    pub force_proxy: bool,
    /// Fixed profile directory; a scratch directory is used when unset
    pub profile_dir: Option<PathBuf>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            browser: BrowserOptions::default(),
            wait: WaitOptions::default(),
            proxy: ProxySettings::default(),
            force_proxy: false,
            profile_dir: None,
        }
    }
}

impl ProbeConfig {
    /// Create a configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the source URL
    #[must_use]
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    /// Set the wait options
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Parse from YAML text
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load from a YAML file
    pub fn from_yaml_file(path: &Path) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ProbeError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&text)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check the configuration for values that cannot work
    pub fn validate(&self) -> ProbeResult<()> {
        let url = self.source_url.trim();
        if url.is_empty() {
            return Err(ProbeError::config("source_url must not be empty"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ProbeError::config(format!(
                "source_url must be an http(s) URL, got '{url}'"
            )));
        }
        self.wait.validate()?;
        self.proxy.validate()?;
        if self.browser.viewport_width == 0 || self.browser.viewport_height == 0 {
            return Err(ProbeError::config("viewport dimensions must be non-zero"));
        }
        Ok(())
    }
}
