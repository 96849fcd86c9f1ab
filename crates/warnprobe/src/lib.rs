//! Warnprobe: end-to-end checks for browser-environment warnings.
//!
//! Drives a real browser over the Chrome `DevTools` Protocol against a
//! whistleblower submission site and verifies that its source homepage warns
//! visitors about risky browsing environments: not using Tor Browser, using
//! Orbot on a phone, or running Tor Browser at a low security level.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    WARNPROBE Architecture                       │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenario   │    │ Session    │    │ Browser    │            │
//! │   │ (identity, │───►│ (profile,  │───►│ (chromium  │            │
//! │   │  banner)   │    │  UA check) │    │  via CDP)  │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │         │                                   ▲                   │
//! │         ▼                                   │                   │
//! │   ┌────────────┐    ┌────────────┐          │                   │
//! │   │ Navigator  │───►│ Warning    │──────────┘                   │
//! │   │ (homepage) │    │ assertions │  find / click / poll         │
//! │   └────────────┘    └────────────┘                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use warnprobe::{run_suite, ChromiumLauncher, ProbeConfig, Scenario};
//!
//! let config = ProbeConfig::new().with_source_url("http://127.0.0.1:8080");
//! let report = run_suite(&ChromiumLauncher::new(), &config, &Scenario::ALL, false).await;
//! assert!(report.all_passed());
//! ```

#![warn(missing_docs)]

mod config;
mod driver;
mod identity;
mod locator;
mod navigator;
mod profile;
mod result;
mod scenario;
mod session;
mod wait;
mod warning;

#[cfg(feature = "browser")]
mod browser;

pub use config::{BrowserOptions, ProbeConfig, DEFAULT_SOURCE_URL};
pub use driver::{
    ClickEffect, LaunchRecord, Launcher, MockDriver, MockElement, MockLauncher, WebDriver,
    BLANK_URL,
};
pub use identity::{
    is_loopback_host, is_onion_url, url_host, ProxySettings, SocksVersion, UserAgentProfile,
    DEFAULT_SOCKS_HOST, DEFAULT_SOCKS_PORT, DESKTOP_USER_AGENT, ORBOT_USER_AGENT,
    TOR_BROWSER_USER_AGENT,
};
pub use locator::{ElementHandle, Selector};
pub use navigator::{SourceNavigator, HOMEPAGE_PATH};
pub use profile::{ProfileDir, PROFILE_MARKER};
pub use result::{ProbeError, ProbeResult};
pub use scenario::{
    run_scenario, run_suite, run_suite_with, stopped_early, Scenario, ScenarioReport, SuiteReport,
};
pub use session::{with_session, Session, SessionConfig};
pub use wait::{
    WaitOptions, WaitResult, Waiter, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};
pub use warning::{
    assert_warning_shown, check_element, check_warning, dismiss_warning, find_required,
    WarningBanner,
};

#[cfg(feature = "browser")]
pub use browser::{chromium_args, ChromiumDriver, ChromiumLauncher};

/// Whether this build can drive a real browser
#[must_use]
pub const fn browser_enabled() -> bool {
    cfg!(feature = "browser")
}
