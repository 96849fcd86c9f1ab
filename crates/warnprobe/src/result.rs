//! Result and error types for Warnprobe.

use thiserror::Error;

/// Result type for Warnprobe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while provisioning a session or checking a page
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// No element matched the selector
    #[error("No element matches {selector}")]
    ElementNotFound {
        /// Selector description
        selector: String,
    },

    /// Element exists but is not rendered visibly
    #[error("Element {selector} is not displayed")]
    NotDisplayed {
        /// Selector description
        selector: String,
    },

    /// Element text did not contain the expected substring
    #[error("Element {selector} text does not contain '{expected}' (got '{actual}')")]
    TextMismatch {
        /// Selector description
        selector: String,
        /// Expected substring
        expected: String,
        /// Actual element text
        actual: String,
    },

    /// The live browser reports a different user agent than configured
    #[error("User agent mismatch: expected '{expected}', browser reports '{actual}'")]
    UserAgentMismatch {
        /// Configured override
        expected: String,
        /// Value of `navigator.userAgent`
        actual: String,
    },

    /// Operation timed out
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for
        waited_for: String,
    },

    /// Script evaluation error
    #[error("Script evaluation failed: {message}")]
    Script {
        /// Error message
        message: String,
    },

    /// Profile directory setup or cleanup failed
    #[error("Profile error: {message}")]
    Profile {
        /// Error message
        message: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create a script evaluation error
    #[must_use]
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this failure came from an assertion on page content rather
    /// than from infrastructure (launch, navigation, I/O).
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. }
                | Self::NotDisplayed { .. }
                | Self::TextMismatch { .. }
                | Self::UserAgentMismatch { .. }
                | Self::Timeout { .. }
        )
    }
}
