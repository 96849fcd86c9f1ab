//! Warning banner assertions.
//!
//! The source homepage renders one banner per risky browsing environment.
//! Each banner has a fixed element id, a sentence it must contain, and for
//! the dismissible ones a paired close control.

use crate::driver::WebDriver;
use crate::locator::{ElementHandle, Selector};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{WaitResult, Waiter};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A browser-environment warning rendered by the source interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningBanner {
    /// Visitor is not using Tor Browser
    TorBrowser,
    /// Visitor is using Orbot / a mobile Tor setup
    Orbot,
    /// Tor Browser's Security Level is at "Standard"
    SecurityLevel,
}

impl WarningBanner {
    /// All banners
    pub const ALL: [Self; 3] = [Self::TorBrowser, Self::Orbot, Self::SecurityLevel];

    /// Id of the banner element
    #[must_use]
    pub const fn element_id(self) -> &'static str {
        match self {
            Self::TorBrowser => "browser-tb",
            Self::Orbot => "browser-android",
            Self::SecurityLevel => "browser-security-level",
        }
    }

    /// Id of the control that dismisses the banner
    #[must_use]
    pub const fn close_id(self) -> Option<&'static str> {
        match self {
            Self::TorBrowser => Some("browser-tb-close"),
            Self::Orbot => Some("browser-android-close"),
            Self::SecurityLevel => None,
        }
    }

    /// Text the banner must contain
    #[must_use]
    pub const fn expected_text(self) -> &'static str {
        match self {
            Self::TorBrowser => "It is recommended to use Tor Browser",
            Self::Orbot => "use the desktop version of Tor Browser",
            Self::SecurityLevel => "Security Level is too low",
        }
    }

    /// Selector for the banner element
    #[must_use]
    pub fn selector(self) -> Selector {
        Selector::id(self.element_id())
    }

    /// Selector for the close control
    #[must_use]
    pub fn close_selector(self) -> Option<Selector> {
        self.close_id().map(Selector::id)
    }
}

impl fmt::Display for WarningBanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TorBrowser => "tor-browser",
            Self::Orbot => "orbot",
            Self::SecurityLevel => "security-level",
        };
        write!(f, "{name}")
    }
}

/// Find the element matching `selector` or fail
pub async fn find_required<D: WebDriver>(
    driver: &D,
    selector: &Selector,
) -> ProbeResult<ElementHandle> {
    tracing::debug!(%selector, "looking up element");
    driver
        .find_element(selector)
        .await?
        .ok_or_else(|| ProbeError::ElementNotFound {
            selector: selector.to_string(),
        })
}

/// Assert the element is displayed and its text contains `expected`
pub fn check_element(
    selector: &Selector,
    element: &ElementHandle,
    expected: &str,
) -> ProbeResult<()> {
    if !element.is_displayed() {
        return Err(ProbeError::NotDisplayed {
            selector: selector.to_string(),
        });
    }
    if !element.text.contains(expected) {
        return Err(ProbeError::TextMismatch {
            selector: selector.to_string(),
            expected: expected.to_string(),
            actual: element.text.clone(),
        });
    }
    Ok(())
}

/// Assert `banner` is visible and carries its warning text
///
/// # Errors
///
/// [`ProbeError::ElementNotFound`], [`ProbeError::NotDisplayed`] or
/// [`ProbeError::TextMismatch`] when the banner is not shown correctly.
pub async fn assert_warning_shown<D: WebDriver>(
    driver: &D,
    banner: WarningBanner,
) -> ProbeResult<ElementHandle> {
    let selector = banner.selector();
    let element = find_required(driver, &selector).await?;
    check_element(&selector, &element, banner.expected_text())?;
    tracing::info!(%banner, "warning banner shown");
    Ok(element)
}

/// Whether `selector` currently resolves to a hidden element
async fn is_hidden<D: WebDriver>(driver: &D, selector: &Selector) -> ProbeResult<bool> {
    Ok(!find_required(driver, selector).await?.is_displayed())
}

/// Click the banner's close control and wait until the banner is hidden
///
/// # Errors
///
/// [`ProbeError::Config`] for banners without a close control,
/// [`ProbeError::ElementNotFound`] when the control is missing and
/// [`ProbeError::Timeout`] when the banner stays visible.
pub async fn dismiss_warning<D: WebDriver>(
    driver: &D,
    banner: WarningBanner,
    waiter: &Waiter,
) -> ProbeResult<WaitResult> {
    let close = banner.close_selector().ok_or_else(|| {
        ProbeError::config(format!("warning banner '{banner}' has no close control"))
    })?;
    let _ = find_required(driver, &close).await?;
    driver.click(&close).await?;

    let selector = banner.selector();
    let waited_for = format!("{selector} to be hidden");
    let result = waiter
        .wait_for(&waited_for, || is_hidden(driver, &selector))
        .await?;
    tracing::info!(%banner, attempts = result.attempts, "warning banner dismissed");
    Ok(result)
}

/// Assert the banner is shown, then dismiss it when it can be dismissed
pub async fn check_warning<D: WebDriver>(
    driver: &D,
    banner: WarningBanner,
    waiter: &Waiter,
) -> ProbeResult<()> {
    let _ = assert_warning_shown(driver, banner).await?;
    if banner.close_id().is_some() {
        let _ = dismiss_warning(driver, banner, waiter).await?;
    }
    Ok(())
}
