//! Session provisioning.
//!
//! A [`Session`] is one browser with one identity and one profile directory.
//! Launching verifies that the live browser really reports the configured
//! user agent. Quitting (or dropping) the session removes the profile.

use crate::config::{BrowserOptions, ProbeConfig};
use crate::driver::{Launcher, WebDriver};
use crate::identity::{is_loopback_host, is_onion_url, url_host, ProxySettings, UserAgentProfile};
use crate::profile::ProfileDir;
use crate::result::{ProbeError, ProbeResult};
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Everything needed to provision one browser session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Browser identity (user agent override)
    pub identity: UserAgentProfile,
    /// SOCKS proxy, when the session routes through Tor
    pub proxy: Option<ProxySettings>,
    /// Browser launch options
    pub browser: BrowserOptions,
    /// Fixed profile directory; scratch when unset
    pub profile_dir: Option<PathBuf>,
}

impl SessionConfig {
    /// A direct (unproxied) session with default browser options
    #[must_use]
    pub fn new(identity: UserAgentProfile) -> Self {
        Self {
            identity,
            proxy: None,
            browser: BrowserOptions::default(),
            profile_dir: None,
        }
    }

    /// Session for `identity` against the configured target.
    ///
    /// The proxy is applied when the target is an onion service, when the
    /// identity is Tor Browser, or when `force_proxy` is set. A loopback
    /// target host is left to the local resolver.
    #[must_use]
    pub fn for_target(identity: UserAgentProfile, config: &ProbeConfig) -> Self {
        let proxied =
            config.force_proxy || identity.always_proxied() || is_onion_url(&config.source_url);
        let target_host = url_host(&config.source_url);
        let proxy = proxied.then(|| {
            if is_loopback_host(target_host) {
                config.proxy.clone().with_bypass_host(target_host)
            } else {
                config.proxy.clone()
            }
        });
        Self {
            proxy,
            browser: config.browser.clone(),
            profile_dir: config.profile_dir.clone(),
            identity,
        }
    }

    /// Route through `proxy`
    #[must_use]
    pub fn with_proxy(mut self, proxy: ProxySettings) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Set browser launch options
    #[must_use]
    pub fn with_browser(mut self, browser: BrowserOptions) -> Self {
        self.browser = browser;
        self
    }

    /// Use a fixed profile directory
    #[must_use]
    pub fn with_profile_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.profile_dir = Some(path.into());
        self
    }

    /// User agent override
    #[must_use]
    pub fn user_agent(&self) -> &str {
        self.identity.user_agent()
    }
}

/// A live browser session
#[derive(Debug)]
pub struct Session<D: WebDriver> {
    id: Uuid,
    user_agent: String,
    driver: D,
    profile: Option<ProfileDir>,
}

impl<D: WebDriver> Session<D> {
    /// Provision a browser for `config` and verify its user agent
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::BrowserLaunch`] if the browser cannot start and
    /// [`ProbeError::UserAgentMismatch`] if it reports a different user agent
    /// than configured. In both cases nothing is left running.
    pub async fn launch<L>(launcher: &L, config: SessionConfig) -> ProbeResult<Self>
    where
        L: Launcher<Driver = D>,
    {
        let id = Uuid::new_v4();
        let profile = ProfileDir::create(config.profile_dir.as_deref())?;
        let expected = config.user_agent().to_string();
        let proxy = config.proxy.as_ref().map(ProxySettings::server_url);

        tracing::info!(
            session = %id,
            identity = %config.identity,
            profile = %profile.path().display(),
            proxy = proxy.as_deref(),
            "launching browser session"
        );

        let mut driver = launcher.launch(&config, profile.path()).await?;

        let actual = match driver.user_agent().await {
            Ok(ua) => ua,
            Err(e) => {
                shutdown(&mut driver, id).await;
                return Err(e);
            }
        };
        if actual != expected {
            tracing::warn!(session = %id, %expected, %actual, "user agent override not applied");
            shutdown(&mut driver, id).await;
            return Err(ProbeError::UserAgentMismatch { expected, actual });
        }

        Ok(Self {
            id,
            user_agent: actual,
            driver,
            profile: Some(profile),
        })
    }

    /// Unique session id (used in logs)
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// User agent verified at launch
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Profile directory, while the session is open
    #[must_use]
    pub fn profile_path(&self) -> Option<&Path> {
        self.profile.as_ref().map(ProfileDir::path)
    }

    /// Get the driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Get the driver mutably
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Close the browser and remove the profile directory
    ///
    /// # Errors
    ///
    /// Returns the first failure; the profile is removed even when closing
    /// the browser fails.
    pub async fn quit(mut self) -> ProbeResult<()> {
        let closed = self.driver.quit().await;
        let removed = self.profile.take().map_or(Ok(()), ProfileDir::remove);
        tracing::info!(session = %self.id, "browser session closed");
        closed.and(removed)
    }

    /// Quit the session and combine the result with the work done in it.
    ///
    /// The browser is closed and the profile removed whatever `outcome` is.
    /// A teardown failure is returned only when `outcome` succeeded;
    /// otherwise it is logged and `outcome`'s error wins.
    pub async fn finish<T>(self, outcome: ProbeResult<T>) -> ProbeResult<T> {
        let id = self.id;
        let quit = self.quit().await;
        match (outcome, quit) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), quit) => {
                if let Err(q) = quit {
                    tracing::warn!(session = %id, error = %q, "teardown failed after scenario error");
                }
                Err(e)
            }
        }
    }
}

impl<D: WebDriver> Drop for Session<D> {
    fn drop(&mut self) {
        if self.profile.is_some() {
            tracing::debug!(session = %self.id, "session dropped without quit");
        }
    }
}

async fn shutdown<D: WebDriver>(driver: &mut D, id: Uuid) {
    if let Err(e) = driver.quit().await {
        tracing::warn!(session = %id, error = %e, "failed to close browser");
    }
}

/// Run `body` against a fresh session and always quit it afterwards.
///
/// ```ignore
/// let ua = with_session(&launcher, config, |session| {
///     Box::pin(async move { Ok(session.user_agent().to_string()) })
/// })
/// .await?;
/// ```
///
/// # Errors
///
/// Returns the body's error if it failed, otherwise any error from quitting.
pub async fn with_session<L, T, F>(launcher: &L, config: SessionConfig, body: F) -> ProbeResult<T>
where
    L: Launcher,
    F: for<'s> FnOnce(&'s mut Session<L::Driver>) -> BoxFuture<'s, ProbeResult<T>>,
{
    let mut session = Session::launch(launcher, config).await?;
    let outcome = body(&mut session).await;
    session.finish(outcome).await
}
