//! Browser control for headless testing.
//!
//! Real browser control via the Chrome `DevTools` Protocol, using
//! chromiumoxide. Compiled only with the `browser` feature; without it,
//! scenarios run against [`crate::driver::MockLauncher`].

use crate::driver::{Launcher, WebDriver, BLANK_URL};
use crate::locator::{ElementHandle, Selector};
use crate::result::{ProbeError, ProbeResult};
use crate::session::SessionConfig;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use std::path::Path;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Chromium command-line switches for a session
#[must_use]
pub fn chromium_args(config: &SessionConfig) -> Vec<String> {
    let mut args = vec![format!("--user-agent={}", config.user_agent())];
    if let Some(proxy) = &config.proxy {
        args.extend(proxy.to_chromium_args());
    }
    args
}

/// Launches Chromium over CDP
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumLauncher;

impl ChromiumLauncher {
    /// Create a launcher
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Launcher for ChromiumLauncher {
    type Driver = ChromiumDriver;

    async fn launch(&self, config: &SessionConfig, profile: &Path) -> ProbeResult<ChromiumDriver> {
        let options = &config.browser;
        let mut builder = CdpConfig::builder()
            .user_data_dir(profile)
            .window_size(options.viewport_width, options.viewport_height)
            .args(chromium_args(config));

        if !options.headless {
            builder = builder.with_head();
        }

        if !options.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = options.chromium_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|message| ProbeError::BrowserLaunch { message })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| ProbeError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        // Spawn handler task
        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page(BLANK_URL).await {
            Ok(page) => page,
            Err(e) => {
                handle.abort();
                return Err(ProbeError::BrowserLaunch {
                    message: format!("cannot open tab: {e}"),
                });
            }
        };

        Ok(ChromiumDriver {
            browser: Mutex::new(browser),
            page: Mutex::new(page),
            handle,
        })
    }
}

/// A browser tab with a real CDP connection
#[derive(Debug)]
pub struct ChromiumDriver {
    browser: Mutex<CdpBrowser>,
    page: Mutex<CdpPage>,
    handle: JoinHandle<()>,
}

impl ChromiumDriver {
    async fn evaluate(&self, script: &str) -> ProbeResult<serde_json::Value> {
        let page = self.page.lock().await;
        let result = page
            .evaluate(script)
            .await
            .map_err(|e| ProbeError::script(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }
}

#[async_trait]
impl WebDriver for ChromiumDriver {
    async fn navigate(&mut self, url: &str) -> ProbeResult<()> {
        let page = self.page.lock().await;
        page.goto(url).await.map_err(|e| ProbeError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        let page = self.page.lock().await;
        let url = page
            .url()
            .await
            .map_err(|e| ProbeError::script(e.to_string()))?;
        Ok(url.unwrap_or_else(|| BLANK_URL.to_string()))
    }

    async fn user_agent(&self) -> ProbeResult<String> {
        match self.evaluate("navigator.userAgent").await? {
            serde_json::Value::String(ua) => Ok(ua),
            other => Err(ProbeError::script(format!(
                "navigator.userAgent is not a string: {other}"
            ))),
        }
    }

    async fn find_element(&self, selector: &Selector) -> ProbeResult<Option<ElementHandle>> {
        let value = self.evaluate(&selector.to_state_script()).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn click(&self, selector: &Selector) -> ProbeResult<()> {
        let page = self.page.lock().await;
        let element = page
            .find_element(selector.to_css())
            .await
            .map_err(|_| ProbeError::ElementNotFound {
                selector: selector.to_string(),
            })?;
        element
            .click()
            .await
            .map_err(|e| ProbeError::script(format!("click on {selector} failed: {e}")))?;
        Ok(())
    }

    async fn quit(&mut self) -> ProbeResult<()> {
        let mut browser = self.browser.lock().await;
        let closed = browser
            .close()
            .await
            .map_err(|e| ProbeError::script(format!("cannot close browser: {e}")));
        let _ = browser.wait().await;
        self.handle.abort();
        closed.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbeConfig;
    use crate::identity::{ProxySettings, UserAgentProfile, ORBOT_USER_AGENT};

    fn resolver_rules(args: &[String]) -> &str {
        args.iter()
            .find_map(|a| a.strip_prefix("--host-resolver-rules="))
            .unwrap()
    }

    #[test]
    fn test_args_direct_session() {
        let args = chromium_args(&SessionConfig::new(UserAgentProfile::Orbot));
        assert_eq!(args, vec![format!("--user-agent={ORBOT_USER_AGENT}")]);
    }

    #[test]
    fn test_args_proxied_session() {
        let config =
            SessionConfig::new(UserAgentProfile::TorBrowser).with_proxy(ProxySettings::default());
        let args = chromium_args(&config);
        assert_eq!(args.len(), 3);
        assert!(args.contains(&"--proxy-server=socks5://127.0.0.1:9150".to_string()));
    }

    #[test]
    fn test_args_localhost_target_stays_resolvable() {
        let probe = ProbeConfig::new().with_source_url("http://localhost:8080");
        let config = SessionConfig::for_target(UserAgentProfile::TorBrowser, &probe);
        let args = chromium_args(&config);
        let rules = resolver_rules(&args);
        assert!(rules.starts_with("MAP * ~NOTFOUND"));
        assert!(rules.contains("EXCLUDE localhost"));
    }

    #[test]
    fn test_args_named_loopback_target_is_excluded() {
        let probe = ProbeConfig::new().with_source_url("http://source.localhost:8080/");
        let args = chromium_args(&SessionConfig::for_target(UserAgentProfile::TorBrowser, &probe));
        assert!(resolver_rules(&args).ends_with("EXCLUDE source.localhost"));
    }

    #[test]
    fn test_args_onion_target_gets_no_bypass() {
        let probe = ProbeConfig::new().with_source_url("http://abcdef.onion/");
        let config = SessionConfig::for_target(UserAgentProfile::Desktop, &probe);
        let args = chromium_args(&config);
        assert!(!resolver_rules(&args).contains("onion"));
        assert!(config.proxy.unwrap().bypass_hosts.is_empty());
    }
}
