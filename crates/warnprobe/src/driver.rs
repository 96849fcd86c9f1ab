//! WebDriver - abstract browser automation seam.
//!
//! Scenarios only talk to a [`WebDriver`]. The CDP implementation lives in
//! [`crate::browser`] behind the `browser` feature; [`MockDriver`] simulates a
//! page's DOM so every scenario can run without a browser.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Launcher ──launch(config, profile)──► WebDriver              │
//! │     │                                     │                   │
//! │     ├─ ChromiumLauncher (CDP)             ├─ ChromiumDriver   │
//! │     └─ MockLauncher (unit tests)          └─ MockDriver       │
//! └───────────────────────────────────────────────────────────────┘
//! ```

use crate::locator::{ElementHandle, Selector};
use crate::result::{ProbeError, ProbeResult};
use crate::session::SessionConfig;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// URL of a freshly opened tab
pub const BLANK_URL: &str = "about:blank";

/// Abstract driver trait for browser automation
#[async_trait]
pub trait WebDriver: Send + Sync {
    /// Navigate to URL and wait for the load to finish
    async fn navigate(&mut self, url: &str) -> ProbeResult<()>;

    /// Get current URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Value of `navigator.userAgent` in the live page
    async fn user_agent(&self) -> ProbeResult<String>;

    /// Snapshot the element matching `selector`, if any
    async fn find_element(&self, selector: &Selector) -> ProbeResult<Option<ElementHandle>>;

    /// Click the element matching `selector`
    async fn click(&self, selector: &Selector) -> ProbeResult<()>;

    /// Close the browser
    async fn quit(&mut self) -> ProbeResult<()>;
}

/// Starts browsers for sessions
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Driver type produced by this launcher
    type Driver: WebDriver;

    /// Launch a browser configured by `config`, storing its state in `profile`
    async fn launch(&self, config: &SessionConfig, profile: &Path) -> ProbeResult<Self::Driver>;
}

// ============================================================================
// Mock DOM
// ============================================================================

/// What happens when a mock element is clicked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickEffect {
    /// Hide another element once it has been observed `after_polls` more times
    Hide {
        /// Id of the element to hide
        target: String,
        /// Number of lookups that still see it displayed
        after_polls: u32,
    },
}

/// An element in the simulated DOM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockElement {
    /// Element id
    pub id: String,
    /// Lowercase tag name
    pub tag_name: String,
    /// Rendered text
    pub text: String,
    /// Whether it is displayed
    pub displayed: bool,
    /// Click behaviour
    pub on_click: Option<ClickEffect>,
}

impl MockElement {
    /// A displayed `div` with text
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: "div".to_string(),
            text: text.into(),
            displayed: true,
            on_click: None,
        }
    }

    /// A `button` that hides `target` when clicked
    #[must_use]
    pub fn close_button(id: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag_name: "button".to_string(),
            text: "×".to_string(),
            displayed: true,
            on_click: Some(ClickEffect::Hide {
                target: target.into(),
                after_polls: 0,
            }),
        }
    }

    /// Set the tag name
    #[must_use]
    pub fn with_tag(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = tag_name.into();
        self
    }

    /// Start hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Delay a hide effect by `polls` lookups of its target
    #[must_use]
    pub fn hide_after_polls(mut self, polls: u32) -> Self {
        if let Some(ClickEffect::Hide { after_polls, .. }) = &mut self.on_click {
            *after_polls = polls;
        }
        self
    }

    /// A click that does nothing
    #[must_use]
    pub fn inert(mut self) -> Self {
        self.on_click = None;
        self
    }

    fn snapshot(&self) -> ElementHandle {
        ElementHandle {
            tag_name: self.tag_name.clone(),
            text: self.text.clone(),
            displayed: self.displayed,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    url: String,
    dom: Vec<MockElement>,
    pending_hides: HashMap<String, u32>,
    history: Vec<String>,
    closed: bool,
}

impl MockState {
    fn element_mut(&mut self, selector: &Selector) -> Option<&mut MockElement> {
        let id = mock_id(selector)?;
        self.dom.iter_mut().find(|e| e.id == id)
    }
}

/// Mock driver serving a fixed set of pages
pub struct MockDriver {
    user_agent: String,
    pages: HashMap<String, Vec<MockElement>>,
    state: Mutex<MockState>,
    quits: Option<Arc<AtomicUsize>>,
}

impl fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDriver")
            .field("user_agent", &self.user_agent)
            .field("pages", &self.pages.len())
            .finish_non_exhaustive()
    }
}

impl MockDriver {
    /// Create a mock browser reporting `user_agent`
    #[must_use]
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            pages: HashMap::new(),
            state: Mutex::new(MockState {
                url: BLANK_URL.to_string(),
                ..MockState::default()
            }),
            quits: None,
        }
    }

    /// Serve `elements` at `url`
    #[must_use]
    pub fn with_page(mut self, url: &str, elements: Vec<MockElement>) -> Self {
        let _ = self.pages.insert(normalize_url(url), elements);
        self
    }

    /// Count calls to `quit` in `counter`
    #[must_use]
    pub fn counting_quits(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.quits = Some(counter);
        self
    }

    /// Calls made so far, e.g. `navigate:http://...`, `click:#browser-tb-close`
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().map(|s| s.history.clone()).unwrap_or_default()
    }

    /// Check if a method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.history().iter().any(|c| c.starts_with(method))
    }

    /// Whether `quit` has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().map(|s| s.closed).unwrap_or(true)
    }

    fn lock(&self) -> ProbeResult<MutexGuard<'_, MockState>> {
        self.state
            .lock()
            .map_err(|_| ProbeError::script("mock browser state poisoned"))
    }

    fn open(&self) -> ProbeResult<MutexGuard<'_, MockState>> {
        let state = self.lock()?;
        if state.closed {
            return Err(ProbeError::script("browser session already closed"));
        }
        Ok(state)
    }
}

#[async_trait]
impl WebDriver for MockDriver {
    async fn navigate(&mut self, url: &str) -> ProbeResult<()> {
        let elements = self.pages.get(&normalize_url(url)).cloned();
        let mut state = self.open()?;
        state.history.push(format!("navigate:{url}"));
        let elements = elements.ok_or_else(|| ProbeError::Navigation {
            url: url.to_string(),
            message: "connection refused".to_string(),
        })?;
        state.url = url.to_string();
        state.dom = elements;
        state.pending_hides.clear();
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.open()?.url.clone())
    }

    async fn user_agent(&self) -> ProbeResult<String> {
        let _state = self.open()?;
        Ok(self.user_agent.clone())
    }

    async fn find_element(&self, selector: &Selector) -> ProbeResult<Option<ElementHandle>> {
        let mut state = self.open()?;
        let Some(id) = mock_id(selector).map(str::to_string) else {
            return Ok(None);
        };

        let hide_now = match state.pending_hides.get_mut(&id) {
            Some(0) => true,
            Some(remaining) => {
                *remaining -= 1;
                false
            }
            None => false,
        };
        if hide_now {
            let _ = state.pending_hides.remove(&id);
            if let Some(el) = state.element_mut(selector) {
                el.displayed = false;
            }
        }

        Ok(state.element_mut(selector).map(|e| e.snapshot()))
    }

    async fn click(&self, selector: &Selector) -> ProbeResult<()> {
        let mut state = self.open()?;
        state.history.push(format!("click:{selector}"));
        let effect = match state.element_mut(selector) {
            Some(el) if el.displayed => el.on_click.clone(),
            Some(_) => {
                return Err(ProbeError::NotDisplayed {
                    selector: selector.to_string(),
                })
            }
            None => {
                return Err(ProbeError::ElementNotFound {
                    selector: selector.to_string(),
                })
            }
        };

        if let Some(ClickEffect::Hide {
            target,
            after_polls,
        }) = effect
        {
            if after_polls == 0 {
                let target_selector = Selector::Id(target);
                if let Some(el) = state.element_mut(&target_selector) {
                    el.displayed = false;
                }
            } else {
                let _ = state.pending_hides.insert(target, after_polls);
            }
        }
        Ok(())
    }

    async fn quit(&mut self) -> ProbeResult<()> {
        let mut state = self.lock()?;
        state.history.push("quit".to_string());
        state.closed = true;
        if let Some(counter) = &self.quits {
            let _ = counter.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

fn mock_id(selector: &Selector) -> Option<&str> {
    match selector {
        Selector::Id(id) => Some(id),
        Selector::Css(css) => css.strip_prefix('#'),
    }
}

fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

// ============================================================================
// Mock launcher
// ============================================================================

/// What the mock launcher was asked to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRecord {
    /// User agent override requested
    pub user_agent: String,
    /// Profile directory handed to the browser
    pub profile: PathBuf,
    /// Whether the profile existed at launch time
    pub profile_existed: bool,
    /// Proxy server, if one was configured
    pub proxy_server: Option<String>,
}

type PageFactory = dyn Fn(&str) -> Vec<MockElement> + Send + Sync;

/// Launcher producing [`MockDriver`]s
///
/// The page factory receives the configured user agent, so a test can render
/// a different DOM for each browser identity the way a real server would.
#[derive(Clone)]
pub struct MockLauncher {
    url: String,
    page: Arc<PageFactory>,
    reported_user_agent: Option<String>,
    fail_launch: Option<String>,
    launches: Arc<Mutex<Vec<LaunchRecord>>>,
    quits: Arc<AtomicUsize>,
}

impl fmt::Debug for MockLauncher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockLauncher")
            .field("url", &self.url)
            .field("reported_user_agent", &self.reported_user_agent)
            .field("fail_launch", &self.fail_launch)
            .finish_non_exhaustive()
    }
}

impl MockLauncher {
    /// Serve the DOM built by `page` at `url`
    pub fn new<F>(url: impl Into<String>, page: F) -> Self
    where
        F: Fn(&str) -> Vec<MockElement> + Send + Sync + 'static,
    {
        Self {
            url: url.into(),
            page: Arc::new(page),
            reported_user_agent: None,
            fail_launch: None,
            launches: Arc::new(Mutex::new(Vec::new())),
            quits: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make the browser ignore the configured user agent and report this one
    #[must_use]
    pub fn reporting_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.reported_user_agent = Some(user_agent.into());
        self
    }

    /// Make every launch fail with `message`
    #[must_use]
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.fail_launch = Some(message.into());
        self
    }

    /// Launches performed so far
    #[must_use]
    pub fn launches(&self) -> Vec<LaunchRecord> {
        self.launches.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Browsers launched by this launcher that have since been quit
    #[must_use]
    pub fn quits(&self) -> usize {
        self.quits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Launcher for MockLauncher {
    type Driver = MockDriver;

    async fn launch(&self, config: &SessionConfig, profile: &Path) -> ProbeResult<MockDriver> {
        let requested = config.user_agent().to_string();
        self.launches
            .lock()
            .map_err(|_| ProbeError::script("mock launcher state poisoned"))?
            .push(LaunchRecord {
                user_agent: requested.clone(),
                profile: profile.to_path_buf(),
                profile_existed: profile.is_dir(),
                proxy_server: config.proxy.as_ref().map(|p| p.server_url()),
            });

        if let Some(message) = &self.fail_launch {
            return Err(ProbeError::BrowserLaunch {
                message: message.clone(),
            });
        }

        let reported = self.reported_user_agent.clone().unwrap_or(requested);
        let elements = (self.page)(&reported);
        Ok(MockDriver::new(reported)
            .with_page(&self.url, elements)
            .counting_quits(Arc::clone(&self.quits)))
    }
}
