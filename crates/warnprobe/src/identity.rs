//! Browser identities: user-agent signatures and Tor proxy routing.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// User agent reported by a stock desktop Chromium
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// User agent of Firefox-based Orbot/Tor browsing on Android
pub const ORBOT_USER_AGENT: &str =
    "Mozilla/5.0 (Android; Mobile; rv:52.0) Gecko/20100101 Firefox/52.0";

/// Uniform user agent shipped by desktop Tor Browser
pub const TOR_BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Default SOCKS host of a locally running Tor Browser
pub const DEFAULT_SOCKS_HOST: &str = "127.0.0.1";

/// Default SOCKS port of a locally running Tor Browser
pub const DEFAULT_SOCKS_PORT: u16 = 9150;

/// Which browser a session pretends to be
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserAgentProfile {
    /// Ordinary desktop browser (not Tor)
    Desktop,
    /// Orbot-proxied mobile Firefox
    Orbot,
    /// Desktop Tor Browser at the "Standard" security level (JavaScript on)
    TorBrowser,
    /// Arbitrary user agent string
    Custom(String),
}

impl UserAgentProfile {
    /// User agent string sent by the browser
    #[must_use]
    pub fn user_agent(&self) -> &str {
        match self {
            Self::Desktop => DESKTOP_USER_AGENT,
            Self::Orbot => ORBOT_USER_AGENT,
            Self::TorBrowser => TOR_BROWSER_USER_AGENT,
            Self::Custom(ua) => ua,
        }
    }

    /// Whether this identity always routes through the Tor SOCKS proxy
    #[must_use]
    pub const fn always_proxied(&self) -> bool {
        matches!(self, Self::TorBrowser)
    }
}

impl fmt::Display for UserAgentProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Desktop => write!(f, "desktop"),
            Self::Orbot => write!(f, "orbot"),
            Self::TorBrowser => write!(f, "tor-browser"),
            Self::Custom(ua) => write!(f, "custom ({ua})"),
        }
    }
}

/// SOCKS protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SocksVersion {
    /// SOCKS4
    #[serde(rename = "4")]
    V4,
    /// SOCKS5
    #[default]
    #[serde(rename = "5")]
    V5,
}

impl SocksVersion {
    /// URL scheme for proxy configuration
    #[must_use]
    pub const fn scheme(self) -> &'static str {
        match self {
            Self::V4 => "socks4",
            Self::V5 => "socks5",
        }
    }
}

/// Proxy settings that route the browser through Tor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    /// SOCKS host
    pub host: String,
    /// SOCKS port
    pub port: u16,
    /// SOCKS version
    pub version: SocksVersion,
    /// Resolve names through the proxy so no DNS query leaks locally
    pub remote_dns: bool,
    /// Allow `.onion` names to be looked up at all
    pub allow_onion: bool,
    /// Extra hosts left to the local resolver when `remote_dns` is on
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bypass_hosts: Vec<String>,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_SOCKS_HOST.to_string(),
            port: DEFAULT_SOCKS_PORT,
            version: SocksVersion::V5,
            remote_dns: true,
            allow_onion: true,
            bypass_hosts: Vec::new(),
        }
    }
}

impl ProxySettings {
    /// Proxy server URL, e.g. `socks5://127.0.0.1:9150`
    #[must_use]
    pub fn server_url(&self) -> String {
        format!("{}://{}:{}", self.version.scheme(), self.host, self.port)
    }

    /// Host resolver rules keeping name resolution off the local resolver.
    ///
    /// Chromium never proxies loopback traffic, so `localhost` names and the
    /// proxy host itself stay resolvable. SOCKS4 resolves names in the
    /// browser, so no catch-all rule is emitted for it.
    #[must_use]
    pub fn resolver_rules(&self) -> Option<String> {
        let mut rules = Vec::new();
        if !self.allow_onion {
            rules.push("MAP *.onion ~NOTFOUND".to_string());
        }
        if self.remote_dns && self.version == SocksVersion::V5 {
            rules.push("MAP * ~NOTFOUND".to_string());
            let mut excluded: Vec<&str> = Vec::new();
            let candidates = [self.host.as_str(), "localhost", "*.localhost"]
                .into_iter()
                .chain(self.bypass_hosts.iter().map(String::as_str));
            for host in candidates {
                if !excluded.contains(&host) {
                    excluded.push(host);
                }
            }
            rules.extend(excluded.into_iter().map(|h| format!("EXCLUDE {h}")));
        }
        if rules.is_empty() {
            None
        } else {
            Some(rules.join(" , "))
        }
    }

    /// Check for settings the browser cannot honour
    pub fn validate(&self) -> ProbeResult<()> {
        if self.port == 0 {
            return Err(ProbeError::config("proxy port must not be zero"));
        }
        if self.host.trim().is_empty() {
            return Err(ProbeError::config("proxy host must not be empty"));
        }
        if self.remote_dns && self.version == SocksVersion::V4 {
            return Err(ProbeError::config(
                "proxy remote_dns requires SOCKS version 5",
            ));
        }
        Ok(())
    }

    /// Also leave `host` to the local resolver
    #[must_use]
    pub fn with_bypass_host(mut self, host: impl Into<String>) -> Self {
        let host = host.into();
        if !self.bypass_hosts.contains(&host) {
            self.bypass_hosts.push(host);
        }
        self
    }

    /// Chromium command-line switches for these settings
    #[must_use]
    pub fn to_chromium_args(&self) -> Vec<String> {
        let mut args = vec![format!("--proxy-server={}", self.server_url())];
        if let Some(rules) = self.resolver_rules() {
            args.push(format!("--host-resolver-rules={rules}"));
        }
        args
    }
}

/// Host portion of a URL, without scheme, credentials, port or path
#[must_use]
pub fn url_host(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    if host_port.starts_with('[') {
        return host_port
            .split_once(']')
            .map_or(host_port, |(h, _)| h.trim_start_matches('['));
    }
    host_port.split(':').next().unwrap_or("")
}

/// Whether `host` names this machine: `localhost`, `*.localhost` or a
/// loopback address
#[must_use]
pub fn is_loopback_host(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    host == "localhost"
        || host.ends_with(".localhost")
        || host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
}

/// Whether a target URL is an onion service that needs Tor routing
#[must_use]
pub fn is_onion_url(url: &str) -> bool {
    let host = url_host(url).trim_end_matches('.').to_ascii_lowercase();
    host.ends_with(".onion")
}
