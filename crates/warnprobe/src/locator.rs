//! Element selection for DOM assertions.
//!
//! A [`Selector`] names one element on the page. Drivers turn it into a
//! JavaScript expression ([`Selector::to_query`]) or a CSS selector
//! ([`Selector::to_css`]) depending on what their transport accepts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// Element id attribute (e.g., "browser-tb")
    Id(String),
    /// CSS selector (e.g., "div.alert > button")
    Css(String),
}

impl Selector {
    /// Create an id selector
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Convert to a CSS selector string
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Id(id) => format!("[id={}]", js_string(id)),
            Self::Css(s) => s.clone(),
        }
    }

    /// Convert to a JavaScript expression evaluating to the element or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Id(id) => format!("document.getElementById({})", js_string(id)),
            Self::Css(s) => format!("document.querySelector({})", js_string(s)),
        }
    }

    /// Script returning an [`ElementHandle`]-shaped object, or `null` when
    /// nothing matches.
    ///
    /// Visibility follows the usual WebDriver notion of "displayed": not
    /// `display: none`, not `visibility: hidden`, not fully transparent, and
    /// with a non-empty layout box.
    #[must_use]
    pub fn to_state_script(&self) -> String {
        format!(
            "(() => {{ \
                const el = {query}; \
                if (!el) {{ return null; }} \
                const style = window.getComputedStyle(el); \
                const rect = el.getBoundingClientRect(); \
                const displayed = style.display !== 'none' \
                    && style.visibility !== 'hidden' \
                    && style.opacity !== '0' \
                    && (rect.width > 0 || rect.height > 0); \
                return {{ tag_name: el.tagName.toLowerCase(), text: el.innerText || '', displayed }}; \
            }})()",
            query = self.to_query()
        )
    }

    /// Script that clicks the element and returns whether it existed
    #[must_use]
    pub fn to_click_script(&self) -> String {
        format!(
            "(() => {{ const el = {query}; if (!el) {{ return false; }} el.click(); return true; }})()",
            query = self.to_query()
        )
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Css(s) => write!(f, "{s}"),
        }
    }
}

/// Encode a string as a JavaScript string literal
fn js_string(s: &str) -> String {
    // JSON string literals are valid JavaScript string literals.
    serde_json::Value::String(s.to_string()).to_string()
}

/// Snapshot of a located element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Lowercase tag name
    pub tag_name: String,
    /// Rendered text content
    pub text: String,
    /// Whether the element is currently displayed
    pub displayed: bool,
}

impl ElementHandle {
    /// Create a displayed element snapshot
    #[must_use]
    pub fn new(tag_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            text: text.into(),
            displayed: true,
        }
    }

    /// Mark the snapshot as hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Check if the element is displayed
    #[must_use]
    pub const fn is_displayed(&self) -> bool {
        self.displayed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_id_query() {
            let selector = Selector::id("browser-tb");
            assert_eq!(
                selector.to_query(),
                "document.getElementById(\"browser-tb\")"
            );
        }

        #[test]
        fn test_css_query() {
            let selector = Selector::css("div.alert");
            assert_eq!(
                selector.to_query(),
                "document.querySelector(\"div.alert\")"
            );
        }

        #[test]
        fn test_id_to_css() {
            assert_eq!(
                Selector::id("browser-tb-close").to_css(),
                "[id=\"browser-tb-close\"]"
            );
        }

        #[test]
        fn test_display() {
            assert_eq!(Selector::id("browser-android").to_string(), "#browser-android");
            assert_eq!(Selector::css("p > a").to_string(), "p > a");
        }

        #[test]
        fn test_state_script_embeds_query() {
            let script = Selector::id("browser-security-level").to_state_script();
            assert!(script.contains("document.getElementById(\"browser-security-level\")"));
            assert!(script.contains("getComputedStyle"));
            assert!(script.contains("displayed"));
        }

        #[test]
        fn test_click_script() {
            let script = Selector::id("browser-tb-close").to_click_script();
            assert!(script.contains("el.click()"));
            assert!(script.contains("return false"));
        }

        #[test]
        fn test_quotes_are_escaped() {
            let query = Selector::id("a\"b").to_query();
            assert_eq!(query, "document.getElementById(\"a\\\"b\")");
        }
    }

    mod element_handle_tests {
        use super::*;

        #[test]
        fn test_new_is_displayed() {
            let el = ElementHandle::new("div", "text");
            assert!(el.is_displayed());
            assert!(!el.hidden().is_displayed());
        }

        #[test]
        fn test_deserialize_from_script_result() {
            let value = serde_json::json!({
                "tag_name": "div",
                "text": "It is recommended to use Tor Browser",
                "displayed": true
            });
            let el: ElementHandle = serde_json::from_value(value).unwrap();
            assert_eq!(el.tag_name, "div");
            assert!(el.displayed);
        }

        #[test]
        fn test_null_script_result_is_none() {
            let el: Option<ElementHandle> = serde_json::from_value(serde_json::Value::Null).unwrap();
            assert!(el.is_none());
        }
    }

    proptest! {
        #[test]
        fn prop_id_literal_round_trips(id in ".*") {
            let query = Selector::id(id.clone()).to_query();
            let literal = query
                .strip_prefix("document.getElementById(")
                .and_then(|s| s.strip_suffix(')'))
                .unwrap();
            let decoded: String = serde_json::from_str(literal).unwrap();
            prop_assert_eq!(decoded, id);
        }
    }
}
