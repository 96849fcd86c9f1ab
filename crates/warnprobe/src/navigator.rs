//! Page navigation for the source interface.

use crate::driver::WebDriver;
use crate::result::ProbeResult;

/// Path of the source homepage
pub const HOMEPAGE_PATH: &str = "/";

/// Drives a browser to the pages of the source interface
#[derive(Debug)]
pub struct SourceNavigator<'d, D: WebDriver> {
    base_url: String,
    driver: &'d mut D,
}

impl<'d, D: WebDriver> SourceNavigator<'d, D> {
    /// Wrap `driver`, resolving pages against `base_url`
    pub fn new(base_url: impl Into<String>, driver: &'d mut D) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, driver }
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of `path`
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// The underlying driver
    #[must_use]
    pub fn driver(&self) -> &D {
        &*self.driver
    }

    /// Open the source homepage
    pub async fn visit_homepage(&mut self) -> ProbeResult<()> {
        let url = self.url_for(HOMEPAGE_PATH);
        tracing::info!(%url, "visiting source homepage");
        self.driver.navigate(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};
    use crate::result::ProbeError;

    #[test]
    fn test_url_for() {
        let mut driver = MockDriver::new("ua");
        let nav = SourceNavigator::new("http://127.0.0.1:8080/", &mut driver);
        assert_eq!(nav.base_url(), "http://127.0.0.1:8080");
        assert_eq!(nav.url_for("/"), "http://127.0.0.1:8080/");
        assert_eq!(nav.url_for("lookup"), "http://127.0.0.1:8080/lookup");
    }

    #[tokio::test]
    async fn test_visit_homepage() {
        let mut driver = MockDriver::new("ua")
            .with_page("http://127.0.0.1:8080/", vec![MockElement::new("x", "y")]);
        let mut nav = SourceNavigator::new("http://127.0.0.1:8080", &mut driver);
        nav.visit_homepage().await.unwrap();
        assert_eq!(
            nav.driver().current_url().await.unwrap(),
            "http://127.0.0.1:8080/"
        );
        assert!(driver.was_called("navigate:http://127.0.0.1:8080/"));
    }

    #[tokio::test]
    async fn test_navigation_failure_propagates() {
        let mut driver = MockDriver::new("ua");
        let mut nav = SourceNavigator::new("http://127.0.0.1:9", &mut driver);
        let err = nav.visit_homepage().await.unwrap_err();
        assert!(matches!(err, ProbeError::Navigation { .. }));
    }
}
