use crate::core::DriverTrait;
use crate::errors::{AutomationError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Locator-based operations over one driver, with logging and a best-effort
/// failure screenshot. No retries here; pages reach for `WaitHandler` when
/// they need polling.
pub struct ElementHandler {
    driver: Arc<dyn DriverTrait>,
    screenshots_dir: PathBuf,
    screenshot_on_failure: bool,
}

impl ElementHandler {
    pub fn new(driver: Arc<dyn DriverTrait>) -> Self {
        Self {
            driver,
            screenshots_dir: PathBuf::from("screenshots"),
            screenshot_on_failure: true,
        }
    }

    pub fn with_screenshots_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshots_dir = dir.into();
        self
    }

    pub fn screenshot_on_failure(mut self, enabled: bool) -> Self {
        self.screenshot_on_failure = enabled;
        self
    }

    pub async fn click(&self, locator: &str) -> Result<()> {
        debug!(locator, "clicking element");
        match self.driver.click(locator).await {
            Ok(()) => {
                info!(locator, "clicked element");
                Ok(())
            }
            Err(e) => Err(self.fail("click", locator, e).await),
        }
    }

    pub async fn input_text(&self, locator: &str, text: &str) -> Result<()> {
        debug!(locator, "typing into element");
        match self.driver.input(locator, text).await {
            Ok(()) => {
                info!(locator, chars = text.len(), "typed into element");
                Ok(())
            }
            Err(e) => Err(self.fail("input", locator, e).await),
        }
    }

    pub async fn get_text(&self, locator: &str) -> Result<String> {
        match self.driver.get_text(locator).await {
            Ok(text) => {
                debug!(locator, text = %text, "read element text");
                Ok(text)
            }
            Err(e) => Err(self.fail("get_text", locator, e).await),
        }
    }

    pub async fn get_attribute(&self, locator: &str, name: &str) -> Result<Option<String>> {
        match self.driver.get_attribute(locator, name).await {
            Ok(value) => {
                debug!(locator, name, ?value, "read element attribute");
                Ok(value)
            }
            Err(e) => Err(self.fail("get_attribute", locator, e).await),
        }
    }

    /// Display checks are queries, not interactions: errors mean "no".
    pub async fn is_displayed(&self, locator: &str) -> bool {
        self.driver.is_displayed(locator).await.unwrap_or(false)
    }

    pub async fn exists(&self, locator: &str) -> bool {
        self.driver.exists(locator).await.unwrap_or(false)
    }

    pub async fn hover(&self, locator: &str) -> Result<()> {
        debug!(locator, "hovering element");
        match self.driver.hover(locator).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail("hover", locator, e).await),
        }
    }

    pub async fn scroll_to(&self, locator: &str) -> Result<()> {
        debug!(locator, "scrolling to element");
        match self.driver.scroll_to(locator).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail("scroll_to", locator, e).await),
        }
    }

    /// Screenshot one element into the screenshots directory, returning the
    /// saved path.
    pub async fn save_element_screenshot(&self, locator: &str) -> Result<PathBuf> {
        let bytes = match self.driver.element_screenshot(locator).await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.fail("element_screenshot", locator, e).await),
        };

        let path = self
            .screenshots_dir
            .join(timestamped_name("element", "png"));
        write_bytes(&path, &bytes).await?;
        info!(locator, path = %path.display(), "element screenshot saved");
        Ok(path)
    }

    /// Log the failure, capture a page screenshot if enabled, re-raise the
    /// original error untouched.
    async fn fail(&self, operation: &str, locator: &str, error: AutomationError) -> AutomationError {
        warn!(operation, locator, error = %error, "element operation failed");

        if self.screenshot_on_failure {
            match self.capture_failure(operation).await {
                Ok(path) => info!(path = %path.display(), "failure screenshot saved"),
                Err(e) => debug!(error = %e, "failure screenshot unavailable"),
            }
        }
        error
    }

    async fn capture_failure(&self, operation: &str) -> Result<PathBuf> {
        let bytes = self.driver.screenshot().await?;
        let path = self
            .screenshots_dir
            .join(timestamped_name(&format!("failure_{operation}"), "png"));
        write_bytes(&path, &bytes).await?;
        Ok(path)
    }
}

pub(crate) fn timestamped_name(prefix: &str, ext: &str) -> String {
    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S%.3f");
    format!("{prefix}_{stamp}.{ext}")
}

async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDriver;

    #[tokio::test]
    async fn click_is_recorded_by_the_driver() {
        let driver = Arc::new(MockDriver::new());
        driver.add_element("#submit", "Send");

        let handler = ElementHandler::new(driver.clone()).screenshot_on_failure(false);
        handler.click("#submit").await.unwrap();

        assert_eq!(driver.clicks(), vec!["#submit".to_string()]);
    }

    #[tokio::test]
    async fn input_then_read_back() {
        let driver = Arc::new(MockDriver::new());
        driver.add_element("#name", "");

        let handler = ElementHandler::new(driver.clone()).screenshot_on_failure(false);
        handler.input_text("#name", "Ada").await.unwrap();

        assert_eq!(driver.inputs(), vec![("#name".to_string(), "Ada".to_string())]);
        assert_eq!(handler.get_text("#name").await.unwrap(), "Ada");
    }

    #[tokio::test]
    async fn failure_is_reraised_with_screenshot_saved() {
        let tmp = tempfile::tempdir().unwrap();
        let driver = Arc::new(MockDriver::new());

        let handler = ElementHandler::new(driver).with_screenshots_dir(tmp.path());
        let err = handler.click("#missing").await.unwrap_err();
        assert!(matches!(err, AutomationError::ElementNotFound(_)));

        let shots: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(shots.len(), 1, "one failure screenshot expected");
        let name = shots[0].as_ref().unwrap().file_name();
        assert!(name.to_string_lossy().starts_with("failure_click"));
    }

    #[tokio::test]
    async fn failure_screenshot_can_be_disabled() {
        let tmp = tempfile::tempdir().unwrap();
        let driver = Arc::new(MockDriver::new());

        let handler = ElementHandler::new(driver)
            .with_screenshots_dir(tmp.path())
            .screenshot_on_failure(false);
        handler.click("#missing").await.unwrap_err();

        assert!(std::fs::read_dir(tmp.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn queries_swallow_errors_into_false() {
        let driver = Arc::new(MockDriver::new());
        let handler = ElementHandler::new(driver).screenshot_on_failure(false);

        assert!(!handler.is_displayed("#nowhere").await);
        assert!(!handler.exists("#nowhere").await);
    }
}
