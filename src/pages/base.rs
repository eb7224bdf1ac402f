use crate::core::DriverTrait;
use crate::errors::{AutomationError, Result};
use crate::handlers::element::timestamped_name;
use crate::handlers::{ElementHandler, WaitHandler, WaitOptions};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// One driver handle plus the composed element and wait handlers every page
/// action is built from.
pub struct Page {
    driver: Arc<dyn DriverTrait>,
    pub elements: ElementHandler,
    pub waits: WaitHandler,
    url: Option<String>,
    screenshots_dir: PathBuf,
}

impl Page {
    pub fn new(driver: Arc<dyn DriverTrait>) -> Self {
        Self {
            elements: ElementHandler::new(driver.clone()),
            waits: WaitHandler::new(driver.clone()),
            driver,
            url: None,
            screenshots_dir: PathBuf::from("screenshots"),
        }
    }

    /// The URL `open()` navigates to.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_screenshots_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.elements = ElementHandler::new(self.driver.clone()).with_screenshots_dir(dir.clone());
        self.screenshots_dir = dir;
        self
    }

    pub fn driver(&self) -> Arc<dyn DriverTrait> {
        self.driver.clone()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Navigate to the page's bound URL.
    pub async fn open(&self) -> Result<()> {
        let url = self.url.as_deref().ok_or_else(|| {
            AutomationError::ConfigurationError("page has no URL to open".to_string())
        })?;
        self.open_url(url).await
    }

    pub async fn open_url(&self, url: &str) -> Result<()> {
        self.driver.navigate(url).await?;
        info!(url, "page opened");
        Ok(())
    }

    pub async fn title(&self) -> Result<String> {
        self.driver.title().await
    }

    pub async fn current_url(&self) -> Result<String> {
        self.driver.current_url().await
    }

    pub async fn page_source(&self) -> Result<String> {
        self.driver.page_source().await
    }

    pub async fn refresh(&self) -> Result<()> {
        self.driver.refresh().await
    }

    pub async fn execute_script(&self, script: &str) -> Result<Value> {
        self.driver.execute_script(script).await
    }

    /// Full-page screenshot with a timestamped name, returning the path.
    pub async fn save_screenshot(&self, prefix: &str) -> Result<PathBuf> {
        let bytes = self.driver.screenshot().await?;
        let path = self.screenshots_dir.join(timestamped_name(prefix, "png"));
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;
        info!(path = %path.display(), "screenshot saved");
        Ok(path)
    }
}

/// Contract for concrete page objects.
///
/// Implementors supply the bound [`Page`], the name-to-locator map, and the
/// loaded check; `open()` and `locator()` come for free.
#[async_trait::async_trait]
pub trait PageObject: Send + Sync {
    fn page(&self) -> &Page;

    /// Named locators of this page.
    fn page_elements(&self) -> HashMap<&'static str, &'static str>;

    /// Whether the page is ready for interaction.
    async fn is_loaded(&self) -> Result<bool>;

    fn load_timeout(&self) -> Duration {
        Duration::from_secs(30)
    }

    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Look a locator up by name.
    fn locator(&self, name: &str) -> Result<&'static str> {
        self.page_elements()
            .get(name)
            .copied()
            .ok_or_else(|| AutomationError::UnknownElement(name.to_string()))
    }

    /// Navigate to the page's URL, then poll `is_loaded` until the load
    /// timeout.
    async fn open(&self) -> Result<()> {
        self.page().open().await?;

        let opts = WaitOptions::default().with_timeout(self.load_timeout());
        crate::handlers::wait_until(&format!("page loaded: {}", self.page_name()), opts, || {
            async move { self.is_loaded().await.unwrap_or(false) }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDriver;

    struct LoginPage {
        page: Page,
    }

    impl LoginPage {
        fn new(driver: Arc<dyn DriverTrait>) -> Self {
            Self {
                page: Page::new(driver).with_url("https://test.example.com/login"),
            }
        }

        async fn login(&self, username: &str, password: &str) -> Result<()> {
            self.page
                .elements
                .input_text(self.locator("username")?, username)
                .await?;
            self.page
                .elements
                .input_text(self.locator("password")?, password)
                .await?;
            self.page.elements.click(self.locator("submit")?).await
        }
    }

    #[async_trait::async_trait]
    impl PageObject for LoginPage {
        fn page(&self) -> &Page {
            &self.page
        }

        fn page_elements(&self) -> HashMap<&'static str, &'static str> {
            HashMap::from([
                ("username", "input[name='username']"),
                ("password", "input[name='password']"),
                ("submit", "button[type='submit']"),
            ])
        }

        async fn is_loaded(&self) -> Result<bool> {
            Ok(self
                .page
                .elements
                .is_displayed("input[name='username']")
                .await)
        }

        fn load_timeout(&self) -> Duration {
            Duration::from_millis(300)
        }
    }

    fn mock_login_form() -> Arc<MockDriver> {
        let driver = Arc::new(MockDriver::new());
        driver.add_element("input[name='username']", "");
        driver.add_element("input[name='password']", "");
        driver.add_element("button[type='submit']", "Sign in");
        driver
    }

    #[tokio::test]
    async fn open_navigates_and_waits_for_loaded() {
        let driver = mock_login_form();
        let page = LoginPage::new(driver.clone());

        page.open().await.unwrap();
        assert_eq!(
            driver.current_url().await.unwrap(),
            "https://test.example.com/login"
        );
    }

    #[tokio::test]
    async fn open_times_out_when_page_never_loads() {
        let driver = Arc::new(MockDriver::new());
        let page = LoginPage::new(driver);

        let err = page.open().await.unwrap_err();
        assert!(matches!(err, AutomationError::WaitTimeout { .. }));
    }

    #[tokio::test]
    async fn login_drives_the_named_locators() {
        let driver = mock_login_form();
        let page = LoginPage::new(driver.clone());

        page.login("ada", "hunter2").await.unwrap();

        assert_eq!(
            driver.inputs(),
            vec![
                ("input[name='username']".to_string(), "ada".to_string()),
                ("input[name='password']".to_string(), "hunter2".to_string()),
            ]
        );
        assert_eq!(driver.clicks(), vec!["button[type='submit']".to_string()]);
    }

    #[tokio::test]
    async fn unknown_locator_name_is_an_error() {
        let page = LoginPage::new(mock_login_form());
        let err = page.locator("captcha").unwrap_err();
        assert!(matches!(err, AutomationError::UnknownElement(name) if name == "captcha"));
    }

    #[tokio::test]
    async fn page_without_url_cannot_open() {
        let page = Page::new(Arc::new(MockDriver::new()));
        let err = page.open().await.unwrap_err();
        assert!(matches!(err, AutomationError::ConfigurationError(_)));
    }
}
