use crate::config::BrowserConfig;
use crate::core::{DriverKind, DriverTrait};
use crate::driver::{ChromeDriver, HttpDriver};
use crate::errors::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use tracing::info;

/// Which backend a hybrid driver currently delegates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverMode {
    Browser,
    Session,
}

/// A driver owning both a browser and an HTTP session, switchable at
/// runtime. Switching modes carries the current URL into the other backend
/// so the page under test stays the same.
pub struct HybridDriver {
    chrome: ChromeDriver,
    http: HttpDriver,
    mode: Mutex<DriverMode>,
}

impl HybridDriver {
    /// Launches the browser backend immediately; starts in browser mode.
    pub fn launch(config: &BrowserConfig) -> Result<Self> {
        Ok(Self {
            chrome: ChromeDriver::launch(config)?,
            http: HttpDriver::new(config)?,
            mode: Mutex::new(DriverMode::Browser),
        })
    }

    pub fn mode(&self) -> DriverMode {
        *self.mode.lock().expect("mode lock poisoned")
    }

    fn active(&self) -> &dyn DriverTrait {
        match self.mode() {
            DriverMode::Browser => &self.chrome,
            DriverMode::Session => &self.http,
        }
    }

    /// Switch backends, re-opening the current URL on the target side
    /// when one is loaded.
    pub async fn switch_mode(&self, mode: DriverMode) -> Result<()> {
        if self.mode() == mode {
            return Ok(());
        }

        let url = self.active().current_url().await.ok();
        *self.mode.lock().expect("mode lock poisoned") = mode;

        if let Some(url) = url {
            self.active().navigate(&url).await?;
        }
        info!(?mode, "hybrid driver switched");
        Ok(())
    }
}

#[async_trait]
impl DriverTrait for HybridDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Hybrid
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.active().navigate(url).await
    }

    async fn current_url(&self) -> Result<String> {
        self.active().current_url().await
    }

    async fn title(&self) -> Result<String> {
        self.active().title().await
    }

    async fn page_source(&self) -> Result<String> {
        self.active().page_source().await
    }

    async fn exists(&self, locator: &str) -> Result<bool> {
        self.active().exists(locator).await
    }

    async fn is_displayed(&self, locator: &str) -> Result<bool> {
        self.active().is_displayed(locator).await
    }

    async fn click(&self, locator: &str) -> Result<()> {
        self.active().click(locator).await
    }

    async fn input(&self, locator: &str, text: &str) -> Result<()> {
        self.active().input(locator, text).await
    }

    async fn get_text(&self, locator: &str) -> Result<String> {
        self.active().get_text(locator).await
    }

    async fn get_attribute(&self, locator: &str, name: &str) -> Result<Option<String>> {
        self.active().get_attribute(locator, name).await
    }

    async fn hover(&self, locator: &str) -> Result<()> {
        self.active().hover(locator).await
    }

    async fn scroll_to(&self, locator: &str) -> Result<()> {
        self.active().scroll_to(locator).await
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.active().screenshot().await
    }

    async fn element_screenshot(&self, locator: &str) -> Result<Vec<u8>> {
        self.active().element_screenshot(locator).await
    }

    async fn execute_script(&self, script: &str) -> Result<Value> {
        self.active().execute_script(script).await
    }

    async fn refresh(&self) -> Result<()> {
        self.active().refresh().await
    }

    async fn close(&self) -> Result<()> {
        self.http.close().await?;
        self.chrome.close().await
    }
}
