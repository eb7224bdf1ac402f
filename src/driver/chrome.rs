use crate::config::BrowserConfig;
use crate::core::{DriverKind, DriverTrait};
use crate::errors::{AutomationError, Result};
use async_trait::async_trait;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use std::ffi::OsStr;
use std::sync::{Arc, Mutex};

/// Quote a locator for safe embedding into an evaluated script.
pub(crate) fn js_string(raw: &str) -> String {
    serde_json::to_string(raw).unwrap_or_else(|_| "''".to_string())
}

/// Full-browser driver over headless Chrome. One tab per driver.
pub struct ChromeDriver {
    browser: Mutex<Option<Browser>>,
    tab: Mutex<Option<Arc<Tab>>>,
}

impl ChromeDriver {
    pub fn launch(config: &BrowserConfig) -> Result<Self> {
        let window_size_arg = format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        );
        let user_agent_arg = config
            .user_agent
            .as_ref()
            .map(|ua| format!("--user-agent={ua}"));
        let proxy_arg = config.proxy.as_ref().map(|p| format!("--proxy-server={p}"));

        let mut args = vec![
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new(&window_size_arg),
        ];

        if let Some(ref ua_arg) = user_agent_arg {
            args.push(OsStr::new(ua_arg));
        }
        if let Some(ref proxy_arg) = proxy_arg {
            args.push(OsStr::new(proxy_arg));
        }
        if !config.load_images {
            args.push(OsStr::new("--blink-settings=imagesEnabled=false"));
        }
        for arg in &config.extra_args {
            args.push(OsStr::new(arg));
        }

        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .args(args)
            .build()
            .map_err(|e| AutomationError::LaunchFailed(e.to_string()))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| AutomationError::LaunchFailed(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| AutomationError::LaunchFailed(format!("tab creation: {e}")))?;

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            tab: Mutex::new(Some(tab)),
        })
    }

    fn tab(&self) -> Result<Arc<Tab>> {
        self.tab
            .lock()
            .expect("tab lock poisoned")
            .clone()
            .ok_or(AutomationError::NoActiveTab)
    }

    fn evaluate(&self, script: &str) -> Result<Value> {
        let tab = self.tab()?;
        let result = tab
            .evaluate(script, false)
            .map_err(|e| AutomationError::ScriptFailed(e.to_string()))?;
        Ok(result.value.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl DriverTrait for ChromeDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Browser
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        let tab = self.tab()?;
        tab.navigate_to(url)
            .map_err(|e| AutomationError::NavigationFailed(e.to_string()))?;
        tab.wait_until_navigated()
            .map_err(|e| AutomationError::NavigationFailed(e.to_string()))?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.tab()?.get_url())
    }

    async fn title(&self) -> Result<String> {
        let result = self.evaluate("document.title")?;
        Ok(result.as_str().unwrap_or("").to_string())
    }

    async fn page_source(&self) -> Result<String> {
        let result = self.evaluate("document.documentElement.outerHTML")?;
        Ok(result.as_str().unwrap_or("").to_string())
    }

    async fn exists(&self, locator: &str) -> Result<bool> {
        let script = format!(
            "document.querySelector({}) !== null",
            js_string(locator)
        );
        Ok(self.evaluate(&script)?.as_bool().unwrap_or(false))
    }

    async fn is_displayed(&self, locator: &str) -> Result<bool> {
        let script = format!(
            r#"(function() {{
                const el = document.querySelector({});
                if (!el) return false;
                const rect = el.getBoundingClientRect();
                const style = window.getComputedStyle(el);
                return rect.width > 0 && rect.height > 0
                    && style.visibility !== 'hidden'
                    && style.display !== 'none';
            }})()"#,
            js_string(locator)
        );
        Ok(self.evaluate(&script)?.as_bool().unwrap_or(false))
    }

    async fn click(&self, locator: &str) -> Result<()> {
        let tab = self.tab()?;
        let element = tab
            .find_element(locator)
            .map_err(|e| AutomationError::ElementNotFound(format!("{locator}: {e}")))?;
        element
            .scroll_into_view()
            .and_then(|el| el.click())
            .map_err(|e| {
                AutomationError::InteractionFailed(format!("click {locator}: {e}"))
            })?;
        Ok(())
    }

    async fn input(&self, locator: &str, text: &str) -> Result<()> {
        let tab = self.tab()?;
        let element = tab
            .find_element(locator)
            .map_err(|e| AutomationError::ElementNotFound(format!("{locator}: {e}")))?;
        element
            .click()
            .map_err(|e| AutomationError::InteractionFailed(format!("focus {locator}: {e}")))?;

        // clear any existing value before typing
        let clear = format!(
            r#"(function() {{
                const el = document.querySelector({});
                if (el && 'value' in el) el.value = '';
            }})()"#,
            js_string(locator)
        );
        self.evaluate(&clear)?;

        element.type_into(text).map_err(|e| {
            AutomationError::InteractionFailed(format!("type into {locator}: {e}"))
        })?;
        Ok(())
    }

    async fn get_text(&self, locator: &str) -> Result<String> {
        let tab = self.tab()?;
        let element = tab
            .find_element(locator)
            .map_err(|e| AutomationError::ElementNotFound(format!("{locator}: {e}")))?;
        element
            .get_inner_text()
            .map_err(|e| AutomationError::InteractionFailed(format!("text of {locator}: {e}")))
    }

    async fn get_attribute(&self, locator: &str, name: &str) -> Result<Option<String>> {
        let script = format!(
            r#"(function() {{
                const el = document.querySelector({});
                return el ? el.getAttribute({}) : null;
            }})()"#,
            js_string(locator),
            js_string(name)
        );
        match self.evaluate(&script)? {
            Value::String(s) => Ok(Some(s)),
            _ => Ok(None),
        }
    }

    async fn hover(&self, locator: &str) -> Result<()> {
        let tab = self.tab()?;
        let element = tab
            .find_element(locator)
            .map_err(|e| AutomationError::ElementNotFound(format!("{locator}: {e}")))?;
        element.move_mouse_over().map_err(|e| {
            AutomationError::InteractionFailed(format!("hover {locator}: {e}"))
        })?;
        Ok(())
    }

    async fn scroll_to(&self, locator: &str) -> Result<()> {
        let tab = self.tab()?;
        let element = tab
            .find_element(locator)
            .map_err(|e| AutomationError::ElementNotFound(format!("{locator}: {e}")))?;
        element.scroll_into_view().map_err(|e| {
            AutomationError::InteractionFailed(format!("scroll to {locator}: {e}"))
        })?;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let tab = self.tab()?;
        tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| AutomationError::ScreenshotFailed(e.to_string()))
    }

    async fn element_screenshot(&self, locator: &str) -> Result<Vec<u8>> {
        let tab = self.tab()?;
        let element = tab
            .find_element(locator)
            .map_err(|e| AutomationError::ElementNotFound(format!("{locator}: {e}")))?;
        element
            .capture_screenshot(CaptureScreenshotFormatOption::Png)
            .map_err(|e| AutomationError::ScreenshotFailed(e.to_string()))
    }

    async fn execute_script(&self, script: &str) -> Result<Value> {
        self.evaluate(script)
    }

    async fn refresh(&self) -> Result<()> {
        let tab = self.tab()?;
        tab.reload(false, None)
            .map_err(|e| AutomationError::NavigationFailed(e.to_string()))?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.tab.lock().expect("tab lock poisoned").take();
        // dropping the Browser handle tears down the Chrome process
        self.browser.lock().expect("browser lock poisoned").take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_string_quotes_selectors() {
        assert_eq!(js_string("#login"), "\"#login\"");
        assert_eq!(
            js_string("input[name='user']"),
            "\"input[name='user']\""
        );
        // embedded quotes stay escaped rather than breaking the script
        assert_eq!(js_string(r#"a[title="x"]"#), r#""a[title=\"x\"]""#);
    }
}
