use crate::config::Settings;
use crate::core::DriverTrait;
use crate::errors::{AutomationError, Result};
use regex::Regex;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Per-call wait configuration. Defaults: 10 s timeout, 500 ms poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(500),
        }
    }
}

impl WaitOptions {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            timeout: settings.element_timeout(),
            poll_interval: settings.poll_interval(),
        }
    }
}

/// Poll `predicate` until it returns true or `opts.timeout` elapses.
///
/// Returns immediately on success, with no trailing sleep. The predicate is
/// evaluated one final time once the deadline is reached, so the timeout
/// error never fires before the full window has passed. On timeout the
/// error carries `description` for diagnostics.
pub async fn wait_until<F, Fut>(description: &str, opts: WaitOptions, mut predicate: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();
    loop {
        if predicate().await {
            debug!(description, elapsed = ?start.elapsed(), "wait condition met");
            return Ok(());
        }

        let elapsed = start.elapsed();
        if elapsed >= opts.timeout {
            return Err(AutomationError::WaitTimeout {
                description: description.to_string(),
                timeout: opts.timeout,
            });
        }

        // never sleep past the deadline
        let remaining = opts.timeout - elapsed;
        tokio::time::sleep(remaining.min(opts.poll_interval)).await;
    }
}

/// Condition polling bound to one driver. Driver query errors inside a
/// predicate count as "condition not met yet" and keep polling.
pub struct WaitHandler {
    driver: Arc<dyn DriverTrait>,
}

impl WaitHandler {
    pub fn new(driver: Arc<dyn DriverTrait>) -> Self {
        Self { driver }
    }

    /// Wait on a caller-supplied predicate.
    pub async fn wait_for<F, Fut>(
        &self,
        description: &str,
        opts: WaitOptions,
        predicate: F,
    ) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        wait_until(description, opts, predicate).await
    }

    pub async fn wait_for_element_displayed(&self, locator: &str, opts: WaitOptions) -> Result<()> {
        let driver = self.driver.clone();
        let locator = locator.to_string();
        wait_until(&format!("element displayed: {locator}"), opts, move || {
            let driver = driver.clone();
            let locator = locator.clone();
            async move { driver.is_displayed(&locator).await.unwrap_or(false) }
        })
        .await
    }

    pub async fn wait_for_element_present(&self, locator: &str, opts: WaitOptions) -> Result<()> {
        let driver = self.driver.clone();
        let locator = locator.to_string();
        wait_until(&format!("element present: {locator}"), opts, move || {
            let driver = driver.clone();
            let locator = locator.clone();
            async move { driver.exists(&locator).await.unwrap_or(false) }
        })
        .await
    }

    pub async fn wait_for_element_gone(&self, locator: &str, opts: WaitOptions) -> Result<()> {
        let driver = self.driver.clone();
        let locator = locator.to_string();
        wait_until(&format!("element gone: {locator}"), opts, move || {
            let driver = driver.clone();
            let locator = locator.clone();
            async move { !driver.exists(&locator).await.unwrap_or(true) }
        })
        .await
    }

    pub async fn wait_for_text_present(&self, text: &str, opts: WaitOptions) -> Result<()> {
        let driver = self.driver.clone();
        let text = text.to_string();
        wait_until(&format!("page contains text: {text}"), opts, move || {
            let driver = driver.clone();
            let text = text.clone();
            async move {
                driver
                    .page_source()
                    .await
                    .map(|source| source.contains(&text))
                    .unwrap_or(false)
            }
        })
        .await
    }

    pub async fn wait_for_url_contains(&self, fragment: &str, opts: WaitOptions) -> Result<()> {
        let driver = self.driver.clone();
        let fragment = fragment.to_string();
        wait_until(&format!("url contains: {fragment}"), opts, move || {
            let driver = driver.clone();
            let fragment = fragment.clone();
            async move {
                driver
                    .current_url()
                    .await
                    .map(|url| url.contains(&fragment))
                    .unwrap_or(false)
            }
        })
        .await
    }

    pub async fn wait_for_url_matches(&self, pattern: &Regex, opts: WaitOptions) -> Result<()> {
        let driver = self.driver.clone();
        let pattern = pattern.clone();
        wait_until(&format!("url matches: {pattern}"), opts, move || {
            let driver = driver.clone();
            let pattern = pattern.clone();
            async move {
                driver
                    .current_url()
                    .await
                    .map(|url| pattern.is_match(&url))
                    .unwrap_or(false)
            }
        })
        .await
    }

    pub async fn wait_for_title_contains(&self, text: &str, opts: WaitOptions) -> Result<()> {
        let driver = self.driver.clone();
        let text = text.to_string();
        wait_until(&format!("title contains: {text}"), opts, move || {
            let driver = driver.clone();
            let text = text.clone();
            async move {
                driver
                    .title()
                    .await
                    .map(|title| title.contains(&text))
                    .unwrap_or(false)
            }
        })
        .await
    }
}
