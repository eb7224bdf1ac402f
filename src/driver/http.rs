use crate::config::BrowserConfig;
use crate::core::{DriverKind, DriverTrait};
use crate::errors::{AutomationError, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::Mutex;

#[derive(Default)]
struct HttpState {
    current_url: Option<String>,
    body: String,
}

/// HTTP-session driver: fetches documents with `reqwest` and answers
/// locator queries against the stored body with `scraper`. Interaction
/// operations (click, type, hover, scripts, screenshots) are not available
/// without a browser and fail with `UnsupportedOperation`.
pub struct HttpDriver {
    client: reqwest::Client,
    state: Mutex<HttpState>,
}

fn parse_selector(locator: &str) -> Result<Selector> {
    Selector::parse(locator)
        .map_err(|e| AutomationError::InvalidLocator(format!("{locator}: {e}")))
}

pub(crate) fn select_text(body: &str, locator: &str) -> Result<Option<String>> {
    let selector = parse_selector(locator)?;
    let document = Html::parse_document(body);
    Ok(document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join("").trim().to_string()))
}

pub(crate) fn select_attribute(
    body: &str,
    locator: &str,
    name: &str,
) -> Result<Option<Option<String>>> {
    let selector = parse_selector(locator)?;
    let document = Html::parse_document(body);
    Ok(document
        .select(&selector)
        .next()
        .map(|el| el.value().attr(name).map(str::to_string)))
}

pub(crate) fn select_exists(body: &str, locator: &str) -> Result<bool> {
    let selector = parse_selector(locator)?;
    let document = Html::parse_document(body);
    Ok(document.select(&selector).next().is_some())
}

pub(crate) fn select_title(body: &str) -> String {
    let selector = Selector::parse("title").expect("static selector");
    let document = Html::parse_document(body);
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join("").trim().to_string())
        .unwrap_or_default()
}

impl HttpDriver {
    pub fn new(config: &BrowserConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();

        if let Some(ua) = &config.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .map_err(|e| AutomationError::ConfigurationError(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| AutomationError::ConfigurationError(e.to_string()))?;

        Ok(Self {
            client,
            state: Mutex::new(HttpState::default()),
        })
    }

    fn body(&self) -> String {
        self.state.lock().expect("http state poisoned").body.clone()
    }

    fn unsupported<T>(&self, operation: &str) -> Result<T> {
        Err(AutomationError::UnsupportedOperation(format!(
            "{operation} requires a browser driver"
        )))
    }
}

#[async_trait]
impl DriverTrait for HttpDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::HttpSession
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        let response = self.client.get(url).send().await?;
        let final_url = response.url().to_string();
        let body = response.text().await?;

        let mut state = self.state.lock().expect("http state poisoned");
        state.current_url = Some(final_url);
        state.body = body;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        self.state
            .lock()
            .expect("http state poisoned")
            .current_url
            .clone()
            .ok_or_else(|| AutomationError::NavigationFailed("no page loaded".to_string()))
    }

    async fn title(&self) -> Result<String> {
        Ok(select_title(&self.body()))
    }

    async fn page_source(&self) -> Result<String> {
        Ok(self.body())
    }

    async fn exists(&self, locator: &str) -> Result<bool> {
        select_exists(&self.body(), locator)
    }

    // A session driver has no rendering: present counts as displayed,
    // matching how the original treated session-mode elements.
    async fn is_displayed(&self, locator: &str) -> Result<bool> {
        self.exists(locator).await
    }

    async fn click(&self, _locator: &str) -> Result<()> {
        self.unsupported("click")
    }

    async fn input(&self, _locator: &str, _text: &str) -> Result<()> {
        self.unsupported("input")
    }

    async fn get_text(&self, locator: &str) -> Result<String> {
        select_text(&self.body(), locator)?
            .ok_or_else(|| AutomationError::ElementNotFound(locator.to_string()))
    }

    async fn get_attribute(&self, locator: &str, name: &str) -> Result<Option<String>> {
        select_attribute(&self.body(), locator, name)?
            .ok_or_else(|| AutomationError::ElementNotFound(locator.to_string()))
    }

    async fn hover(&self, _locator: &str) -> Result<()> {
        self.unsupported("hover")
    }

    async fn scroll_to(&self, _locator: &str) -> Result<()> {
        self.unsupported("scroll")
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.unsupported("screenshot")
    }

    async fn element_screenshot(&self, _locator: &str) -> Result<Vec<u8>> {
        self.unsupported("element screenshot")
    }

    async fn execute_script(&self, _script: &str) -> Result<Value> {
        self.unsupported("script execution")
    }

    async fn refresh(&self) -> Result<()> {
        let url = self.current_url().await?;
        self.navigate(&url).await
    }

    async fn close(&self) -> Result<()> {
        let mut state = self.state.lock().expect("http state poisoned");
        state.current_url = None;
        state.body.clear();
        Ok(())
    }
}
