use crate::core::{DriverKind, DriverTrait};
use crate::errors::{AutomationError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

// Smallest valid-looking PNG header, good enough for file-writing tests.
const FAKE_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[derive(Debug, Clone)]
struct MockElement {
    text: String,
    attributes: HashMap<String, String>,
    displayed: bool,
}

#[derive(Default)]
struct MockState {
    url: String,
    title: String,
    source: String,
    elements: HashMap<String, MockElement>,
    clicks: Vec<String>,
    inputs: Vec<(String, String)>,
    closed: bool,
}

/// In-memory `DriverTrait` backend for tests.
///
/// Elements are scripted per locator; state setters can be called from a
/// spawned task to flip conditions while a wait is polling.
#[derive(Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(&self, locator: &str, text: &str) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.elements.insert(
            locator.to_string(),
            MockElement {
                text: text.to_string(),
                attributes: HashMap::new(),
                displayed: true,
            },
        );
    }

    pub fn remove_element(&self, locator: &str) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.elements.remove(locator);
    }

    pub fn set_attribute(&self, locator: &str, name: &str, value: &str) {
        let mut state = self.state.lock().expect("mock state poisoned");
        if let Some(element) = state.elements.get_mut(locator) {
            element
                .attributes
                .insert(name.to_string(), value.to_string());
        }
    }

    pub fn set_displayed(&self, locator: &str, displayed: bool) {
        let mut state = self.state.lock().expect("mock state poisoned");
        if let Some(element) = state.elements.get_mut(locator) {
            element.displayed = displayed;
        }
    }

    pub fn set_url(&self, url: &str) {
        self.state.lock().expect("mock state poisoned").url = url.to_string();
    }

    pub fn set_title(&self, title: &str) {
        self.state.lock().expect("mock state poisoned").title = title.to_string();
    }

    pub fn set_source(&self, source: &str) {
        self.state.lock().expect("mock state poisoned").source = source.to_string();
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().expect("mock state poisoned").clicks.clone()
    }

    pub fn inputs(&self) -> Vec<(String, String)> {
        self.state.lock().expect("mock state poisoned").inputs.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().expect("mock state poisoned").closed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state.lock().expect("mock state poisoned").closed {
            return Err(AutomationError::NoActiveTab);
        }
        Ok(())
    }

    fn with_element<T>(
        &self,
        locator: &str,
        f: impl FnOnce(&mut MockElement) -> T,
    ) -> Result<T> {
        self.ensure_open()?;
        let mut state = self.state.lock().expect("mock state poisoned");
        state
            .elements
            .get_mut(locator)
            .map(f)
            .ok_or_else(|| AutomationError::ElementNotFound(locator.to_string()))
    }
}

#[async_trait]
impl DriverTrait for MockDriver {
    fn kind(&self) -> DriverKind {
        DriverKind::Browser
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.ensure_open()?;
        self.set_url(url);
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        self.ensure_open()?;
        Ok(self.state.lock().expect("mock state poisoned").url.clone())
    }

    async fn title(&self) -> Result<String> {
        self.ensure_open()?;
        Ok(self.state.lock().expect("mock state poisoned").title.clone())
    }

    async fn page_source(&self) -> Result<String> {
        self.ensure_open()?;
        Ok(self.state.lock().expect("mock state poisoned").source.clone())
    }

    async fn exists(&self, locator: &str) -> Result<bool> {
        self.ensure_open()?;
        let state = self.state.lock().expect("mock state poisoned");
        Ok(state.elements.contains_key(locator))
    }

    async fn is_displayed(&self, locator: &str) -> Result<bool> {
        self.ensure_open()?;
        let state = self.state.lock().expect("mock state poisoned");
        Ok(state
            .elements
            .get(locator)
            .map(|el| el.displayed)
            .unwrap_or(false))
    }

    async fn click(&self, locator: &str) -> Result<()> {
        self.with_element(locator, |_| ())?;
        let mut state = self.state.lock().expect("mock state poisoned");
        state.clicks.push(locator.to_string());
        Ok(())
    }

    async fn input(&self, locator: &str, text: &str) -> Result<()> {
        self.with_element(locator, |el| el.text = text.to_string())?;
        let mut state = self.state.lock().expect("mock state poisoned");
        state.inputs.push((locator.to_string(), text.to_string()));
        Ok(())
    }

    async fn get_text(&self, locator: &str) -> Result<String> {
        self.with_element(locator, |el| el.text.clone())
    }

    async fn get_attribute(&self, locator: &str, name: &str) -> Result<Option<String>> {
        self.with_element(locator, |el| el.attributes.get(name).cloned())
    }

    async fn hover(&self, locator: &str) -> Result<()> {
        self.with_element(locator, |_| ())
    }

    async fn scroll_to(&self, locator: &str) -> Result<()> {
        self.with_element(locator, |_| ())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.ensure_open()?;
        Ok(FAKE_PNG.to_vec())
    }

    async fn element_screenshot(&self, locator: &str) -> Result<Vec<u8>> {
        self.with_element(locator, |_| ())?;
        Ok(FAKE_PNG.to_vec())
    }

    async fn execute_script(&self, _script: &str) -> Result<Value> {
        self.ensure_open()?;
        Ok(Value::Null)
    }

    async fn refresh(&self) -> Result<()> {
        self.ensure_open()
    }

    async fn close(&self) -> Result<()> {
        self.state.lock().expect("mock state poisoned").closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closed_driver_rejects_operations() {
        let driver = MockDriver::new();
        driver.close().await.unwrap();

        assert!(driver.is_closed());
        let err = driver.navigate("https://example.com").await.unwrap_err();
        assert!(matches!(err, AutomationError::NoActiveTab));
    }

    #[tokio::test]
    async fn element_state_is_scriptable() {
        let driver = MockDriver::new();
        driver.add_element("#badge", "3 unread");
        driver.set_attribute("#badge", "role", "status");

        assert!(driver.exists("#badge").await.unwrap());
        assert_eq!(driver.get_text("#badge").await.unwrap(), "3 unread");
        assert_eq!(
            driver.get_attribute("#badge", "role").await.unwrap(),
            Some("status".to_string())
        );

        driver.set_displayed("#badge", false);
        assert!(!driver.is_displayed("#badge").await.unwrap());
    }
}
