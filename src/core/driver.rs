use crate::errors::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which kind of backend a driver wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverKind {
    /// Full browser control (headless Chrome).
    Browser,
    /// HTTP requests only, locator reads against the fetched document.
    HttpSession,
    /// Both backends behind one handle, switchable at runtime.
    Hybrid,
}

impl std::fmt::Display for DriverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverKind::Browser => write!(f, "browser"),
            DriverKind::HttpSession => write!(f, "http-session"),
            DriverKind::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Uniform surface over the underlying automation backends.
///
/// Locators are CSS selector strings. Operations a backend cannot perform
/// (e.g. clicking through an HTTP session) fail with
/// `AutomationError::UnsupportedOperation` rather than silently no-op.
#[async_trait]
pub trait DriverTrait: Send + Sync {
    fn kind(&self) -> DriverKind;

    /// Navigate to a URL and wait for the document to load
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Get current URL
    async fn current_url(&self) -> Result<String>;

    /// Get page title
    async fn title(&self) -> Result<String>;

    /// Get the page source (HTML)
    async fn page_source(&self) -> Result<String>;

    /// Check whether at least one element matches the locator
    async fn exists(&self, locator: &str) -> Result<bool>;

    /// Check whether a matching element is displayed
    async fn is_displayed(&self, locator: &str) -> Result<bool>;

    /// Click the first element matching the locator
    async fn click(&self, locator: &str) -> Result<()>;

    /// Type text into the first element matching the locator
    async fn input(&self, locator: &str, text: &str) -> Result<()>;

    /// Read the text content of the first matching element
    async fn get_text(&self, locator: &str) -> Result<String>;

    /// Read an attribute of the first matching element
    async fn get_attribute(&self, locator: &str, name: &str) -> Result<Option<String>>;

    /// Hover the first matching element
    async fn hover(&self, locator: &str) -> Result<()>;

    /// Scroll the first matching element into view
    async fn scroll_to(&self, locator: &str) -> Result<()>;

    /// Take a full-page screenshot (PNG bytes)
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Screenshot a single element (PNG bytes)
    async fn element_screenshot(&self, locator: &str) -> Result<Vec<u8>>;

    /// Execute JavaScript in the page
    async fn execute_script(&self, script: &str) -> Result<Value>;

    /// Reload the current page
    async fn refresh(&self) -> Result<()>;

    /// Release the backend's resources; further calls fail
    async fn close(&self) -> Result<()>;
}

/// Summary of a registered driver, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct DriverInfo {
    pub name: String,
    pub kind: DriverKind,
    pub url: Option<String>,
    pub title: Option<String>,
}
