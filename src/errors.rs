use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("Driver already registered: {0}")]
    DuplicateDriver(String),

    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("No active tab")]
    NoActiveTab,

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    #[error("Element interaction failed: {0}")]
    InteractionFailed(String),

    #[error("Unknown page element: {0}")]
    UnknownElement(String),

    #[error("Operation not supported by this driver: {0}")]
    UnsupportedOperation(String),

    #[error("Wait timed out after {timeout:?}: {description}")]
    WaitTimeout {
        description: String,
        timeout: Duration,
    },

    #[error("JavaScript execution failed: {0}")]
    ScriptFailed(String),

    #[error("Screenshot failed: {0}")]
    ScreenshotFailed(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Anyhow error: {0}")]
    AnyhowError(String),
}

pub type Result<T> = std::result::Result<T, AutomationError>;

// Convert anyhow::Error to AutomationError - headless_chrome surfaces anyhow errors
impl From<anyhow::Error> for AutomationError {
    fn from(err: anyhow::Error) -> Self {
        AutomationError::AnyhowError(err.to_string())
    }
}
