pub mod config;
pub mod core;
pub mod driver;
pub mod errors;
pub mod handlers;
pub mod pages;
pub mod testing;
pub mod utils;

pub use config::{BrowserConfig, BrowserPresets, EnvironmentConfig, EnvironmentManager, Settings};
pub use core::{DriverInfo, DriverKind, DriverManager, DriverTrait, ScopedDriver};
pub use driver::{ChromeDriver, DriverMode, HttpDriver, HybridDriver};
pub use errors::{AutomationError, Result};
pub use handlers::{ElementHandler, WaitHandler, WaitOptions};
pub use pages::{Page, PageObject};
