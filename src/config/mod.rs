pub mod browser;
pub mod environment;
pub mod settings;

pub use browser::{BrowserConfig, BrowserPresets, Viewport};
pub use environment::{EnvironmentConfig, EnvironmentManager};
pub use settings::Settings;
