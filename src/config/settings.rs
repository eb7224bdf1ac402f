use crate::errors::{AutomationError, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Process-wide framework settings.
///
/// Loaded once at startup from defaults, then `pageforge.toml`, then
/// `PAGEFORGE_*` environment variables (later layers win).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub screenshots_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub data_dir: PathBuf,

    pub element_timeout_secs: u64,
    pub page_load_timeout_secs: u64,
    pub poll_interval_ms: u64,

    pub log_level: String,
    pub headless: bool,
    /// Name of the environment selected by default, see `EnvironmentManager`.
    pub environment: String,
    /// Name of the browser preset used when a test does not pick one.
    pub default_preset: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screenshots_dir: PathBuf::from("screenshots"),
            reports_dir: PathBuf::from("reports"),
            logs_dir: PathBuf::from("logs"),
            data_dir: PathBuf::from("data"),
            element_timeout_secs: 10,
            page_load_timeout_secs: 30,
            poll_interval_ms: 500,
            log_level: "info".to_string(),
            headless: true,
            environment: "test".to_string(),
            default_preset: "default".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `pageforge.toml` in the working directory plus
    /// `PAGEFORGE_*` environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from("pageforge.toml")
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("PAGEFORGE_"))
            .extract()
            .map_err(|e| AutomationError::ConfigurationError(e.to_string()))
    }

    /// Create the output directories if they do not exist yet.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            &self.screenshots_dir,
            &self.reports_dir,
            &self.logs_dir,
            &self.data_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let settings = Settings::default();
        assert_eq!(settings.element_timeout(), Duration::from_secs(10));
        assert_eq!(settings.page_load_timeout(), Duration::from_secs(30));
        assert_eq!(settings.poll_interval(), Duration::from_millis(500));
        assert_eq!(settings.environment, "test");
    }

    #[test]
    fn toml_layer_overrides_defaults() {
        let figment = Figment::from(Serialized::defaults(Settings::default())).merge(
            Toml::string(
                r#"
                element_timeout_secs = 3
                log_level = "debug"
                default_preset = "performance"
                "#,
            ),
        );
        let settings: Settings = figment.extract().unwrap();

        assert_eq!(settings.element_timeout_secs, 3);
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.default_preset, "performance");
        // untouched fields keep their defaults
        assert_eq!(settings.page_load_timeout_secs, 30);
    }

    #[test]
    fn ensure_dirs_creates_missing_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings {
            screenshots_dir: tmp.path().join("shots"),
            reports_dir: tmp.path().join("reports"),
            logs_dir: tmp.path().join("logs"),
            data_dir: tmp.path().join("data"),
            ..Settings::default()
        };

        settings.ensure_dirs().unwrap();
        assert!(settings.screenshots_dir.is_dir());
        assert!(settings.reports_dir.is_dir());
    }
}
