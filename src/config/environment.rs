use crate::errors::{AutomationError, Result};
use figment::providers::{Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use url::Url;

/// One named target environment (base URL, credentials, timeout overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub name: String,
    pub base_url: Url,
    pub api_base_url: Option<Url>,
    #[serde(default)]
    pub credentials: HashMap<String, String>,
    pub page_load_timeout_secs: Option<u64>,
    pub element_timeout_secs: Option<u64>,
}

impl EnvironmentConfig {
    pub fn new(name: impl Into<String>, base_url: Url) -> Self {
        Self {
            name: name.into(),
            base_url,
            api_base_url: None,
            credentials: HashMap::new(),
            page_load_timeout_secs: None,
            element_timeout_secs: None,
        }
    }

    /// Resolve a path against the environment's base URL.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AutomationError::ConfigurationError(e.to_string()))
    }

    pub fn credential(&self, key: &str) -> Option<&str> {
        self.credentials.get(key).map(String::as_str)
    }
}

/// Holds every known environment and which one is selected.
///
/// This is an explicit value the caller owns and passes along; there is no
/// process-global current environment.
#[derive(Debug, Default)]
pub struct EnvironmentManager {
    environments: HashMap<String, EnvironmentConfig>,
    current: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EnvironmentFile {
    #[serde(default)]
    environments: HashMap<String, EnvironmentConfig>,
}

impl EnvironmentManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load environments from a Toml file of `[environments.<name>]` tables.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file: EnvironmentFile = Figment::from(Toml::file(path.as_ref()))
            .extract()
            .map_err(|e| AutomationError::ConfigurationError(e.to_string()))?;

        let mut manager = Self::new();
        for (name, mut env) in file.environments {
            // table key wins over any name field inside the table
            env.name = name.clone();
            manager.add(env);
        }
        Ok(manager)
    }

    /// Seed the manager with the stock development/test/production entries.
    pub fn with_defaults() -> Self {
        let mut manager = Self::new();

        let mut dev = EnvironmentConfig::new(
            "development",
            Url::parse("http://localhost:3000").expect("static url"),
        );
        dev.credentials
            .insert("username".to_string(), "dev_user".to_string());
        manager.add(dev);

        manager.add(EnvironmentConfig::new(
            "test",
            Url::parse("https://test.example.com").expect("static url"),
        ));

        let mut prod = EnvironmentConfig::new(
            "production",
            Url::parse("https://www.example.com").expect("static url"),
        );
        prod.page_load_timeout_secs = Some(60);
        prod.element_timeout_secs = Some(20);
        manager.add(prod);

        manager
    }

    pub fn add(&mut self, env: EnvironmentConfig) {
        self.environments.insert(env.name.clone(), env);
    }

    pub fn get(&self, name: &str) -> Option<&EnvironmentConfig> {
        self.environments.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.environments.keys().map(String::as_str).collect()
    }

    /// Select the environment returned by `current()`.
    pub fn select(&mut self, name: &str) -> Result<&EnvironmentConfig> {
        if !self.environments.contains_key(name) {
            return Err(AutomationError::ConfigurationError(format!(
                "unknown environment: {name}"
            )));
        }
        self.current = Some(name.to_string());
        Ok(&self.environments[name])
    }

    pub fn current(&self) -> Option<&EnvironmentConfig> {
        self.current.as_deref().and_then(|n| self.environments.get(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_contain_three_environments() {
        let manager = EnvironmentManager::with_defaults();
        assert!(manager.get("development").is_some());
        assert!(manager.get("test").is_some());
        assert!(manager.get("production").is_some());
        assert!(manager.current().is_none());
    }

    #[test]
    fn select_unknown_environment_fails() {
        let mut manager = EnvironmentManager::with_defaults();
        assert!(manager.select("staging").is_err());

        manager.select("test").unwrap();
        assert_eq!(manager.current().unwrap().name, "test");
    }

    #[test]
    fn url_for_joins_against_base() {
        let env = EnvironmentConfig::new(
            "test",
            Url::parse("https://test.example.com").unwrap(),
        );
        let url = env.url_for("/login").unwrap();
        assert_eq!(url.as_str(), "https://test.example.com/login");
    }

    #[test]
    fn environments_load_from_toml_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("environments.toml");
        std::fs::write(
            &path,
            r#"
            [environments.staging]
            name = "staging"
            base_url = "https://staging.example.com"

            [environments.staging.credentials]
            username = "qa"
            password = "secret"
            "#,
        )
        .unwrap();

        let manager = EnvironmentManager::from_file(&path).unwrap();
        let staging = manager.get("staging").unwrap();
        assert_eq!(staging.base_url.host_str(), Some("staging.example.com"));
        assert_eq!(staging.credential("username"), Some("qa"));
    }
}
