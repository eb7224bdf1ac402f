use crate::config::BrowserConfig;
use crate::core::driver::{DriverInfo, DriverKind, DriverTrait};
use crate::driver::{ChromeDriver, HttpDriver, HybridDriver};
use crate::errors::{AutomationError, Result};
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

struct DriverEntry {
    driver: Arc<dyn DriverTrait>,
    kind: DriverKind,
    config: BrowserConfig,
}

/// Registry of named, live driver instances.
///
/// Names are unique: creating under a taken name fails and leaves the
/// existing entry untouched. Closing a name releases the backend and removes
/// the entry. The internal mutex makes concurrent registry calls memory-safe,
/// but tests are still expected to own one driver each.
#[derive(Default)]
pub struct DriverManager {
    drivers: Mutex<HashMap<String, DriverEntry>>,
}

impl DriverManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate a backend of the requested kind and register it under
    /// `name`. Fails with `DuplicateDriver` if the name is taken; backend
    /// creation failures propagate unchanged.
    pub async fn create(
        &self,
        name: &str,
        kind: DriverKind,
        config: BrowserConfig,
    ) -> Result<Arc<dyn DriverTrait>> {
        if self.contains(name) {
            return Err(AutomationError::DuplicateDriver(name.to_string()));
        }

        let driver: Arc<dyn DriverTrait> = match kind {
            DriverKind::Browser => Arc::new(ChromeDriver::launch(&config)?),
            DriverKind::HttpSession => Arc::new(HttpDriver::new(&config)?),
            DriverKind::Hybrid => Arc::new(HybridDriver::launch(&config)?),
        };

        self.register(name, driver, config)
    }

    /// Register a caller-supplied driver (custom backends, test doubles)
    /// under the same unique-name contract as `create`.
    pub fn register(
        &self,
        name: &str,
        driver: Arc<dyn DriverTrait>,
        config: BrowserConfig,
    ) -> Result<Arc<dyn DriverTrait>> {
        let kind = driver.kind();
        let mut drivers = self.drivers.lock().expect("driver registry poisoned");

        if drivers.contains_key(name) {
            return Err(AutomationError::DuplicateDriver(name.to_string()));
        }

        drivers.insert(
            name.to_string(),
            DriverEntry {
                driver: driver.clone(),
                kind,
                config,
            },
        );
        info!(name, %kind, "driver registered");
        Ok(driver)
    }

    /// Fetch a registered driver, or fail with `DriverNotFound`.
    pub fn get(&self, name: &str) -> Result<Arc<dyn DriverTrait>> {
        let drivers = self.drivers.lock().expect("driver registry poisoned");
        drivers
            .get(name)
            .map(|entry| entry.driver.clone())
            .ok_or_else(|| AutomationError::DriverNotFound(name.to_string()))
    }

    /// Close the named driver and remove its entry.
    ///
    /// Closing a name that is not registered is an explicit
    /// `DriverNotFound` error, consistent with `get`.
    pub async fn close(&self, name: &str) -> Result<()> {
        let entry = {
            let mut drivers = self.drivers.lock().expect("driver registry poisoned");
            drivers
                .remove(name)
                .ok_or_else(|| AutomationError::DriverNotFound(name.to_string()))?
        };

        entry.driver.close().await?;
        info!(name, "driver closed");
        Ok(())
    }

    /// Close every registered driver. Close failures are logged, not raised.
    pub async fn close_all(&self) {
        let names: Vec<String> = {
            let drivers = self.drivers.lock().expect("driver registry poisoned");
            drivers.keys().cloned().collect()
        };

        for name in names {
            if let Err(e) = self.close(&name).await {
                warn!(%name, error = %e, "failed to close driver");
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        let drivers = self.drivers.lock().expect("driver registry poisoned");
        drivers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        let drivers = self.drivers.lock().expect("driver registry poisoned");
        drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The configuration snapshot taken when the named driver was created.
    /// Mutating the caller's config afterwards never changes this copy.
    pub fn config_of(&self, name: &str) -> Result<BrowserConfig> {
        let drivers = self.drivers.lock().expect("driver registry poisoned");
        drivers
            .get(name)
            .map(|entry| entry.config.clone())
            .ok_or_else(|| AutomationError::DriverNotFound(name.to_string()))
    }

    /// Names and kinds of every registered driver.
    pub fn list(&self) -> Vec<(String, DriverKind)> {
        let drivers = self.drivers.lock().expect("driver registry poisoned");
        drivers
            .iter()
            .map(|(name, entry)| (name.clone(), entry.kind))
            .collect()
    }

    /// Live details for one registered driver.
    pub async fn info(&self, name: &str) -> Result<DriverInfo> {
        let (driver, kind) = {
            let drivers = self.drivers.lock().expect("driver registry poisoned");
            let entry = drivers
                .get(name)
                .ok_or_else(|| AutomationError::DriverNotFound(name.to_string()))?;
            (entry.driver.clone(), entry.kind)
        };

        Ok(DriverInfo {
            name: name.to_string(),
            kind,
            url: driver.current_url().await.ok(),
            title: driver.title().await.ok(),
        })
    }

    /// Create a temporary driver registered under a unique generated name.
    /// The returned guard removes the entry when dropped, so the backend is
    /// released on every exit path, including panics and `?` returns.
    pub async fn scoped(&self, kind: DriverKind, config: BrowserConfig) -> Result<ScopedDriver<'_>> {
        let name = format!("scoped-{}", uuid::Uuid::new_v4());
        let driver = self.create(&name, kind, config).await?;
        Ok(ScopedDriver {
            manager: self,
            name,
            driver,
        })
    }

    /// Like `scoped`, but wrapping a caller-supplied driver.
    pub fn scoped_with(&self, driver: Arc<dyn DriverTrait>) -> Result<ScopedDriver<'_>> {
        let name = format!("scoped-{}", uuid::Uuid::new_v4());
        let driver = self.register(&name, driver, BrowserConfig::default())?;
        Ok(ScopedDriver {
            manager: self,
            name,
            driver,
        })
    }
}

/// RAII guard for a temporary registry entry.
///
/// Dereferences to the driver. On drop the entry is removed from the
/// registry; the backend's resources go with the last `Arc` reference.
pub struct ScopedDriver<'a> {
    manager: &'a DriverManager,
    name: String,
    driver: Arc<dyn DriverTrait>,
}

impl ScopedDriver<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn driver(&self) -> Arc<dyn DriverTrait> {
        self.driver.clone()
    }
}

impl Deref for ScopedDriver<'_> {
    type Target = dyn DriverTrait;

    fn deref(&self) -> &Self::Target {
        self.driver.as_ref()
    }
}

impl Drop for ScopedDriver<'_> {
    fn drop(&mut self) {
        let mut drivers = match self.manager.drivers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if drivers.remove(&self.name).is_none() {
            warn!(name = %self.name, "scoped driver already removed from registry");
        }
    }
}
