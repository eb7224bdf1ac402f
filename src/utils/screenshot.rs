use crate::core::DriverTrait;
use crate::errors::Result;
use crate::handlers::element::timestamped_name;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::{Path, PathBuf};

pub struct ScreenshotManager;

impl ScreenshotManager {
    /// Full-page screenshot as base64, for embedding into reports.
    pub async fn take_base64(driver: &dyn DriverTrait) -> Result<String> {
        let bytes = driver.screenshot().await?;
        Ok(STANDARD.encode(bytes))
    }

    pub async fn save_to_file(driver: &dyn DriverTrait, path: impl AsRef<Path>) -> Result<()> {
        let bytes = driver.screenshot().await?;
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    /// Save under a generated timestamped name inside `dir`, returning the
    /// full path.
    pub async fn save_timestamped(
        driver: &dyn DriverTrait,
        dir: impl AsRef<Path>,
        prefix: &str,
    ) -> Result<PathBuf> {
        let path = dir.as_ref().join(timestamped_name(prefix, "png"));
        Self::save_to_file(driver, &path).await?;
        Ok(path)
    }

    pub async fn save_element_to_file(
        driver: &dyn DriverTrait,
        locator: &str,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let bytes = driver.element_screenshot(locator).await?;
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDriver;

    #[tokio::test]
    async fn base64_roundtrips_the_driver_bytes() {
        let driver = MockDriver::new();
        let encoded = ScreenshotManager::take_base64(&driver).await.unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        assert_eq!(&decoded[1..4], b"PNG");
    }

    #[tokio::test]
    async fn save_timestamped_creates_the_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let driver = MockDriver::new();

        let path =
            ScreenshotManager::save_timestamped(&driver, tmp.path().join("nested"), "home")
                .await
                .unwrap();

        assert!(path.exists());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("home_"));
    }
}
