use crate::errors::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

/// JSON test-data files under a data directory.
pub struct DataHandler {
    data_dir: PathBuf,
}

impl DataHandler {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub async fn load_json<T: DeserializeOwned>(&self, filename: &str) -> Result<T> {
        let raw = tokio::fs::read_to_string(self.data_dir.join(filename)).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub async fn save_json<T: Serialize>(&self, filename: &str, data: &T) -> Result<()> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let raw = serde_json::to_string_pretty(data)?;
        tokio::fs::write(self.data_dir.join(filename), raw).await?;
        Ok(())
    }
}
