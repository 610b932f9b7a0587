use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub api_key: Option<String>,
    pub flash_model: Option<String>,
    pub pro_model: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    #[allow(dead_code)]
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// API key resolution order: environment first, then the config file.
    /// A missing key is a fatal configuration error raised before any call.
    pub fn resolve_api_key(&self) -> Result<String> {
        std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone())
            .ok_or_else(|| {
                anyhow!(
                    "GEMINI_API_KEY is not set. Export it or add \"api_key\" to {}",
                    Self::config_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|_| "the config file".to_string())
                )
            })
    }

    pub fn flash_model(&self) -> String {
        self.flash_model
            .clone()
            .unwrap_or_else(|| crate::tutor::DEFAULT_FLASH_MODEL.to_string())
    }

    pub fn pro_model(&self) -> String {
        self.pro_model
            .clone()
            .unwrap_or_else(|| crate::tutor::DEFAULT_PRO_MODEL.to_string())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("intellilearn").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.api_key.is_none());
        assert_eq!(config.flash_model(), crate::tutor::DEFAULT_FLASH_MODEL);
        assert_eq!(config.pro_model(), crate::tutor::DEFAULT_PRO_MODEL);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            api_key: Some("test-key".to_string()),
            flash_model: Some("gemini-x-flash".to_string()),
            pro_model: None,
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("test-key"));
        assert_eq!(loaded.flash_model(), "gemini-x-flash");
        assert_eq!(loaded.pro_model(), crate::tutor::DEFAULT_PRO_MODEL);
    }
}
