use crate::engine::EngineConfig;
use crate::error::ConfigError;
use crate::pricing::embedded;
use crate::validation::validate_region_name;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Region this instance serves
    pub region: String,
    pub currency: String,
    /// Record calculation steps in every cost result
    pub enhanced_diagnostics: bool,
    /// Utilization used for carbon when a resource doesn't give one (0.0-1.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_utilization: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            currency: "USD".to_string(),
            enhanced_diagnostics: false,
            default_utilization: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            // Try .costctl.toml in current dir, then ~/.config/costctl/config.toml
            let local = PathBuf::from(".costctl.toml");
            if local.exists() {
                local
            } else {
                dirs::config_dir()
                    .map(|d| d.join("costctl").join("config.toml"))
                    .unwrap_or_else(|| PathBuf::from(".costctl.toml"))
            }
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))
                .with_context(|| {
                    let mut err = format!("Failed to parse config: {}", config_path.display());
                    err.push_str("\n  Common issues:");
                    err.push_str("\n    - Invalid TOML syntax");
                    err.push_str("\n    - Incorrect value types");
                    err.push_str("\n  Tip: Run 'costctl init' to create a new config file");
                    err
                })?;
            config
                .validate()
                .with_context(|| format!("Invalid config: {}", config_path.display()))?;
            Ok(config)
        } else {
            // Use defaults but warn if user explicitly provided a path
            if path.is_some() {
                eprintln!("WARNING: Config file not found: {}", config_path.display());
                eprintln!("   Using default configuration. Run 'costctl init' to create a config file.");
            }
            Ok(Config::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let engine = &self.engine;
        if engine.region.trim().is_empty() {
            return Err(ConfigError::MissingField("engine.region".to_string()));
        }
        validate_region_name(&engine.region).map_err(|reason| ConfigError::InvalidValue {
            field: "engine.region".to_string(),
            reason,
        })?;
        if engine.currency != "USD" {
            return Err(ConfigError::InvalidValue {
                field: "engine.currency".to_string(),
                reason: format!("only USD price data is available, got {}", engine.currency),
            });
        }
        if let Some(u) = engine.default_utilization {
            if !(0.0..=1.0).contains(&u) {
                return Err(ConfigError::InvalidValue {
                    field: "engine.default_utilization".to_string(),
                    reason: format!("must be between 0.0 and 1.0, got {}", u),
                });
            }
        }
        Ok(())
    }

    /// Engine configuration backed by the embedded dataset for the region
    pub fn engine_config(&self) -> std::result::Result<EngineConfig, ConfigError> {
        self.validate()?;
        let dataset =
            embedded::dataset_for(&self.engine.region).ok_or_else(|| ConfigError::InvalidValue {
                field: "engine.region".to_string(),
                reason: format!(
                    "no embedded price data for {} (available: {})",
                    self.engine.region,
                    embedded::embedded_regions().join(", ")
                ),
            })?;
        Ok(EngineConfig {
            region: self.engine.region.clone(),
            currency: self.engine.currency.clone(),
            enhanced_diagnostics: self.engine.enhanced_diagnostics,
            default_utilization: self.engine.default_utilization,
            dataset: dataset.into(),
        })
    }
}

pub fn init_config(output: &Path) -> Result<()> {
    let config = Config::default();
    config.save(output)?;
    println!("Created config file: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.engine.region, "us-east-1");
        assert_eq!(config.engine.currency, "USD");
        assert!(!config.engine.enhanced_diagnostics);
        assert_eq!(config.output.format, OutputFormat::Table);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        let mut config = Config::default();
        config.engine.region = "eu-west-1".to_string();
        config.engine.default_utilization = Some(0.3);
        config.output.format = OutputFormat::Json;
        assert!(config.save(&config_path).is_ok());
        assert!(config_path.exists());

        let loaded = Config::load(Some(&config_path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("partial.toml");
        std::fs::write(&config_path, "[engine]\nregion = \"us-west-2\"\n").unwrap();

        let config = Config::load(Some(&config_path)).unwrap();
        assert_eq!(config.engine.region, "us-west-2");
        assert_eq!(config.engine.currency, "USD");
        assert_eq!(config.output.format, OutputFormat::Table);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let fake_path = temp_dir.path().join("nonexistent.toml");

        // Should return default config
        let config = Config::load(Some(&fake_path)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        std::fs::write(&config_path, "invalid toml content {").unwrap();

        let result = Config::load(Some(&config_path));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.engine.default_utilization = Some(1.5);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.engine.region = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::MissingField(_))));

        let mut config = Config::default();
        config.engine.currency = "EUR".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_engine_config_needs_embedded_region() {
        let config = Config::default();
        let engine = config.engine_config().unwrap();
        assert_eq!(engine.region, "us-east-1");
        assert!(!engine.dataset.is_empty());

        let mut config = Config::default();
        config.engine.region = "ap-south-1".to_string();
        assert!(config.engine_config().is_err());
    }

    #[test]
    fn test_init_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("init_test.toml");

        assert!(init_config(&config_path).is_ok());
        assert!(config_path.exists());

        // Verify it's valid TOML
        let config = Config::load(Some(&config_path)).unwrap();
        assert_eq!(config.engine.region, "us-east-1");
    }
}
