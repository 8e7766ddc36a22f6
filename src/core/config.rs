use crate::core::date::DateInput;
use crate::providers::client::{BASE_URL, DEFAULT_TIMEOUT};
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FrankfurterProviderConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
}

fn default_timeout_secs() -> f64 {
    DEFAULT_TIMEOUT.as_secs_f64()
}

impl Default for FrankfurterProviderConfig {
    fn default() -> Self {
        FrankfurterProviderConfig {
            base_url: BASE_URL.to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FrankfurterProviderConfig {
    pub fn timeout(&self) -> Result<Duration> {
        if !self.timeout_secs.is_finite() || self.timeout_secs <= 0.0 {
            bail!("timeout_secs must be positive, got {}", self.timeout_secs);
        }
        match Duration::try_from_secs_f64(self.timeout_secs) {
            Ok(timeout) => Ok(timeout),
            Err(e) => bail!("timeout_secs is out of range ({}): {e}", self.timeout_secs),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub frankfurter: FrankfurterProviderConfig,
}

/// Values used when the command line leaves them out.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DefaultsConfig {
    #[serde(default = "default_amount")]
    pub amount: f64,
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default = "default_to")]
    pub to: String,
    /// Kept loosely typed; converted to a [`DateInput`] when used.
    #[serde(default = "default_date")]
    pub date: serde_json::Value,
}

fn default_amount() -> f64 {
    50.0
}

fn default_from() -> String {
    "AUD".to_string()
}

fn default_to() -> String {
    "USD".to_string()
}

fn default_date() -> serde_json::Value {
    serde_json::Value::String("2024-09-01".to_string())
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        DefaultsConfig {
            amount: default_amount(),
            from: default_from(),
            to: default_to(),
            date: default_date(),
        }
    }
}

impl DefaultsConfig {
    pub fn date(&self) -> crate::core::Result<DateInput> {
        DateInput::try_from(&self.date)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_catalog_ttl_hours")]
    pub catalog_ttl_hours: u64,
}

fn default_catalog_ttl_hours() -> u64 {
    6
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            catalog_ttl_hours: default_catalog_ttl_hours(),
        }
    }
}

impl CacheConfig {
    pub fn catalog_ttl(&self) -> Result<Duration> {
        match self.catalog_ttl_hours.checked_mul(60 * 60) {
            Some(secs) => Ok(Duration::from_secs(secs)),
            None => bail!("catalog_ttl_hours is too large, got {}", self.catalog_ttl_hours),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    /// Loads the config from the default location, or built-in defaults if
    /// there is no file yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("io", "frankfurter", "fx-converter")
            .context("Could not determine project directories")
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
