use crate::error::{Result, SalinityError};
use crate::logic::estimator::JitterConfig;
use crate::models::Location;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_DIR: &str = "salinity-watch";
pub const DEFAULT_OWM_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_MAX_ENTRIES: usize = 500;
pub const DEFAULT_INTER_LOCATION_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub weather: WeatherConfig,
    #[serde(default)]
    pub locations: Vec<LocationConfig>,
    #[serde(default)]
    pub registry: Option<RegistryConfig>,
    #[serde(default)]
    pub backend: Option<BackendConfig>,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct WeatherConfig {
    pub api_key: String,
    #[serde(default = "default_owm_base_url")]
    pub base_url: String,
}

fn default_owm_base_url() -> String {
    DEFAULT_OWM_BASE_URL.to_string()
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationConfig {
    pub fn to_location(&self) -> Result<Location> {
        match &self.id {
            Some(id) => Location::new(id.clone(), self.name.clone(), self.latitude, self.longitude),
            None => Location::from_name(self.name.clone(), self.latitude, self.longitude),
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
    pub url: String,
    #[serde(default)]
    pub token: Option<String>,
}

impl std::fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    pub url: String,
    pub api_key: String,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub history_path: Option<PathBuf>,
    #[serde(default)]
    pub alerts_path: Option<PathBuf>,
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_path: None,
            alerts_path: None,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default = "default_delay_ms")]
    pub inter_location_delay_ms: u64,
    #[serde(default = "default_enabled")]
    pub jitter: bool,
    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_delay_ms() -> u64 {
    DEFAULT_INTER_LOCATION_DELAY_MS
}

fn default_enabled() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inter_location_delay_ms: DEFAULT_INTER_LOCATION_DELAY_MS,
            jitter: true,
            seed: None,
        }
    }
}

impl PipelineConfig {
    pub fn inter_location_delay(&self) -> Duration {
        Duration::from_millis(self.inter_location_delay_ms)
    }

    pub fn jitter_config(&self) -> JitterConfig {
        if self.jitter {
            JitterConfig::default()
        } else {
            JitterConfig::none()
        }
    }
}

impl Config {
    pub fn load(config_override: Option<&PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p.clone(),
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(SalinityError::Config(format!(
                "Config file not found at {:?}",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| SalinityError::Config(format!("Failed to read config: {}", e)))?;

        let config = Self::parse(&config_str)?;
        tracing::debug!(path = %config_path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Parse YAML after `${VAR}` substitution and validate the result.
    pub fn parse(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content);

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| SalinityError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.weather.api_key.trim().is_empty() {
            return Err(SalinityError::Config(
                "weather.api_key is required (set OPENWEATHERMAP_API_KEY)".into(),
            ));
        }
        if self.locations.is_empty() && self.registry.is_none() {
            return Err(SalinityError::Config(
                "Configure at least one entry under `locations` or a `registry`".into(),
            ));
        }
        if self.storage.max_entries == 0 {
            return Err(SalinityError::Config(
                "storage.max_entries must be greater than zero".into(),
            ));
        }
        for location in &self.locations {
            location
                .to_location()
                .map_err(|e| SalinityError::Config(e.to_string()))?;
        }
        Ok(())
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| SalinityError::Config("Cannot determine config directory".into()))?;
        Ok(config_dir.join(APP_DIR).join("config.yaml"))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let re = match regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
            Ok(re) => re,
            Err(_) => return result,
        };

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        if let Ok(dir) = std::env::var("SALINITY_WATCH_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| SalinityError::Config("Cannot determine data directory".into()))?
            .join(APP_DIR);

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn history_path(&self, data_dir: &Path) -> PathBuf {
        self.storage
            .history_path
            .clone()
            .unwrap_or_else(|| data_dir.join("readings.json"))
    }

    pub fn alerts_path(&self, data_dir: &Path) -> PathBuf {
        self.storage
            .alerts_path
            .clone()
            .unwrap_or_else(|| data_dir.join("alerts.json"))
    }

    /// Statically configured locations, in file order.
    pub fn static_locations(&self) -> Result<Vec<Location>> {
        self.locations.iter().map(LocationConfig::to_location).collect()
    }
}
