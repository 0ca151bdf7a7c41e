use super::LocationRegistry;
use crate::config::{Config, RegistryConfig};
use crate::error::{Result, SalinityError};
use crate::models::Location;
use async_trait::async_trait;

/// Locations taken verbatim from the config file.
pub struct StaticRegistry {
    locations: Vec<Location>,
}

impl StaticRegistry {
    pub fn new(locations: Vec<Location>) -> Self {
        Self { locations }
    }
}

#[async_trait]
impl LocationRegistry for StaticRegistry {
    async fn fetch_locations(&self) -> Result<Vec<Location>> {
        Ok(self.locations.clone())
    }

    fn registry_name(&self) -> &str {
        "config"
    }
}

/// Locations served as a JSON array by a remote endpoint.
pub struct RemoteRegistry {
    client: reqwest::Client,
    config: RegistryConfig,
}

impl RemoteRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl LocationRegistry for RemoteRegistry {
    async fn fetch_locations(&self) -> Result<Vec<Location>> {
        let mut request = self.client.get(&self.config.url);
        if let Some(ref token) = self.config.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| SalinityError::Config(format!("Location registry unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(SalinityError::Config(format!(
                "Location registry returned {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        parse_locations(&body)
    }

    fn registry_name(&self) -> &str {
        &self.config.url
    }
}

/// Pick the location source for a config: the remote registry when one is
/// configured, otherwise the static list.
pub fn from_config(config: &Config) -> Result<Box<dyn LocationRegistry>> {
    match config.registry {
        Some(ref registry) => {
            if !config.locations.is_empty() {
                tracing::warn!(
                    "Both `registry` and `locations` configured; using the registry at {}",
                    registry.url
                );
            }
            Ok(Box::new(RemoteRegistry::new(registry.clone())))
        }
        None => Ok(Box::new(StaticRegistry::new(config.static_locations()?))),
    }
}

fn parse_locations(body: &str) -> Result<Vec<Location>> {
    let locations: Vec<Location> = serde_json::from_str(body).map_err(|e| {
        SalinityError::Config(format!("Failed to parse location registry response: {}", e))
    })?;

    for location in &locations {
        location
            .validate()
            .map_err(|e| SalinityError::Config(e.to_string()))?;
    }

    Ok(locations)
}
