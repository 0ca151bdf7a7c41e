pub mod backend;
pub mod openweathermap;
pub mod registry;

pub use backend::BackendClient;
pub use openweathermap::OpenWeatherMapClient;

use crate::error::Result;
use crate::models::{Location, WeatherObservation};
use async_trait::async_trait;

/// Provider of current weather for a coordinate.
///
/// Any transport error, malformed payload or incomplete observation is
/// reported as `SalinityError::FetchFailure`.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self, location: &Location) -> Result<WeatherObservation>;
}

/// Source of the locations processed by a run.
#[async_trait]
pub trait LocationRegistry: Send + Sync {
    async fn fetch_locations(&self) -> Result<Vec<Location>>;

    fn registry_name(&self) -> &str;
}
