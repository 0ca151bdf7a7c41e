use super::location::Location;
use super::weather::WeatherObservation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Produced by the weather-proxy estimation pipeline
    Automated,
    #[allow(dead_code)]
    Manual,
    #[allow(dead_code)]
    Sensor,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Automated => "automated_estimate",
            DataSource::Manual => "manual_entry",
            DataSource::Sensor => "field_sensor",
        }
    }

    /// Only sensor readings are real measurements.
    pub fn is_measured(&self) -> bool {
        matches!(self, DataSource::Sensor)
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Moderate => "moderate",
            RiskTier::High => "high",
            RiskTier::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of the estimator for one observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub soil_moisture_proxy: f64,
    pub salinity_index: f64,
    pub ndvi_proxy: f64,
}

/// One estimated reading for one location. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalReading {
    pub timestamp: DateTime<Utc>,
    pub location_id: String,
    pub location_name: String,
    pub salinity_index: f64,
    pub soil_moisture_proxy: f64,
    pub ndvi_proxy: f64,
    pub rainfall_mm: f64,
    pub temperature_celsius: f64,
    pub humidity_percent: f64,
    pub risk_tier: RiskTier,
    pub source: DataSource,
}

impl EnvironmentalReading {
    pub fn new(
        location: &Location,
        observation: &WeatherObservation,
        estimate: Estimate,
        risk_tier: RiskTier,
        source: DataSource,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            location_id: location.id.clone(),
            location_name: location.name.clone(),
            salinity_index: estimate.salinity_index,
            soil_moisture_proxy: estimate.soil_moisture_proxy,
            ndvi_proxy: estimate.ndvi_proxy,
            rainfall_mm: observation.rainfall_mm,
            temperature_celsius: observation.temperature_celsius,
            humidity_percent: observation.humidity_percent,
            risk_tier,
            source,
        }
    }
}
