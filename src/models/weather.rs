use crate::error::{Result, SalinityError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Air temperatures outside this band are treated as provider faults.
pub const TEMPERATURE_RANGE_CELSIUS: std::ops::RangeInclusive<f64> = -90.0..=60.0;
/// Upper bound on rainfall for a single reporting window.
pub const MAX_RAINFALL_MM: f64 = 500.0;

/// Current conditions at a location, as reported by the weather provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub observed_at: DateTime<Utc>,
    pub temperature_celsius: f64,
    pub humidity_percent: f64,
    /// Rainfall over the provider's most recent window (1h or 3h), 0 when absent.
    #[serde(default)]
    pub rainfall_mm: f64,
}

impl WeatherObservation {
    #[cfg(test)]
    pub fn new(temperature_celsius: f64, humidity_percent: f64, rainfall_mm: f64) -> Self {
        Self {
            observed_at: Utc::now(),
            temperature_celsius,
            humidity_percent,
            rainfall_mm,
        }
    }

    /// Reject observations that the estimator must never run on.
    pub fn validate(&self) -> Result<()> {
        if !self.temperature_celsius.is_finite()
            || !TEMPERATURE_RANGE_CELSIUS.contains(&self.temperature_celsius)
        {
            return Err(SalinityError::InvalidData(format!(
                "temperature out of range: {}",
                self.temperature_celsius
            )));
        }
        if !self.humidity_percent.is_finite() || !(0.0..=100.0).contains(&self.humidity_percent)
        {
            return Err(SalinityError::InvalidData(format!(
                "humidity out of range: {}",
                self.humidity_percent
            )));
        }
        if !self.rainfall_mm.is_finite() || !(0.0..=MAX_RAINFALL_MM).contains(&self.rainfall_mm) {
            return Err(SalinityError::InvalidData(format!(
                "rainfall out of range: {}",
                self.rainfall_mm
            )));
        }
        Ok(())
    }
}
