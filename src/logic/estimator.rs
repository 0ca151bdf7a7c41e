//! Weather-proxy estimation of soil moisture, salinity and vegetation health.
//!
//! Every output is a deterministic banded baseline plus an optional uniform
//! jitter term. The baseline functions are public so the bands can be
//! checked independently of the randomness.

use crate::models::{Estimate, WeatherObservation};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub const SALINITY_MIN: f64 = 0.5;
pub const SALINITY_MAX: f64 = 8.0;
pub const NDVI_MIN: f64 = -0.2;
pub const NDVI_MAX: f64 = 0.9;

const SALINITY_BASE: f64 = 1.0;
const NDVI_BASE: f64 = 0.5;
const MOISTURE_BASE: f64 = 25.0;
const MOISTURE_PER_MM_RAIN: f64 = 2.0;
const MOISTURE_PER_HUMIDITY_POINT: f64 = 0.2;
const HUMIDITY_NEUTRAL: f64 = 50.0;

/// Half-widths of the symmetric uniform jitter applied to each output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterConfig {
    pub soil_moisture: f64,
    pub salinity: f64,
    pub ndvi: f64,
}

impl JitterConfig {
    pub fn none() -> Self {
        Self {
            soil_moisture: 0.0,
            salinity: 0.0,
            ndvi: 0.0,
        }
    }
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            soil_moisture: 5.0,
            salinity: 0.2,
            ndvi: 0.05,
        }
    }
}

pub struct EnvironmentalEstimator {
    rng: SmallRng,
    jitter: JitterConfig,
}

impl EnvironmentalEstimator {
    pub fn new(jitter: JitterConfig) -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
            jitter,
        }
    }

    /// Reproducible estimator for a fixed seed.
    pub fn with_seed(jitter: JitterConfig, seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            jitter,
        }
    }

    #[cfg(test)]
    pub fn deterministic() -> Self {
        Self::with_seed(JitterConfig::none(), 0)
    }

    pub fn estimate(&mut self, obs: &WeatherObservation) -> Estimate {
        let soil_moisture_proxy =
            moisture_baseline(obs) + self.sample_jitter(self.jitter.soil_moisture);

        let salinity = salinity_baseline(soil_moisture_proxy, obs)
            + self.sample_jitter(self.jitter.salinity);

        let ndvi = ndvi_baseline(soil_moisture_proxy, obs) + self.sample_jitter(self.jitter.ndvi);

        Estimate {
            soil_moisture_proxy,
            salinity_index: clamp_salinity(salinity),
            ndvi_proxy: clamp_ndvi(ndvi),
        }
    }

    fn sample_jitter(&mut self, amplitude: f64) -> f64 {
        if amplitude > 0.0 {
            self.rng.random_range(-amplitude..=amplitude)
        } else {
            0.0
        }
    }
}

impl Default for EnvironmentalEstimator {
    fn default() -> Self {
        Self::new(JitterConfig::default())
    }
}

/// Soil-moisture proxy (%) before jitter. Intentionally unclamped.
pub fn moisture_baseline(obs: &WeatherObservation) -> f64 {
    MOISTURE_BASE
        + MOISTURE_PER_MM_RAIN * obs.rainfall_mm
        + MOISTURE_PER_HUMIDITY_POINT * (obs.humidity_percent - HUMIDITY_NEUTRAL)
}

pub fn moisture_penalty(soil_moisture: f64) -> f64 {
    if soil_moisture < 20.0 {
        1.5
    } else if soil_moisture < 30.0 {
        0.8
    } else {
        0.0
    }
}

pub fn rainfall_penalty(rainfall_mm: f64) -> f64 {
    if rainfall_mm < 5.0 {
        1.0
    } else if rainfall_mm < 15.0 {
        0.5
    } else {
        0.0
    }
}

pub fn heat_penalty(temperature_celsius: f64) -> f64 {
    if temperature_celsius > 35.0 {
        0.8
    } else if temperature_celsius > 30.0 {
        0.4
    } else {
        0.0
    }
}

/// Salinity index (dS/m) before jitter and clamping.
pub fn salinity_baseline(soil_moisture: f64, obs: &WeatherObservation) -> f64 {
    SALINITY_BASE
        + moisture_penalty(soil_moisture)
        + rainfall_penalty(obs.rainfall_mm)
        + heat_penalty(obs.temperature_celsius)
}

/// NDVI proxy before jitter and clamping.
pub fn ndvi_baseline(soil_moisture: f64, obs: &WeatherObservation) -> f64 {
    let mut ndvi = NDVI_BASE;

    if soil_moisture > 35.0 {
        ndvi += 0.2;
    } else if soil_moisture > 25.0 {
        ndvi += 0.1;
    } else if soil_moisture < 15.0 {
        ndvi -= 0.2;
    }

    let temp = obs.temperature_celsius;
    if (20.0..=30.0).contains(&temp) {
        ndvi += 0.1;
    } else if temp > 35.0 {
        ndvi -= 0.15;
    }

    if obs.rainfall_mm > 10.0 {
        ndvi += 0.1;
    }

    ndvi
}

pub fn clamp_salinity(value: f64) -> f64 {
    value.clamp(SALINITY_MIN, SALINITY_MAX)
}

pub fn clamp_ndvi(value: f64) -> f64 {
    value.clamp(NDVI_MIN, NDVI_MAX)
}
