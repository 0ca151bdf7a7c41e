use crate::config::BackendConfig;
use crate::error::{Result, SalinityError};
use crate::models::{Alert, EnvironmentalReading};
use crate::store::{AlertSink, ReadingSink};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

/// Client for the monitoring backend that stores readings and alerts.
pub struct BackendClient {
    client: reqwest::Client,
    config: BackendConfig,
}

#[derive(Debug, Serialize)]
struct ReadingRecord<'a> {
    location_id: &'a str,
    reading_date: NaiveDate,
    salinity_level: f64,
    soil_moisture: f64,
    rainfall_mm: f64,
    temperature_celsius: f64,
    humidity_percent: f64,
    ndvi_value: f64,
    risk_level: &'static str,
    data_source: &'static str,
    is_authentic: bool,
}

impl<'a> From<&'a EnvironmentalReading> for ReadingRecord<'a> {
    fn from(reading: &'a EnvironmentalReading) -> Self {
        Self {
            location_id: &reading.location_id,
            reading_date: reading.timestamp.date_naive(),
            salinity_level: round2(reading.salinity_index),
            soil_moisture: round2(reading.soil_moisture_proxy),
            rainfall_mm: reading.rainfall_mm,
            temperature_celsius: reading.temperature_celsius,
            humidity_percent: reading.humidity_percent,
            ndvi_value: round2(reading.ndvi_proxy),
            risk_level: reading.risk_tier.as_str(),
            data_source: reading.source.as_str(),
            is_authentic: reading.source.is_measured(),
        }
    }
}

#[derive(Debug, Serialize)]
struct AlertRecord<'a> {
    location_id: &'a str,
    alert_type: &'a str,
    severity: &'static str,
    message: &'a str,
    recommendation: &'a str,
    alert_date: NaiveDate,
}

impl<'a> From<&'a Alert> for AlertRecord<'a> {
    fn from(alert: &'a Alert) -> Self {
        Self {
            location_id: &alert.location_id,
            alert_type: &alert.alert_type,
            severity: alert.severity.as_str(),
            message: &alert.message,
            recommendation: &alert.recommendation,
            alert_date: alert.alert_date,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/{}", self.config.url.trim_end_matches('/'), resource)
    }

    async fn post<T: Serialize + Sync>(&self, resource: &str, body: &T) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint(resource))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SalinityError::InvalidData(format!(
                "backend rejected {}: {} {}",
                resource, status, body
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl ReadingSink for BackendClient {
    async fn submit_reading(&self, reading: &EnvironmentalReading) -> Result<()> {
        self.post("readings", &ReadingRecord::from(reading))
            .await
            .map_err(|e| SalinityError::Persistence(e.to_string()))
    }

    fn sink_name(&self) -> &str {
        "backend"
    }
}

#[async_trait]
impl AlertSink for BackendClient {
    async fn dispatch(&self, alert: &Alert) -> Result<()> {
        self.post("alerts", &AlertRecord::from(alert))
            .await
            .map_err(|e| SalinityError::AlertDispatch(e.to_string()))
    }

    fn sink_name(&self) -> &str {
        "backend"
    }
}
