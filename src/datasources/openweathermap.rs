use super::WeatherSource;
use crate::config::WeatherConfig;
use crate::error::{Result, SalinityError};
use crate::models::{Location, WeatherObservation};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

pub struct OpenWeatherMapClient {
    client: reqwest::Client,
    config: WeatherConfig,
}

// OpenWeatherMap current weather response
#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    dt: Option<i64>,
    main: OwmMain,
    #[serde(default)]
    rain: Option<OwmRain>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmRain {
    #[serde(rename = "1h", default)]
    one_hour: Option<f64>,
    #[serde(rename = "3h", default)]
    three_hour: Option<f64>,
}

impl OpenWeatherMapClient {
    pub fn new(config: WeatherConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn current_url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            self.config.base_url.trim_end_matches('/'),
            latitude,
            longitude,
            self.config.api_key
        )
    }

    /// Fetch current conditions for a coordinate.
    pub async fn fetch_current(&self, latitude: f64, longitude: f64) -> Result<WeatherObservation> {
        let url = self.current_url(latitude, longitude);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SalinityError::FetchFailure(format!("OpenWeatherMap: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SalinityError::FetchFailure(format!(
                "OpenWeatherMap returned {}: {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SalinityError::FetchFailure(format!("OpenWeatherMap: {}", e)))?;

        parse_current(&body)
    }

    /// Test connection to OpenWeatherMap API
    pub async fn test_connection(&self, location: &Location) -> Result<bool> {
        let url = self.current_url(location.latitude, location.longitude);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SalinityError::FetchFailure(format!("OpenWeatherMap: {}", e)))?;

        Ok(response.status().is_success())
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherMapClient {
    async fn fetch(&self, location: &Location) -> Result<WeatherObservation> {
        self.fetch_current(location.latitude, location.longitude).await
    }
}

fn parse_current(body: &str) -> Result<WeatherObservation> {
    let owm: OwmCurrentResponse = serde_json::from_str(body).map_err(|e| {
        SalinityError::FetchFailure(format!("Failed to parse OpenWeatherMap response: {}", e))
    })?;

    convert_response(owm)
}

fn convert_response(response: OwmCurrentResponse) -> Result<WeatherObservation> {
    let observed_at = response
        .dt
        .and_then(|dt| DateTime::from_timestamp(dt, 0))
        .unwrap_or_else(Utc::now);

    // Prefer the 1h window, fall back to 3h, then to no rain at all
    let rainfall_mm = response
        .rain
        .and_then(|r| r.one_hour.or(r.three_hour))
        .unwrap_or(0.0);

    let observation = WeatherObservation {
        observed_at,
        temperature_celsius: response.main.temp,
        humidity_percent: response.main.humidity,
        rainfall_mm,
    };

    observation
        .validate()
        .map_err(|e| SalinityError::FetchFailure(format!("Incomplete weather data: {}", e)))?;

    Ok(observation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> WeatherConfig {
        WeatherConfig {
            api_key: "test_key".to_string(),
            base_url: "https://owm.example/data/2.5/".to_string(),
        }
    }

    #[test]
    fn builds_metric_url() {
        let client = OpenWeatherMapClient::new(sample_config());
        let url = client.current_url(36.5, -120.25);
        assert_eq!(
            url,
            "https://owm.example/data/2.5/weather?lat=36.5&lon=-120.25&appid=test_key&units=metric"
        );
    }

    #[test]
    fn parses_one_hour_rain() {
        let body = r#"{
            "dt": 1760788800,
            "main": {"temp": 38.0, "feels_like": 40.1, "humidity": 40},
            "rain": {"1h": 2.0, "3h": 5.5}
        }"#;
        let obs = parse_current(body).unwrap();
        assert_eq!(obs.temperature_celsius, 38.0);
        assert_eq!(obs.humidity_percent, 40.0);
        assert_eq!(obs.rainfall_mm, 2.0);
        assert_eq!(obs.observed_at.timestamp(), 1760788800);
    }

    #[test]
    fn falls_back_to_three_hour_rain() {
        let body = r#"{"main": {"temp": 21.0, "humidity": 70}, "rain": {"3h": 4.2}}"#;
        assert_eq!(parse_current(body).unwrap().rainfall_mm, 4.2);
    }

    #[test]
    fn missing_rain_is_zero() {
        let body = r#"{"main": {"temp": 21.0, "humidity": 70}}"#;
        assert_eq!(parse_current(body).unwrap().rainfall_mm, 0.0);
    }

    #[test]
    fn missing_fields_are_fetch_failures() {
        let body = r#"{"main": {"humidity": 70}}"#;
        assert!(matches!(
            parse_current(body),
            Err(SalinityError::FetchFailure(_))
        ));

        let body = r#"{"cod": 401, "message": "Invalid API key"}"#;
        assert!(matches!(
            parse_current(body),
            Err(SalinityError::FetchFailure(_))
        ));
    }

    #[test]
    fn out_of_range_values_are_fetch_failures() {
        let body = r#"{"main": {"temp": 21.0, "humidity": 170}}"#;
        assert!(matches!(
            parse_current(body),
            Err(SalinityError::FetchFailure(_))
        ));
    }
}
