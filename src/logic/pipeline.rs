use super::alerts::AlertPolicy;
use super::classifier::classify;
use super::estimator::EnvironmentalEstimator;
use crate::datasources::WeatherSource;
use crate::models::{DataSource, EnvironmentalReading, Location};
use crate::store::{AlertSink, ReadingHistoryStore, ReadingSink};
use std::time::Duration;

/// Counters for one pass over the configured locations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub locations: usize,
    pub processed: usize,
    pub skipped: usize,
    pub readings_submitted: usize,
    pub reading_failures: usize,
    pub alerts_raised: usize,
    pub alert_failures: usize,
    /// Entries in the history file after the end-of-run append
    pub history_size: Option<usize>,
    pub history_error: Option<String>,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.skipped == 0
            && self.reading_failures == 0
            && self.alert_failures == 0
            && self.history_error.is_none()
    }
}

/// Drives fetch, estimate, classify, persist and alert for each location in turn.
///
/// Locations are isolated from each other: a failed fetch or sink write is
/// logged and counted, and the run moves on. Readings are buffered and
/// written to the history store once, after the last location.
pub struct Pipeline {
    weather: Box<dyn WeatherSource>,
    estimator: EnvironmentalEstimator,
    policy: AlertPolicy,
    history: ReadingHistoryStore,
    reading_sink: Option<Box<dyn ReadingSink>>,
    alert_sink: Box<dyn AlertSink>,
    delay: Duration,
}

impl Pipeline {
    pub fn new(
        weather: Box<dyn WeatherSource>,
        estimator: EnvironmentalEstimator,
        history: ReadingHistoryStore,
        alert_sink: Box<dyn AlertSink>,
    ) -> Self {
        Self {
            weather,
            estimator,
            policy: AlertPolicy,
            history,
            reading_sink: None,
            alert_sink,
            delay: Duration::from_millis(crate::config::DEFAULT_INTER_LOCATION_DELAY_MS),
        }
    }

    pub fn with_reading_sink(mut self, sink: Box<dyn ReadingSink>) -> Self {
        self.reading_sink = Some(sink);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub async fn run(&mut self, locations: &[Location]) -> RunSummary {
        let mut summary = RunSummary {
            locations: locations.len(),
            ..RunSummary::default()
        };

        let mut buffered = Vec::with_capacity(locations.len());

        for (index, location) in locations.iter().enumerate() {
            // Throttle outbound weather requests
            if index > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            if let Some(reading) = self.process_location(location, &mut summary).await {
                buffered.push(reading);
            }
        }

        match self.history.append(buffered) {
            Ok(size) => summary.history_size = Some(size),
            Err(e) => {
                tracing::error!(
                    path = %self.history.path().display(),
                    "Failed to persist reading history: {}",
                    e
                );
                summary.history_error = Some(e.to_string());
            }
        }

        tracing::info!(
            locations = summary.locations,
            processed = summary.processed,
            skipped = summary.skipped,
            alerts = summary.alerts_raised,
            alert_failures = summary.alert_failures,
            reading_failures = summary.reading_failures,
            "Run complete"
        );

        summary
    }

    async fn process_location(
        &mut self,
        location: &Location,
        summary: &mut RunSummary,
    ) -> Option<EnvironmentalReading> {
        let observation = match self.weather.fetch(location).await {
            Ok(obs) => obs,
            Err(e) => {
                tracing::warn!(location = %location.name, "Skipping location: {}", e);
                summary.skipped += 1;
                return None;
            }
        };

        if let Err(e) = observation.validate() {
            tracing::warn!(
                location = %location.name,
                "Skipping location, bad weather data: {}",
                e
            );
            summary.skipped += 1;
            return None;
        }

        let estimate = self.estimator.estimate(&observation);
        let risk_tier = classify(estimate.salinity_index);
        let reading = EnvironmentalReading::new(
            location,
            &observation,
            estimate,
            risk_tier,
            DataSource::Automated,
        );

        tracing::info!(
            location = %location.name,
            tier = %risk_tier,
            "Salinity {:.2} dS/m, soil moisture {:.1}%, NDVI {:.2}",
            reading.salinity_index,
            reading.soil_moisture_proxy,
            reading.ndvi_proxy
        );

        if let Some(ref sink) = self.reading_sink {
            match sink.submit_reading(&reading).await {
                Ok(()) => summary.readings_submitted += 1,
                Err(e) => {
                    tracing::warn!(
                        location = %location.name,
                        sink = sink.sink_name(),
                        "Failed to submit reading: {}",
                        e
                    );
                    summary.reading_failures += 1;
                }
            }
        }

        // Alert dispatch is independent of whether the reading write succeeded
        if let Some(alert) = self.policy.evaluate(location, reading.salinity_index) {
            summary.alerts_raised += 1;
            match self.alert_sink.dispatch(&alert).await {
                Ok(()) => tracing::info!(
                    location = %location.name,
                    severity = %alert.severity,
                    "Salinity alert raised"
                ),
                Err(e) => {
                    tracing::warn!(
                        location = %location.name,
                        sink = self.alert_sink.sink_name(),
                        "Failed to dispatch alert: {}",
                        e
                    );
                    summary.alert_failures += 1;
                }
            }
        }

        summary.processed += 1;
        Some(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SalinityError};
    use crate::models::{Alert, RiskTier, Severity, WeatherObservation};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    struct FakeWeather {
        responses: HashMap<String, WeatherObservation>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl WeatherSource for FakeWeather {
        async fn fetch(&self, location: &Location) -> Result<WeatherObservation> {
            self.calls.lock().unwrap().push(location.id.clone());
            self.responses
                .get(&location.id)
                .cloned()
                .ok_or_else(|| SalinityError::FetchFailure("provider returned 503".into()))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingAlerts {
        alerts: Arc<Mutex<Vec<Alert>>>,
        fail: bool,
    }

    #[async_trait]
    impl AlertSink for RecordingAlerts {
        async fn dispatch(&self, alert: &Alert) -> Result<()> {
            if self.fail {
                return Err(SalinityError::AlertDispatch("sink offline".into()));
            }
            self.alerts.lock().unwrap().push(alert.clone());
            Ok(())
        }

        fn sink_name(&self) -> &str {
            "recording"
        }
    }

    #[derive(Clone, Default)]
    struct RecordingReadings {
        readings: Arc<Mutex<Vec<EnvironmentalReading>>>,
        fail: bool,
    }

    #[async_trait]
    impl ReadingSink for RecordingReadings {
        async fn submit_reading(&self, reading: &EnvironmentalReading) -> Result<()> {
            if self.fail {
                return Err(SalinityError::Persistence("backend rejected write".into()));
            }
            self.readings.lock().unwrap().push(reading.clone());
            Ok(())
        }

        fn sink_name(&self) -> &str {
            "recording"
        }
    }

    fn location(name: &str) -> Location {
        Location::from_name(name, 0.0, 0.0).unwrap()
    }

    fn hot_dry() -> WeatherObservation {
        // moisture 17 -> 1.0 + 1.5 + 1.0 + 0.8 = 4.3 (High, warning alert)
        WeatherObservation::new(40.0, 10.0, 0.0)
    }

    fn mild_wet() -> WeatherObservation {
        WeatherObservation::new(24.0, 70.0, 20.0)
    }

    struct Harness {
        _dir: TempDir,
        history_path: std::path::PathBuf,
        calls: Arc<Mutex<Vec<String>>>,
        alerts: RecordingAlerts,
        pipeline: Pipeline,
    }

    fn harness(
        responses: Vec<(&str, WeatherObservation)>,
        alerts: RecordingAlerts,
        capacity: usize,
    ) -> Harness {
        let dir = TempDir::new().unwrap();
        let history_path = dir.path().join("readings.json");
        let calls = Arc::new(Mutex::new(Vec::new()));
        let weather = FakeWeather {
            responses: responses
                .into_iter()
                .map(|(id, obs)| (id.to_string(), obs))
                .collect(),
            calls: Arc::clone(&calls),
        };

        let pipeline = Pipeline::new(
            Box::new(weather),
            EnvironmentalEstimator::deterministic(),
            ReadingHistoryStore::new(&history_path, capacity),
            Box::new(alerts.clone()),
        )
        .with_delay(Duration::ZERO);

        Harness {
            _dir: dir,
            history_path,
            calls,
            alerts,
            pipeline,
        }
    }

    fn stored(path: &std::path::Path) -> Vec<EnvironmentalReading> {
        ReadingHistoryStore::new(path, 500).load().unwrap()
    }

    #[tokio::test]
    async fn test_field_end_to_end() {
        let mut h = harness(
            vec![("test-field", WeatherObservation::new(38.0, 40.0, 2.0))],
            RecordingAlerts::default(),
            500,
        );

        let summary = h.pipeline.run(&[location("Test Field")]).await;

        assert_eq!(summary.processed, 1);
        assert!(summary.is_clean());
        let readings = stored(&h.history_path);
        assert_eq!(readings.len(), 1);
        let reading = &readings[0];
        assert!(reading.salinity_index >= 2.8);
        assert_eq!(reading.risk_tier, RiskTier::Moderate);
        assert_eq!(reading.source, DataSource::Automated);
        assert!(h.alerts.alerts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_skips_only_that_location() {
        let mut h = harness(
            vec![("north", hot_dry()), ("south", mild_wet())],
            RecordingAlerts::default(),
            500,
        );
        let locations = [location("North"), location("Broken"), location("South")];

        let summary = h.pipeline.run(&locations).await;

        assert_eq!(summary.locations, 3);
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.history_size, Some(2));
        assert_eq!(*h.calls.lock().unwrap(), vec!["north", "broken", "south"]);

        let readings = stored(&h.history_path);
        let ids: Vec<_> = readings.iter().map(|r| r.location_id.as_str()).collect();
        assert_eq!(ids, vec!["north", "south"]);

        let alerts = h.alerts.alerts.lock().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].location_id, "north");
        assert!(alerts.iter().all(|a| a.location_id != "broken"));
    }

    #[tokio::test]
    async fn alert_failure_keeps_reading() {
        let failing = RecordingAlerts {
            fail: true,
            ..RecordingAlerts::default()
        };
        let mut h = harness(vec![("north", hot_dry())], failing, 500);

        let summary = h.pipeline.run(&[location("North")]).await;

        assert_eq!(summary.alerts_raised, 1);
        assert_eq!(summary.alert_failures, 1);
        assert_eq!(summary.processed, 1);
        assert_eq!(stored(&h.history_path).len(), 1);
    }

    #[tokio::test]
    async fn reading_sink_failure_still_dispatches_alert() {
        let h = harness(vec![("north", hot_dry())], RecordingAlerts::default(), 500);
        let failing = RecordingReadings {
            fail: true,
            ..RecordingReadings::default()
        };
        let mut pipeline = h.pipeline.with_reading_sink(Box::new(failing));

        let summary = pipeline.run(&[location("North")]).await;

        assert_eq!(summary.reading_failures, 1);
        assert_eq!(summary.readings_submitted, 0);
        assert_eq!(h.alerts.alerts.lock().unwrap().len(), 1);
        assert_eq!(
            h.alerts.alerts.lock().unwrap()[0].severity,
            Severity::Warning
        );
        assert_eq!(stored(&h.history_path).len(), 1);
    }

    #[tokio::test]
    async fn reading_sink_receives_each_reading() {
        let h = harness(
            vec![("north", hot_dry()), ("south", mild_wet())],
            RecordingAlerts::default(),
            500,
        );
        let sink = RecordingReadings::default();
        let mut pipeline = h.pipeline.with_reading_sink(Box::new(sink.clone()));

        let summary = pipeline
            .run(&[location("North"), location("South")])
            .await;

        assert_eq!(summary.readings_submitted, 2);
        let submitted = sink.readings.lock().unwrap();
        assert_eq!(submitted[0].location_id, "north");
        assert_eq!(submitted[1].risk_tier, RiskTier::Low);
    }

    #[tokio::test]
    async fn history_stays_bounded_across_runs() {
        let mut h = harness(
            vec![("a", mild_wet()), ("b", mild_wet())],
            RecordingAlerts::default(),
            3,
        );
        let locations = [location("A"), location("B")];

        h.pipeline.run(&locations).await;
        let summary = h.pipeline.run(&locations).await;

        assert_eq!(summary.history_size, Some(3));
        let ids: Vec<_> = stored(&h.history_path)
            .into_iter()
            .map(|r| r.location_id)
            .collect();
        assert_eq!(ids, vec!["b", "a", "b"]);
    }

    #[tokio::test]
    async fn unwritable_history_is_reported_not_fatal() {
        let mut h = harness(vec![("a", mild_wet())], RecordingAlerts::default(), 500);
        std::fs::write(&h.history_path, "not json").unwrap();

        let summary = h.pipeline.run(&[location("A")]).await;

        assert_eq!(summary.processed, 1);
        assert!(summary.history_size.is_none());
        assert!(summary.history_error.is_some());
        assert!(!summary.is_clean());
    }

    #[tokio::test]
    async fn implausible_weather_never_reaches_history() {
        let mut h = harness(
            vec![
                ("flood", WeatherObservation::new(20.0, 50.0, 1.0e308)),
                ("void", WeatherObservation::new(f64::NAN, 50.0, 0.0)),
                ("south", mild_wet()),
            ],
            RecordingAlerts::default(),
            500,
        );
        let locations = [location("Flood"), location("Void"), location("South")];

        let first = h.pipeline.run(&locations).await;
        let second = h.pipeline.run(&locations).await;

        for summary in [&first, &second] {
            assert_eq!(summary.skipped, 2);
            assert_eq!(summary.processed, 1);
            assert!(summary.history_error.is_none());
        }
        assert_eq!(second.history_size, Some(2));

        let readings = stored(&h.history_path);
        assert!(readings.iter().all(|r| r.location_id == "south"));
        assert!(readings.iter().all(|r| r.soil_moisture_proxy.is_finite()));
    }

    #[tokio::test]
    async fn waits_between_locations() {
        let h = harness(
            vec![("a", mild_wet()), ("b", mild_wet()), ("c", mild_wet())],
            RecordingAlerts::default(),
            500,
        );
        let mut pipeline = h.pipeline.with_delay(Duration::from_millis(25));

        let started = std::time::Instant::now();
        pipeline
            .run(&[location("A"), location("B"), location("C")])
            .await;

        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn empty_location_list_is_a_no_op() {
        let mut h = harness(Vec::new(), RecordingAlerts::default(), 500);
        let summary = h.pipeline.run(&[]).await;
        assert_eq!(summary.processed, 0);
        assert_eq!(summary.history_size, Some(0));
    }
}
