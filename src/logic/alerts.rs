use super::classifier::{CRITICAL_THRESHOLD, HIGH_THRESHOLD};
use crate::models::{Alert, Location, Severity};

/// Salinity alert policy
///
/// Bands (checked high to low):
/// - Critical: index >= 8.0 dS/m
/// - Warning: 4.0 <= index < 8.0 dS/m
/// - No alert below 4.0
///
/// Every qualifying evaluation yields a fresh alert; nothing is suppressed
/// across runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlertPolicy;

impl AlertPolicy {
    pub fn evaluate(&self, location: &Location, salinity_index: f64) -> Option<Alert> {
        let severity = if salinity_index >= CRITICAL_THRESHOLD {
            Severity::Critical
        } else if salinity_index >= HIGH_THRESHOLD {
            Severity::Warning
        } else {
            return None;
        };

        Some(self.build_alert(location, severity, salinity_index))
    }

    fn build_alert(&self, location: &Location, severity: Severity, salinity_index: f64) -> Alert {
        let (message, recommendation) = match severity {
            Severity::Critical => (
                format!(
                    "Critical salinity level of {:.2} dS/m estimated at {}.",
                    salinity_index, location.name
                ),
                "Urgent: apply leaching irrigation to flush salts below the root zone. \
                 Suspend fertilizer applications and inspect drainage outlets immediately.",
            ),
            Severity::Warning => (
                format!(
                    "Elevated salinity level of {:.2} dS/m estimated at {}.",
                    salinity_index, location.name
                ),
                "Increase irrigation frequency to keep salts moving downward \
                 and improve field drainage to prevent accumulation.",
            ),
        };

        Alert::new(location, severity, message, recommendation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Location {
        Location::from_name("Test Field", 0.0, 0.0).unwrap()
    }

    #[test]
    fn critical_band() {
        let alert = AlertPolicy.evaluate(&field(), 8.5).unwrap();
        assert_eq!(alert.severity, Severity::Critical);
        assert!(alert.message.contains("8.50"));
        assert!(alert.message.contains("Test Field"));
        assert!(alert.recommendation.to_lowercase().contains("leaching"));
    }

    #[test]
    fn warning_band() {
        let alert = AlertPolicy.evaluate(&field(), 5.0).unwrap();
        assert_eq!(alert.severity, Severity::Warning);
        assert!(alert.message.contains("5.00"));
        assert!(alert.recommendation.contains("irrigation"));
        assert!(alert.recommendation.contains("drainage"));
    }

    #[test]
    fn no_alert_below_threshold() {
        assert!(AlertPolicy.evaluate(&field(), 3.9).is_none());
        assert!(AlertPolicy.evaluate(&field(), 0.5).is_none());
    }

    #[test]
    fn band_edges() {
        assert_eq!(
            AlertPolicy.evaluate(&field(), 4.0).map(|a| a.severity),
            Some(Severity::Warning)
        );
        assert_eq!(
            AlertPolicy.evaluate(&field(), 7.99).map(|a| a.severity),
            Some(Severity::Warning)
        );
        assert_eq!(
            AlertPolicy.evaluate(&field(), 8.0).map(|a| a.severity),
            Some(Severity::Critical)
        );
    }

    #[test]
    fn alert_references_location() {
        let alert = AlertPolicy.evaluate(&field(), 6.0).unwrap();
        assert_eq!(alert.location_id, "test-field");
        assert_eq!(alert.alert_type, "salinity");
    }
}
