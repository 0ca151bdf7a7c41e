use super::location::Location;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const SALINITY_ALERT_TYPE: &str = "salinity";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub location_id: String,
    pub location_name: String,
    pub alert_type: String,
    pub severity: Severity,
    pub message: String,
    pub recommendation: String,
    pub alert_date: NaiveDate,
}

impl Alert {
    pub fn new(
        location: &Location,
        severity: Severity,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            location_id: location.id.clone(),
            location_name: location.name.clone(),
            alert_type: SALINITY_ALERT_TYPE.to_string(),
            severity,
            message: message.into(),
            recommendation: recommendation.into(),
            alert_date: Utc::now().date_naive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_display() {
        assert_eq!(Severity::Warning.as_str(), "warning");
        assert_eq!(Severity::Critical.to_string(), "critical");
        assert!(Severity::Warning < Severity::Critical);
    }

    #[test]
    fn alert_serializes_iso_date() {
        let location = Location::from_name("Test Field", 0.0, 0.0).unwrap();
        let mut alert = Alert::new(&location, Severity::Warning, "msg", "rec");
        alert.alert_date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();

        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["alert_date"], "2026-10-18");
        assert_eq!(value["severity"], "warning");
        assert_eq!(value["alert_type"], "salinity");
    }
}
