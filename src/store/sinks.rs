use super::history::AlertLog;
use crate::error::{Result, SalinityError};
use crate::models::{Alert, EnvironmentalReading};
use async_trait::async_trait;

/// Destination for individual readings as they are produced.
#[async_trait]
pub trait ReadingSink: Send + Sync {
    async fn submit_reading(&self, reading: &EnvironmentalReading) -> Result<()>;

    fn sink_name(&self) -> &str;
}

/// Destination for alerts raised by the alert policy.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn dispatch(&self, alert: &Alert) -> Result<()>;

    fn sink_name(&self) -> &str;
}

#[async_trait]
impl AlertSink for AlertLog {
    async fn dispatch(&self, alert: &Alert) -> Result<()> {
        self.append(vec![alert.clone()])
            .map(|_| ())
            .map_err(|e| SalinityError::AlertDispatch(e.to_string()))
    }

    fn sink_name(&self) -> &str {
        "local alert log"
    }
}
