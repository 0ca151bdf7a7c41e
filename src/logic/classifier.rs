use crate::models::RiskTier;

pub const CRITICAL_THRESHOLD: f64 = 8.0;
pub const HIGH_THRESHOLD: f64 = 4.0;
pub const MODERATE_THRESHOLD: f64 = 2.0;

/// Map a salinity index (dS/m) to its risk tier.
///
/// Thresholds are checked from the top down and each is inclusive, so
/// exactly 4.0 is High rather than Moderate.
pub fn classify(salinity_index: f64) -> RiskTier {
    if salinity_index >= CRITICAL_THRESHOLD {
        RiskTier::Critical
    } else if salinity_index >= HIGH_THRESHOLD {
        RiskTier::High
    } else if salinity_index >= MODERATE_THRESHOLD {
        RiskTier::Moderate
    } else {
        RiskTier::Low
    }
}
