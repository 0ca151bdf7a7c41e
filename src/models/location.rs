use crate::error::{Result, SalinityError};
use serde::{Deserialize, Serialize};

/// A monitored field, identified by a stable id and its coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self> {
        let location = Self {
            id: id.into(),
            name: name.into(),
            latitude,
            longitude,
        };
        location.validate()?;
        Ok(location)
    }

    /// Build a location whose id is derived from its name.
    pub fn from_name(name: impl Into<String>, latitude: f64, longitude: f64) -> Result<Self> {
        let name = name.into();
        let id = slugify(&name);
        Self::new(id, name, latitude, longitude)
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(SalinityError::InvalidData(format!(
                "location '{}' has an empty id",
                self.name
            )));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(SalinityError::InvalidData(format!(
                "location '{}' latitude {} is outside [-90, 90]",
                self.name, self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(SalinityError::InvalidData(format!(
                "location '{}' longitude {} is outside [-180, 180]",
                self.name, self.longitude
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({:.4}, {:.4})",
            self.name, self.latitude, self.longitude
        )
    }
}

/// Lowercase ASCII slug: alphanumerics are kept, every other run becomes `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
