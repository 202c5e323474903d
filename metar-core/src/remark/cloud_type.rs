use serde::{Deserialize, Serialize};

use crate::error::{Result, WeatherError, ensure};

const CLOUD_TYPES: [(&str, &str); 12] = [
    ("CU", "Cumulus"),
    ("TCU", "Towering Cumulus"),
    ("CF", "Cumuliform"),
    ("ST", "Stratus"),
    ("SC", "Stratocumulus"),
    ("SF", "Stratiform"),
    ("NS", "Nimbostratus"),
    ("AS", "Altostratus"),
    ("AC", "Altocumulus"),
    ("CS", "Cirrostratus"),
    ("CC", "Cirrocumulus"),
    ("CI", "Cirrus"),
];
const INTENSITIES: [&str; 1] = ["MDT"];
const OVERHEAD_ALL_QUADRANTS: &str = "OHD-ALQDS";
const LOCATIONS: [&str; 4] = ["OHD", OVERHEAD_ALL_QUADRANTS, "ALQDS", "TR"];
const DIRECTIONS: [&str; 8] = ["N", "S", "E", "W", "NE", "NW", "SE", "SW"];

/// Cloud-type remark such as `SC1`, `MDT CU OHD` or `AC MOVG NE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudType {
    cloud_type: String,
    oktas: Option<u8>,
    intensity: Option<String>,
    location: Option<String>,
    movement_direction: Option<String>,
}

fn pick(value: Option<&str>, allowed: &[&str], what: &str) -> Result<Option<String>> {
    let Some(code) = value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_uppercase) else {
        return Ok(None);
    };
    ensure(allowed.contains(&code.as_str()), || format!("Invalid {what}: {code}"))?;
    Ok(Some(code))
}

impl CloudType {
    pub fn new(
        cloud_type: &str,
        oktas: Option<u8>,
        intensity: Option<&str>,
        location: Option<&str>,
        movement_direction: Option<&str>,
    ) -> Result<Self> {
        let code = cloud_type.trim().to_uppercase();
        if code.is_empty() {
            return Err(WeatherError::validation("Cloud type cannot be blank"));
        }
        ensure(CLOUD_TYPES.iter().any(|(key, _)| *key == code), || {
            format!("Invalid cloud type: {cloud_type}")
        })?;
        if let Some(o) = oktas {
            ensure((1..=8).contains(&o), || format!("Oktas must be between 1 and 8: {o}"))?;
        }

        Ok(Self {
            cloud_type: code,
            oktas,
            intensity: pick(intensity, &INTENSITIES, "intensity")?,
            location: pick(location, &LOCATIONS, "location")?,
            movement_direction: pick(movement_direction, &DIRECTIONS, "movement direction")?,
        })
    }

    pub fn of(cloud_type: &str) -> Result<Self> {
        Self::new(cloud_type, None, None, None, None)
    }

    pub fn with_oktas(cloud_type: &str, oktas: u8) -> Result<Self> {
        Self::new(cloud_type, Some(oktas), None, None, None)
    }

    pub fn with_location(cloud_type: &str, location: &str) -> Result<Self> {
        Self::new(cloud_type, None, None, Some(location), None)
    }

    pub fn cloud_type(&self) -> &str {
        &self.cloud_type
    }

    pub fn oktas(&self) -> Option<u8> {
        self.oktas
    }

    pub fn intensity(&self) -> Option<&str> {
        self.intensity.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn movement_direction(&self) -> Option<&str> {
        self.movement_direction.as_deref()
    }

    pub fn is_trace(&self) -> bool {
        self.location.as_deref() == Some("TR")
    }

    pub fn is_overhead(&self) -> bool {
        matches!(self.location.as_deref(), Some("OHD") | Some(OVERHEAD_ALL_QUADRANTS))
    }

    pub fn is_all_quadrants(&self) -> bool {
        matches!(self.location.as_deref(), Some("ALQDS") | Some(OVERHEAD_ALL_QUADRANTS))
    }

    pub fn oktas_fraction(&self) -> Option<f64> {
        self.oktas.map(|o| f64::from(o) / 8.0)
    }

    pub fn cloud_type_description(&self) -> &str {
        CLOUD_TYPES
            .iter()
            .find(|(key, _)| *key == self.cloud_type)
            .map(|(_, text)| *text)
            .unwrap_or(self.cloud_type.as_str())
    }

    pub fn summary(&self) -> String {
        let mut out = String::new();
        if let Some(intensity) = &self.intensity {
            out.push_str(&intensity.to_lowercase());
            out.push(' ');
        }
        out.push_str(self.cloud_type_description());

        let mut details = Vec::new();
        if let Some(o) = self.oktas {
            details.push(format!("{o}/8"));
        }
        if let Some(loc) = &self.location {
            details.push(loc.to_lowercase());
        }
        if let Some(dir) = &self.movement_direction {
            details.push(format!("moving {dir}"));
        }
        if !details.is_empty() {
            out.push_str(&format!(" ({})", details.join(", ")));
        }
        out
    }
}

impl std::fmt::Display for CloudType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_with_details() {
        assert_eq!(CloudType::with_oktas("SC", 1).expect("valid").summary(), "Stratocumulus (1/8)");

        let cu = CloudType::new("CU", None, Some("mdt"), Some("OHD-ALQDS"), None).expect("valid");
        assert!(cu.is_overhead());
        assert!(cu.is_all_quadrants());
        assert_eq!(cu.summary(), "mdt Cumulus (ohd-alqds)");

        let ac = CloudType::new("AC", Some(3), None, None, Some("NE")).expect("valid");
        assert_eq!(ac.summary(), "Altocumulus (3/8, moving NE)");
        assert_eq!(ac.oktas_fraction(), Some(0.375));
    }

    #[test]
    fn validation() {
        assert!(CloudType::of("CB").unwrap_err().to_string().contains("Invalid cloud type"));
        assert!(CloudType::with_oktas("ST", 9).unwrap_err().to_string().contains("Oktas must be between 1 and 8"));
        assert!(CloudType::with_location("ST", "DSNT").is_err());
        assert!(CloudType::new("ST", None, Some("HVY"), None, None).is_err());
        assert!(CloudType::new("ST", None, None, None, Some("NNE")).is_err());
        assert!(CloudType::with_location("ci", "tr").expect("valid").is_trace());
    }
}
