use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

use crate::error::{Result, WeatherError};

/// `AO1` / `AO2` automated station classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AutomatedStationType {
    Ao1,
    Ao2,
}

impl AutomatedStationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutomatedStationType::Ao1 => "AO1",
            AutomatedStationType::Ao2 => "AO2",
        }
    }

    pub const fn all() -> &'static [AutomatedStationType] {
        &[AutomatedStationType::Ao1, AutomatedStationType::Ao2]
    }

    pub fn from_digit(digit: u8) -> Result<Self> {
        match digit {
            1 => Ok(AutomatedStationType::Ao1),
            2 => Ok(AutomatedStationType::Ao2),
            other => Err(WeatherError::validation(format!(
                "Automated station type must be 1 or 2: {other}"
            ))),
        }
    }

    /// Also accepts the zero-for-O typo (`A01`, `A02`) seen in real reports.
    pub fn from_code(code: &str) -> Result<Self> {
        match code.trim().to_uppercase().as_str() {
            "AO1" | "A01" => Ok(AutomatedStationType::Ao1),
            "AO2" | "A02" => Ok(AutomatedStationType::Ao2),
            _ => Err(WeatherError::validation(format!(
                "Unknown automated station type: {code}"
            ))),
        }
    }

    pub fn has_precipitation_discriminator(&self) -> bool {
        matches!(self, AutomatedStationType::Ao2)
    }

    pub fn description(&self) -> &'static str {
        match self {
            AutomatedStationType::Ao1 => "Automated station without precipitation discriminator",
            AutomatedStationType::Ao2 => "Automated station with precipitation discriminator",
        }
    }
}

impl std::fmt::Display for AutomatedStationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AutomatedStationType {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self> {
        Self::from_code(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_digits() {
        assert_eq!(AutomatedStationType::from_digit(2).expect("valid"), AutomatedStationType::Ao2);
        assert_eq!(AutomatedStationType::from_code("a01").expect("valid"), AutomatedStationType::Ao1);
        assert!(AutomatedStationType::Ao2.has_precipitation_discriminator());
        assert!(!AutomatedStationType::Ao1.has_precipitation_discriminator());
        assert!(AutomatedStationType::from_digit(3).is_err());
        assert!(AutomatedStationType::try_from("AO3").is_err());
    }
}
