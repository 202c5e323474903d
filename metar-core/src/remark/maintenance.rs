use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

use crate::error::{Result, WeatherError};

/// Sensor-status indicators reported by automated stations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaintenanceIndicatorType {
    #[serde(rename = "RVRNO")]
    RvrNo,
    #[serde(rename = "PWINO")]
    PwiNo,
    #[serde(rename = "PNO")]
    PNo,
    #[serde(rename = "FZRANO")]
    FzraNo,
    #[serde(rename = "TSNO")]
    TsNo,
    #[serde(rename = "VISNO")]
    VisNo,
    #[serde(rename = "CHINO")]
    ChiNo,
    #[serde(rename = "$")]
    MaintenanceCheck,
}

impl MaintenanceIndicatorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceIndicatorType::RvrNo => "RVRNO",
            MaintenanceIndicatorType::PwiNo => "PWINO",
            MaintenanceIndicatorType::PNo => "PNO",
            MaintenanceIndicatorType::FzraNo => "FZRANO",
            MaintenanceIndicatorType::TsNo => "TSNO",
            MaintenanceIndicatorType::VisNo => "VISNO",
            MaintenanceIndicatorType::ChiNo => "CHINO",
            MaintenanceIndicatorType::MaintenanceCheck => "$",
        }
    }

    pub const fn all() -> &'static [MaintenanceIndicatorType] {
        &[
            MaintenanceIndicatorType::RvrNo,
            MaintenanceIndicatorType::PwiNo,
            MaintenanceIndicatorType::PNo,
            MaintenanceIndicatorType::FzraNo,
            MaintenanceIndicatorType::TsNo,
            MaintenanceIndicatorType::VisNo,
            MaintenanceIndicatorType::ChiNo,
            MaintenanceIndicatorType::MaintenanceCheck,
        ]
    }

    pub fn description(&self) -> &'static str {
        match self {
            MaintenanceIndicatorType::RvrNo => "Runway Visual Range not available",
            MaintenanceIndicatorType::PwiNo => "Precipitation identifier information not available",
            MaintenanceIndicatorType::PNo => "Precipitation amount not available",
            MaintenanceIndicatorType::FzraNo => "Freezing rain information not available",
            MaintenanceIndicatorType::TsNo => "Thunderstorm information not available",
            MaintenanceIndicatorType::VisNo => "Visibility not available",
            MaintenanceIndicatorType::ChiNo => "Cloud height indicator not available",
            MaintenanceIndicatorType::MaintenanceCheck => "Station requires maintenance",
        }
    }
}

impl std::fmt::Display for MaintenanceIndicatorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MaintenanceIndicatorType {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self> {
        let code = value.trim().to_uppercase();
        if code.is_empty() {
            return Err(WeatherError::validation("Maintenance indicator type cannot be blank"));
        }
        MaintenanceIndicatorType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == code)
            .ok_or_else(|| WeatherError::validation(format!("Invalid maintenance indicator type: {value}")))
    }
}

/// One indicator, optionally tied to a location (`VISNO RWY06`, `CHINO NE`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomatedMaintenanceIndicator {
    indicator_type: MaintenanceIndicatorType,
    location: Option<String>,
}

impl AutomatedMaintenanceIndicator {
    pub fn new(indicator_type: MaintenanceIndicatorType, location: Option<&str>) -> Self {
        Self {
            indicator_type,
            location: location.map(str::trim).filter(|l| !l.is_empty()).map(str::to_uppercase),
        }
    }

    pub fn of(code: &str, location: Option<&str>) -> Result<Self> {
        Ok(Self::new(MaintenanceIndicatorType::try_from(code)?, location))
    }

    pub fn maintenance_check() -> Self {
        Self::new(MaintenanceIndicatorType::MaintenanceCheck, None)
    }

    pub fn indicator_type(&self) -> MaintenanceIndicatorType {
        self.indicator_type
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn is_rvr_not_available(&self) -> bool {
        self.indicator_type == MaintenanceIndicatorType::RvrNo
    }

    pub fn is_precipitation_identifier_not_available(&self) -> bool {
        self.indicator_type == MaintenanceIndicatorType::PwiNo
    }

    pub fn is_precipitation_amount_not_available(&self) -> bool {
        self.indicator_type == MaintenanceIndicatorType::PNo
    }

    pub fn is_freezing_rain_not_available(&self) -> bool {
        self.indicator_type == MaintenanceIndicatorType::FzraNo
    }

    pub fn is_thunderstorm_not_available(&self) -> bool {
        self.indicator_type == MaintenanceIndicatorType::TsNo
    }

    pub fn is_visibility_not_available(&self) -> bool {
        self.indicator_type == MaintenanceIndicatorType::VisNo
    }

    pub fn is_ceiling_height_not_available(&self) -> bool {
        self.indicator_type == MaintenanceIndicatorType::ChiNo
    }

    pub fn is_maintenance_check(&self) -> bool {
        self.indicator_type == MaintenanceIndicatorType::MaintenanceCheck
    }

    pub fn description(&self) -> String {
        match &self.location {
            Some(loc) => format!("{} at {loc}", self.indicator_type.description()),
            None => self.indicator_type.description().to_string(),
        }
    }
}

impl std::fmt::Display for AutomatedMaintenanceIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptions_with_location() {
        let vis = AutomatedMaintenanceIndicator::of("visno", Some("rwy06")).expect("valid");
        assert!(vis.is_visibility_not_available());
        assert_eq!(vis.description(), "Visibility not available at RWY06");

        let check = AutomatedMaintenanceIndicator::maintenance_check();
        assert!(check.is_maintenance_check());
        assert_eq!(check.to_string(), "Station requires maintenance");
    }

    #[test]
    fn rejects_unknown_type() {
        let err = AutomatedMaintenanceIndicator::of("XYZNO", None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid maintenance indicator type: XYZNO");
        let err = MaintenanceIndicatorType::try_from(" ").unwrap_err();
        assert!(err.to_string().contains("cannot be blank"));
    }

    #[test]
    fn every_type_roundtrips() {
        for t in MaintenanceIndicatorType::all() {
            assert_eq!(MaintenanceIndicatorType::try_from(t.as_str()).expect("roundtrip"), *t);
        }
    }
}
