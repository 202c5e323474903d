use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

use crate::error::{Result, WeatherError, ensure};

pub const STANDARD_HPA: f64 = 1013.25;
pub const HPA_TO_INHG: f64 = 0.02953;
const INHG_TO_HPA: f64 = 33.8639;

const LOW_HPA: f64 = 1000.0;
const HIGH_HPA: f64 = 1020.0;
const EXTREMELY_LOW_HPA: f64 = 950.0;
const EXTREMELY_HIGH_HPA: f64 = 1040.0;
const RAPID_CHANGE_HPA: f64 = 6.0;

static ALTIMETER_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^A(?P<value>\d{4})$").expect("altimeter pattern must compile"));
static QNH_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Q(?:NH)?(?P<value>\d{3,4})$").expect("QNH pattern must compile"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PressureUnit {
    #[serde(rename = "inHg")]
    InchesHg,
    #[serde(rename = "hPa")]
    Hectopascals,
}

impl PressureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            PressureUnit::InchesHg => "inHg",
            PressureUnit::Hectopascals => "hPa",
        }
    }

    pub const fn all() -> &'static [PressureUnit] {
        &[PressureUnit::InchesHg, PressureUnit::Hectopascals]
    }
}

impl std::fmt::Display for PressureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PressureUnit {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "inhg" => Ok(PressureUnit::InchesHg),
            "hpa" | "mb" => Ok(PressureUnit::Hectopascals),
            _ => Err(WeatherError::validation(format!(
                "Invalid pressure unit '{value}'. Supported units: inHg, hPa."
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pressure {
    value: f64,
    unit: PressureUnit,
}

impl Pressure {
    pub fn new(value: f64, unit: PressureUnit) -> Result<Self> {
        match unit {
            PressureUnit::InchesHg => ensure((25.0..=35.0).contains(&value), || {
                format!("Pressure out of reasonable range (25-35 inHg): {value}")
            })?,
            PressureUnit::Hectopascals => ensure((850.0..=1085.0).contains(&value), || {
                format!("Pressure out of reasonable range (850-1085 hPa): {value}")
            })?,
        }
        Ok(Self { value, unit })
    }

    pub fn inches_hg(value: f64) -> Result<Self> {
        Self::new(value, PressureUnit::InchesHg)
    }

    pub fn hectopascals(value: f64) -> Result<Self> {
        Self::new(value, PressureUnit::Hectopascals)
    }

    /// ISA mean sea-level pressure, 1013.25 hPa.
    pub fn standard() -> Self {
        Self {
            value: STANDARD_HPA,
            unit: PressureUnit::Hectopascals,
        }
    }

    /// `A3015` is 30.15 inHg.
    pub fn from_metar_altimeter(token: &str) -> Result<Self> {
        let caps = ALTIMETER_GROUP
            .captures(token.trim())
            .ok_or_else(|| WeatherError::validation(format!("Invalid METAR altimeter format: {token}")))?;
        let hundredths: f64 = caps["value"]
            .parse()
            .map_err(|_| WeatherError::validation(format!("Invalid METAR altimeter format: {token}")))?;
        Self::inches_hg(hundredths / 100.0)
    }

    /// `Q1013` (or `QNH1013`) is 1013 hPa.
    pub fn from_metar_qnh(token: &str) -> Result<Self> {
        let caps = QNH_GROUP
            .captures(token.trim())
            .ok_or_else(|| WeatherError::validation(format!("Invalid METAR QNH format: {token}")))?;
        let hpa: f64 = caps["value"]
            .parse()
            .map_err(|_| WeatherError::validation(format!("Invalid METAR QNH format: {token}")))?;
        Self::hectopascals(hpa)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> PressureUnit {
        self.unit
    }

    pub fn to_inches_hg(&self) -> f64 {
        match self.unit {
            PressureUnit::InchesHg => self.value,
            PressureUnit::Hectopascals => self.value * HPA_TO_INHG,
        }
    }

    pub fn to_hectopascals(&self) -> f64 {
        match self.unit {
            PressureUnit::Hectopascals => self.value,
            PressureUnit::InchesHg => self.value * INHG_TO_HPA,
        }
    }

    pub fn to_millibars(&self) -> f64 {
        self.to_hectopascals()
    }

    pub fn deviation_from_standard(&self) -> f64 {
        self.to_hectopascals() - STANDARD_HPA
    }

    pub fn is_below_standard(&self) -> bool {
        self.to_hectopascals() < STANDARD_HPA
    }

    pub fn is_above_standard(&self) -> bool {
        self.to_hectopascals() > STANDARD_HPA
    }

    pub fn is_low_pressure(&self) -> bool {
        self.to_hectopascals() < LOW_HPA
    }

    pub fn is_high_pressure(&self) -> bool {
        self.to_hectopascals() > HIGH_HPA
    }

    pub fn is_extremely_low(&self) -> bool {
        self.to_hectopascals() < EXTREMELY_LOW_HPA
    }

    pub fn is_extremely_high(&self) -> bool {
        self.to_hectopascals() > EXTREMELY_HIGH_HPA
    }

    /// Altimeter setting in inHg for a field at `elevation_feet`.
    pub fn altimeter_setting(&self, elevation_feet: f64) -> f64 {
        self.to_inches_hg() + elevation_feet / 1000.0
    }

    pub fn pressure_altitude_feet(&self) -> f64 {
        145_366.45 * (1.0 - (self.to_hectopascals() / STANDARD_HPA).powf(0.190_284))
    }

    /// Pressure altitude of a field at `elevation_feet` when this is its altimeter setting.
    pub fn pressure_altitude_at(&self, elevation_feet: f64) -> f64 {
        elevation_feet + self.pressure_altitude_feet()
    }

    /// Density altitude in feet for an outside air temperature in °C.
    pub fn density_altitude(&self, outside_air_celsius: f64) -> f64 {
        self.density_altitude_at(0.0, outside_air_celsius)
    }

    pub fn density_altitude_at(&self, elevation_feet: f64, outside_air_celsius: f64) -> f64 {
        let pressure_altitude = self.pressure_altitude_at(elevation_feet);
        let isa_celsius = 15.0 - 2.0 * pressure_altitude / 1000.0;
        pressure_altitude + 120.0 * (outside_air_celsius - isa_celsius)
    }

    /// Change in hPa since `previous` (positive when rising).
    pub fn pressure_tendency(&self, previous: &Pressure) -> f64 {
        self.to_hectopascals() - previous.to_hectopascals()
    }

    pub fn is_rapid_pressure_change(&self, previous: &Pressure) -> bool {
        self.pressure_tendency(previous).abs() >= RAPID_CHANGE_HPA
    }

    pub fn tendency_description(&self, previous: &Pressure) -> &'static str {
        let change = self.pressure_tendency(previous);
        match change {
            c if c >= 3.0 => "Rapidly rising",
            c if c <= -3.0 => "Rapidly falling",
            c if c >= 1.0 => "Rising",
            c if c <= -1.0 => "Falling",
            _ => "Steady",
        }
    }

    /// Rule-of-thumb outlook from the pressure level and, when known, its trend.
    pub fn weather_condition(&self, previous: Option<&Pressure>) -> &'static str {
        let hpa = self.to_hectopascals();
        let Some(previous) = previous else {
            return if hpa < 980.0 {
                "Stormy conditions likely"
            } else if hpa < LOW_HPA {
                "Unsettled weather likely"
            } else if hpa > 1030.0 {
                "Fair weather likely"
            } else {
                "Generally fair conditions"
            };
        };

        let change = self.pressure_tendency(previous);
        if hpa < LOW_HPA {
            if change < 0.0 {
                return "Deteriorating weather, storm approaching";
            }
            if change > 0.0 {
                return "Improving weather, storm clearing";
            }
        } else if hpa > HIGH_HPA {
            if change > 0.0 {
                return "Fair weather, becoming more settled";
            }
            if change < 0.0 {
                return "Fair weather, may deteriorate";
            }
        }

        if change <= -3.0 {
            "Weather deteriorating"
        } else if change >= 3.0 {
            "Weather improving"
        } else {
            "Weather conditions stable"
        }
    }

    pub fn formatted_value(&self) -> String {
        match self.unit {
            PressureUnit::InchesHg => format!("{:.2} {}", self.value, self.unit),
            PressureUnit::Hectopascals => format!("{:.0} {}", self.value, self.unit),
        }
    }

    pub fn to_metar_altimeter(&self) -> String {
        format!("A{:04}", (self.to_inches_hg() * 100.0).round() as i64)
    }

    pub fn to_metar_qnh(&self) -> String {
        format!("Q{:04}", self.to_hectopascals().round() as i64)
    }

    pub fn summary(&self) -> String {
        format!(
            "{:.2} inHg ({:.1} hPa)",
            self.to_inches_hg(),
            self.to_hectopascals()
        )
    }
}

impl std::fmt::Display for Pressure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.formatted_value())
    }
}
