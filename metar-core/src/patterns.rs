//! Pre-compiled token grammars shared by every value object.
//!
//! All patterns are anchored at both ends and case-sensitive; callers
//! uppercase their input first. Matching never fails, it only answers yes or no.

use once_cell::sync::Lazy;
use regex::Regex;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in token pattern must compile")
}

pub static RUNWAY_IDENTIFIER: Lazy<Regex> = Lazy::new(|| compile(r"^(0[1-9]|[12]\d|3[0-6])[LCR]?$"));
pub static CLOUD_TYPE: Lazy<Regex> =
    Lazy::new(|| compile(r"^(CB|TCU|CU|SC|ST|NS|AS|AC|CI|CC|CS)$"));
pub static WIND_UNIT: Lazy<Regex> = Lazy::new(|| compile(r"^(KT|MPS|KMH)$"));
pub static VISIBILITY_UNIT: Lazy<Regex> = Lazy::new(|| compile(r"^(SM|M|KM)$"));
pub static VISIBILITY_SPECIAL_CONDITION: Lazy<Regex> = Lazy::new(|| compile(r"^(CAVOK|NDV)$"));
pub static TEMPERATURE_VALUE: Lazy<Regex> = Lazy::new(|| compile(r"^[M-]?\d{1,2}$"));
pub static WIND_DIRECTION: Lazy<Regex> =
    Lazy::new(|| compile(r"^(0\d{2}|[12]\d{2}|3[0-5]\d|360|VRB)$"));
pub static WIND_SPEED: Lazy<Regex> = Lazy::new(|| compile(r"^\d{2,3}$"));
pub static ALTITUDE_HUNDREDS_FEET: Lazy<Regex> = Lazy::new(|| compile(r"^\d{3}$"));
pub static PRESSURE_VALUE: Lazy<Regex> = Lazy::new(|| compile(r"^\d{3,4}$"));

/// Named handle over the library, handy for table-driven validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPattern {
    RunwayIdentifier,
    CloudType,
    WindUnit,
    VisibilityUnit,
    VisibilitySpecialCondition,
    TemperatureValue,
    WindDirection,
    WindSpeed,
    AltitudeHundredsFeet,
    PressureValue,
}

impl TokenPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPattern::RunwayIdentifier => "runway identifier",
            TokenPattern::CloudType => "cloud type",
            TokenPattern::WindUnit => "wind unit",
            TokenPattern::VisibilityUnit => "visibility unit",
            TokenPattern::VisibilitySpecialCondition => "visibility special condition",
            TokenPattern::TemperatureValue => "temperature value",
            TokenPattern::WindDirection => "wind direction",
            TokenPattern::WindSpeed => "wind speed",
            TokenPattern::AltitudeHundredsFeet => "altitude in hundreds of feet",
            TokenPattern::PressureValue => "pressure value",
        }
    }

    pub const fn all() -> &'static [TokenPattern] {
        &[
            TokenPattern::RunwayIdentifier,
            TokenPattern::CloudType,
            TokenPattern::WindUnit,
            TokenPattern::VisibilityUnit,
            TokenPattern::VisibilitySpecialCondition,
            TokenPattern::TemperatureValue,
            TokenPattern::WindDirection,
            TokenPattern::WindSpeed,
            TokenPattern::AltitudeHundredsFeet,
            TokenPattern::PressureValue,
        ]
    }

    pub fn regex(&self) -> &'static Regex {
        match self {
            TokenPattern::RunwayIdentifier => &*RUNWAY_IDENTIFIER,
            TokenPattern::CloudType => &*CLOUD_TYPE,
            TokenPattern::WindUnit => &*WIND_UNIT,
            TokenPattern::VisibilityUnit => &*VISIBILITY_UNIT,
            TokenPattern::VisibilitySpecialCondition => &*VISIBILITY_SPECIAL_CONDITION,
            TokenPattern::TemperatureValue => &*TEMPERATURE_VALUE,
            TokenPattern::WindDirection => &*WIND_DIRECTION,
            TokenPattern::WindSpeed => &*WIND_SPEED,
            TokenPattern::AltitudeHundredsFeet => &*ALTITUDE_HUNDREDS_FEET,
            TokenPattern::PressureValue => &*PRESSURE_VALUE,
        }
    }

    pub fn matches(&self, token: &str) -> bool {
        self.regex().is_match(token)
    }
}

impl std::fmt::Display for TokenPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_runway_identifier(token: &str) -> bool {
    RUNWAY_IDENTIFIER.is_match(token)
}

pub fn is_cloud_type(token: &str) -> bool {
    CLOUD_TYPE.is_match(token)
}

pub fn is_wind_unit(token: &str) -> bool {
    WIND_UNIT.is_match(token)
}

pub fn is_visibility_unit(token: &str) -> bool {
    VISIBILITY_UNIT.is_match(token)
}
