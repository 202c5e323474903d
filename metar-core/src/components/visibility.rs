use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

use crate::error::{Result, WeatherError, ensure};

pub const METERS_PER_STATUTE_MILE: f64 = 1609.34;
const KM_TO_SM: f64 = 0.621371;
const VFR_MINIMUM_SM: f64 = 3.0;
const UNLIMITED_SM: f64 = 6.0;
const UNLIMITED_KM: f64 = 10.0;

static STATUTE_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<mod>[MP])?(?P<dist>\d+\s+\d/\d{1,2}|\d{1,2}/\d{1,2}|\d+)(?P<unit>SM|KM)$")
        .expect("statute visibility pattern must compile")
});
static METRIC_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<mod>[MP])?(?P<meters>\d{4})(?P<ndv>NDV)?$").expect("metric visibility pattern must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisibilityUnit {
    #[serde(rename = "SM")]
    StatuteMiles,
    #[serde(rename = "M")]
    Meters,
    #[serde(rename = "KM")]
    Kilometers,
}

impl VisibilityUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisibilityUnit::StatuteMiles => "SM",
            VisibilityUnit::Meters => "M",
            VisibilityUnit::Kilometers => "KM",
        }
    }

    pub const fn all() -> &'static [VisibilityUnit] {
        &[VisibilityUnit::StatuteMiles, VisibilityUnit::Meters, VisibilityUnit::Kilometers]
    }
}

impl std::fmt::Display for VisibilityUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for VisibilityUnit {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self> {
        match value.trim().to_uppercase().as_str() {
            "SM" => Ok(VisibilityUnit::StatuteMiles),
            "M" => Ok(VisibilityUnit::Meters),
            "KM" => Ok(VisibilityUnit::Kilometers),
            _ => Err(WeatherError::validation(format!(
                "Invalid visibility unit '{value}'. Supported units: SM, M, KM."
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialCondition {
    #[serde(rename = "CAVOK")]
    Cavok,
    /// No directional variation available.
    #[serde(rename = "NDV")]
    Ndv,
}

impl SpecialCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialCondition::Cavok => "CAVOK",
            SpecialCondition::Ndv => "NDV",
        }
    }
}

impl std::fmt::Display for SpecialCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SpecialCondition {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self> {
        match value.trim().to_uppercase().as_str() {
            "CAVOK" => Ok(SpecialCondition::Cavok),
            "NDV" => Ok(SpecialCondition::Ndv),
            _ => Err(WeatherError::validation(format!(
                "Invalid visibility special condition '{value}'. Supported: CAVOK, NDV."
            ))),
        }
    }
}

/// Prevailing visibility as a distance, a `CAVOK`/`NDV` condition, or both
/// (`9999NDV`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visibility {
    distance: Option<f64>,
    unit: Option<VisibilityUnit>,
    less_than: bool,
    greater_than: bool,
    special_condition: Option<SpecialCondition>,
}

impl Visibility {
    pub fn new(
        distance: Option<f64>,
        unit: Option<VisibilityUnit>,
        less_than: bool,
        greater_than: bool,
        special_condition: Option<SpecialCondition>,
    ) -> Result<Self> {
        if let Some(d) = distance {
            ensure(d >= 0.0, || format!("Visibility distance cannot be negative: {d}"))?;
            ensure(unit.is_some(), || {
                "Visibility unit must be specified when distance is provided".into()
            })?;
        }
        ensure(distance.is_some() || special_condition.is_some(), || {
            "Visibility must have either distance or special condition".into()
        })?;
        ensure(!(less_than && greater_than), || {
            "Visibility cannot be both less than and greater than".into()
        })?;

        Ok(Self {
            distance,
            unit,
            less_than,
            greater_than,
            special_condition,
        })
    }

    pub fn cavok() -> Self {
        Self {
            distance: None,
            unit: None,
            less_than: false,
            greater_than: false,
            special_condition: Some(SpecialCondition::Cavok),
        }
    }

    pub fn statute_miles(miles: f64) -> Result<Self> {
        Self::new(Some(miles), Some(VisibilityUnit::StatuteMiles), false, false, None)
    }

    pub fn meters(meters: f64) -> Result<Self> {
        Self::new(Some(meters), Some(VisibilityUnit::Meters), false, false, None)
    }

    pub fn kilometers(km: f64) -> Result<Self> {
        Self::new(Some(km), Some(VisibilityUnit::Kilometers), false, false, None)
    }

    /// Parse `10SM`, `1 1/2SM`, `M1/4SM`, `P6SM`, `9999`, `0800NDV`, `CAVOK` or `NDV`.
    pub fn parse(token: &str) -> Result<Self> {
        let token = token.trim().to_uppercase();
        if let Ok(special) = SpecialCondition::try_from(token.as_str()) {
            return Self::new(None, None, false, false, Some(special));
        }

        if let Some(caps) = STATUTE_GROUP.captures(&token) {
            let distance = parse_fractional(&caps["dist"])?;
            let unit = VisibilityUnit::try_from(&caps["unit"])?;
            let modifier = caps.name("mod").map(|m| m.as_str());
            return Self::new(
                Some(distance),
                Some(unit),
                modifier == Some("M"),
                modifier == Some("P"),
                None,
            );
        }

        if let Some(caps) = METRIC_GROUP.captures(&token) {
            let meters: f64 = caps["meters"]
                .parse()
                .map_err(|_| WeatherError::parse("visibility", token.clone()))?;
            let modifier = caps.name("mod").map(|m| m.as_str());
            let special = caps.name("ndv").map(|_| SpecialCondition::Ndv);
            // 9999 is the coded ceiling for "10 km or more"
            let greater_than = modifier == Some("P") || (meters >= 9999.0 && modifier.is_none());
            return Self::new(
                Some(meters),
                Some(VisibilityUnit::Meters),
                modifier == Some("M"),
                greater_than,
                special,
            );
        }

        Err(WeatherError::parse("visibility", format!("unrecognized token '{token}'")))
    }

    pub fn distance(&self) -> Option<f64> {
        self.distance
    }

    pub fn unit(&self) -> Option<VisibilityUnit> {
        self.unit
    }

    pub fn is_less_than(&self) -> bool {
        self.less_than
    }

    pub fn is_greater_than(&self) -> bool {
        self.greater_than
    }

    pub fn special_condition(&self) -> Option<SpecialCondition> {
        self.special_condition
    }

    pub fn is_special_condition(&self) -> bool {
        self.special_condition.is_some()
    }

    pub fn is_cavok(&self) -> bool {
        self.special_condition == Some(SpecialCondition::Cavok)
    }

    pub fn to_meters(&self) -> Option<f64> {
        let d = self.distance?;
        Some(match self.unit? {
            VisibilityUnit::Meters => d,
            VisibilityUnit::Kilometers => d * 1000.0,
            VisibilityUnit::StatuteMiles => d * METERS_PER_STATUTE_MILE,
        })
    }

    pub fn to_statute_miles(&self) -> Option<f64> {
        let d = self.distance?;
        Some(match self.unit? {
            VisibilityUnit::StatuteMiles => d,
            VisibilityUnit::Meters => d / METERS_PER_STATUTE_MILE,
            VisibilityUnit::Kilometers => d * KM_TO_SM,
        })
    }

    pub fn to_kilometers(&self) -> Option<f64> {
        self.to_meters().map(|m| m / 1000.0)
    }

    /// 3 SM or more; CAVOK always qualifies.
    pub fn is_vfr(&self) -> bool {
        self.is_cavok() || self.to_statute_miles().is_some_and(|sm| sm >= VFR_MINIMUM_SM)
    }

    /// Below 3 SM; CAVOK never qualifies.
    pub fn is_ifr(&self) -> bool {
        !self.is_cavok() && self.to_statute_miles().is_some_and(|sm| sm < VFR_MINIMUM_SM)
    }

    pub fn is_unlimited(&self) -> bool {
        if self.is_cavok() {
            return true;
        }
        let by_miles = self.to_statute_miles().is_some_and(|sm| sm >= UNLIMITED_SM);
        let by_km = self.to_kilometers().is_some_and(|km| km >= UNLIMITED_KM);
        let coded_max = self.greater_than && self.to_meters().is_some_and(|m| m >= 9999.0);
        by_miles || by_km || coded_max
    }

    pub fn summary(&self) -> String {
        if self.is_cavok() {
            return "CAVOK (ceiling and visibility OK)".to_string();
        }
        let mut out = String::new();
        if let (Some(d), Some(unit)) = (self.distance, self.unit) {
            if self.less_than {
                out.push_str("Less than ");
            } else if self.greater_than {
                out.push_str("Greater than ");
            }
            out.push_str(&format!("{} {unit}", format_distance(d)));
        }
        if self.special_condition == Some(SpecialCondition::Ndv) {
            if out.is_empty() {
                out.push_str("No directional variation");
            } else {
                out.push_str(" (no directional variation)");
            }
        }
        out
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Read `10`, `1/2` or `1 1/2` as miles.
pub fn parse_fractional(text: &str) -> Result<f64> {
    let bad = || WeatherError::parse("visibility", format!("invalid distance '{text}'"));
    let mut total = 0.0;
    for part in text.split_whitespace() {
        total += match part.split_once('/') {
            Some((num, den)) => {
                let num: f64 = num.parse().map_err(|_| bad())?;
                let den: f64 = den.parse().map_err(|_| bad())?;
                if den == 0.0 {
                    return Err(bad());
                }
                num / den
            }
            None => part.parse::<f64>().map_err(|_| bad())?,
        };
    }
    Ok(total)
}

/// `1.5` prints as `1 1/2`, `0.25` as `1/4`, whole numbers without decimals.
pub fn format_distance(value: f64) -> String {
    const FRACTIONS: [(f64, &str); 7] = [
        (0.125, "1/8"),
        (0.25, "1/4"),
        (0.375, "3/8"),
        (0.5, "1/2"),
        (0.625, "5/8"),
        (0.75, "3/4"),
        (0.875, "7/8"),
    ];
    let whole = value.trunc();
    let fraction = value - whole;
    if fraction.abs() < 1e-9 {
        return format!("{whole:.0}");
    }
    match FRACTIONS.iter().find(|(f, _)| (fraction - f).abs() < 1e-6) {
        Some((_, text)) if whole == 0.0 => (*text).to_string(),
        Some((_, text)) => format!("{whole:.0} {text}"),
        None => format!("{value:.2}"),
    }
}
