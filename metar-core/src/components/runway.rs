use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

use crate::{
    error::{Result, WeatherError, ensure},
    patterns,
};

const FEET_PER_STATUTE_MILE: f64 = 5280.0;
const FEET_TO_METERS: f64 = 0.3048;

static RVR_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^R(?P<runway>\d{2}[LCR]?)/(?:(?P<clrd>CLRD)(?:\d{2})?|(?P<prefix>[PM])?(?P<low>\d{4})(?:V(?P<hprefix>[PM])?(?P<high>\d{4}))?(?P<ft>FT)?(?:/?(?P<trend>[DNU]))?)$",
    )
    .expect("RVR pattern must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RvrPrefix {
    /// `P`: beyond the top of the instrument range.
    #[serde(rename = "P")]
    GreaterThan,
    /// `M`: below the bottom of the instrument range.
    #[serde(rename = "M")]
    LessThan,
}

impl RvrPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            RvrPrefix::GreaterThan => "P",
            RvrPrefix::LessThan => "M",
        }
    }
}

impl TryFrom<&str> for RvrPrefix {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self> {
        match value.trim().to_uppercase().as_str() {
            "P" => Ok(RvrPrefix::GreaterThan),
            "M" => Ok(RvrPrefix::LessThan),
            _ => Err(WeatherError::validation(format!(
                "Invalid prefix: {value} (valid values: P, M)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RvrTrend {
    #[serde(rename = "D")]
    Decreasing,
    #[serde(rename = "N")]
    NoChange,
    #[serde(rename = "U")]
    Increasing,
}

impl RvrTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            RvrTrend::Decreasing => "D",
            RvrTrend::NoChange => "N",
            RvrTrend::Increasing => "U",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RvrTrend::Decreasing => "Decreasing",
            RvrTrend::NoChange => "No Change",
            RvrTrend::Increasing => "Increasing",
        }
    }
}

impl TryFrom<&str> for RvrTrend {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self> {
        match value.trim().to_uppercase().as_str() {
            "D" => Ok(RvrTrend::Decreasing),
            "N" => Ok(RvrTrend::NoChange),
            "U" => Ok(RvrTrend::Increasing),
            _ => Err(WeatherError::validation(format!(
                "Invalid trend: {value} (valid values: D, N, U)"
            ))),
        }
    }
}

/// Runway visual range for one runway, either a single value, a variable
/// range, or `CLRD` once the runway has cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunwayVisualRange {
    runway: String,
    visual_range_feet: Option<i32>,
    variable_low: Option<i32>,
    variable_high: Option<i32>,
    prefix: Option<RvrPrefix>,
    trend: Option<RvrTrend>,
    cleared: bool,
}

impl RunwayVisualRange {
    pub fn new(
        runway: &str,
        visual_range_feet: Option<i32>,
        variable_low: Option<i32>,
        variable_high: Option<i32>,
        prefix: Option<RvrPrefix>,
        trend: Option<RvrTrend>,
        cleared: bool,
    ) -> Result<Self> {
        let runway = runway.trim().to_uppercase();
        ensure(patterns::is_runway_identifier(&runway), || {
            format!(
                "Invalid runway identifier format: {runway} (expected format: 01-36 optionally followed by L, C, or R)"
            )
        })?;

        if cleared {
            ensure(
                visual_range_feet.is_none() && variable_low.is_none() && variable_high.is_none(),
                || "CLRD runway cannot have visual range values".into(),
            )?;
            ensure(prefix.is_none(), || "CLRD runway cannot have prefix (M/P)".into())?;
        } else {
            ensure(
                visual_range_feet.is_some() || (variable_low.is_some() && variable_high.is_some()),
                || "Must have either visualRangeFeet or both variableLow and variableHigh".into(),
            )?;
            if let Some(v) = visual_range_feet {
                ensure(v >= 0, || format!("Visual range cannot be negative: {v}"))?;
            }
            match (variable_low, variable_high) {
                (None, None) => {}
                (Some(low), Some(high)) => {
                    ensure(low >= 0, || format!("Variable low cannot be negative: {low}"))?;
                    ensure(high >= 0, || format!("Variable high cannot be negative: {high}"))?;
                    ensure(low <= high, || {
                        format!("Variable low ({low}) must be less than variable high ({high})")
                    })?;
                }
                _ => {
                    return Err(WeatherError::validation(
                        "Both variableLow and variableHigh must be provided together",
                    ));
                }
            }
        }

        Ok(Self {
            runway,
            visual_range_feet,
            variable_low,
            variable_high,
            prefix,
            trend,
            cleared,
        })
    }

    pub fn cleared(runway: &str) -> Result<Self> {
        Self::new(runway, None, None, None, None, None, true)
    }

    pub fn of(runway: &str, visual_range_feet: i32) -> Result<Self> {
        Self::new(runway, Some(visual_range_feet), None, None, None, None, false)
    }

    pub fn variable(runway: &str, low: i32, high: i32) -> Result<Self> {
        Self::new(runway, None, Some(low), Some(high), None, None, false)
    }

    /// Parse `R04L/2200FT`, `R22R/P6000FT/U`, `R09/1000V2400FT/D` or `R22R/CLRD`.
    /// Groups without `FT` are in meters (`R27L/0550`) and are stored converted to feet.
    pub fn parse(token: &str) -> Result<Self> {
        let token = token.trim().to_uppercase();
        let caps = RVR_GROUP
            .captures(&token)
            .ok_or_else(|| WeatherError::parse("runway visual range", format!("unrecognized token '{token}'")))?;
        let runway = &caps["runway"];

        if caps.name("clrd").is_some() {
            return Self::cleared(runway);
        }

        let in_feet = caps.name("ft").is_some();
        let number = |name: &str| -> Result<Option<i32>> {
            caps.name(name)
                .map(|m| {
                    m.as_str()
                        .parse::<i32>()
                        .map(|value| if in_feet { value } else { meters_to_feet(value) })
                        .map_err(|_| WeatherError::parse("runway visual range", m.as_str()))
                })
                .transpose()
        };
        let low = number("low")?;
        let high = number("high")?;
        let prefix = caps
            .name("prefix")
            .or_else(|| caps.name("hprefix"))
            .map(|m| RvrPrefix::try_from(m.as_str()))
            .transpose()?;
        let trend = caps.name("trend").map(|m| RvrTrend::try_from(m.as_str())).transpose()?;

        match high {
            Some(high) => Self::new(runway, None, low, Some(high), prefix, trend, false),
            None => Self::new(runway, low, None, None, prefix, trend, false),
        }
    }

    pub fn runway(&self) -> &str {
        &self.runway
    }

    pub fn visual_range_feet(&self) -> Option<i32> {
        self.visual_range_feet
    }

    pub fn variable_low(&self) -> Option<i32> {
        self.variable_low
    }

    pub fn variable_high(&self) -> Option<i32> {
        self.variable_high
    }

    pub fn prefix(&self) -> Option<RvrPrefix> {
        self.prefix
    }

    pub fn trend(&self) -> Option<RvrTrend> {
        self.trend
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    pub fn is_variable(&self) -> bool {
        !self.cleared && self.variable_low.is_some() && self.variable_high.is_some()
    }

    pub fn is_greater_than(&self) -> bool {
        !self.cleared && self.prefix == Some(RvrPrefix::GreaterThan)
    }

    pub fn is_less_than(&self) -> bool {
        !self.cleared && self.prefix == Some(RvrPrefix::LessThan)
    }

    pub fn trend_description(&self) -> &'static str {
        if self.cleared {
            return "Cleared";
        }
        self.trend.map(|t| t.description()).unwrap_or("Unknown")
    }

    /// Representative range in feet: the value itself or the midpoint of a variable range.
    pub fn representative_feet(&self) -> Option<f64> {
        if self.cleared {
            return None;
        }
        match (self.variable_low, self.variable_high) {
            (Some(low), Some(high)) => Some(f64::from(low + high) / 2.0),
            _ => self.visual_range_feet.map(f64::from),
        }
    }

    pub fn statute_miles(&self) -> f64 {
        self.representative_feet().map(|ft| ft / FEET_PER_STATUTE_MILE).unwrap_or(0.0)
    }

    pub fn meters(&self) -> f64 {
        self.representative_feet().map(|ft| ft * FEET_TO_METERS).unwrap_or(0.0)
    }

    pub fn summary(&self) -> String {
        let mut out = format!("Runway {}: ", self.runway);
        if self.cleared {
            out.push_str("CLEARED (conditions improved)");
            return out;
        }
        if self.is_greater_than() {
            out.push_str("Greater than ");
        } else if self.is_less_than() {
            out.push_str("Less than ");
        }
        match (self.variable_low, self.variable_high, self.visual_range_feet) {
            (Some(low), Some(high), _) => out.push_str(&format!("{low} to {high} feet")),
            (_, _, Some(value)) => out.push_str(&format!("{value} feet")),
            _ => {}
        }
        if let Some(trend) = self.trend {
            out.push_str(&format!(", {}", trend.description()));
        }
        out
    }
}

impl std::fmt::Display for RunwayVisualRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

fn meters_to_feet(meters: i32) -> i32 {
    (f64::from(meters) / FEET_TO_METERS).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleared_runway_has_no_values() {
        let rvr = RunwayVisualRange::cleared("22R").expect("valid");
        assert!(rvr.is_cleared());
        assert_eq!(rvr.visual_range_feet(), None);
        assert_eq!(rvr.variable_low(), None);
        assert_eq!(rvr.variable_high(), None);
        assert!(rvr.summary().contains("CLEARED"));
        assert_eq!(rvr.summary(), "Runway 22R: CLEARED (conditions improved)");
        assert_eq!(rvr.trend_description(), "Cleared");
        assert_eq!(rvr.meters(), 0.0);
    }

    #[test]
    fn single_value_summary() {
        let rvr = RunwayVisualRange::of("04L", 2200).expect("valid");
        assert!(rvr.summary().contains("2200 feet"));
        assert_eq!(rvr.summary(), "Runway 04L: 2200 feet");
        assert_eq!(rvr.trend_description(), "Unknown");
    }

    #[test]
    fn parses_prefix_and_trend() {
        let rvr = RunwayVisualRange::parse("R22R/P6000FT/U").expect("valid");
        assert!(rvr.is_greater_than());
        assert_eq!(rvr.trend(), Some(RvrTrend::Increasing));
        assert_eq!(rvr.summary(), "Runway 22R: Greater than 6000 feet, Increasing");

        let low = RunwayVisualRange::parse("R09/M0600FT").expect("valid");
        assert!(low.is_less_than());
        assert_eq!(low.visual_range_feet(), Some(600));
    }

    #[test]
    fn parses_variable_range() {
        let rvr = RunwayVisualRange::parse("R09/1000V2400FT/D").expect("valid");
        assert!(rvr.is_variable());
        assert_eq!(rvr.variable_low(), Some(1000));
        assert_eq!(rvr.variable_high(), Some(2400));
        assert_eq!(rvr.summary(), "Runway 09: 1000 to 2400 feet, Decreasing");
        assert!((rvr.meters() - 1700.0 * 0.3048).abs() < 1e-9);
        assert!((rvr.statute_miles() - 1700.0 / 5280.0).abs() < 1e-9);

        let upper_p = RunwayVisualRange::parse("R28/1200VP6000FT").expect("valid");
        assert!(upper_p.is_greater_than());
    }

    #[test]
    fn metric_groups_are_stored_in_feet() {
        let rvr = RunwayVisualRange::parse("R27L/0550").expect("valid");
        assert_eq!(rvr.visual_range_feet(), Some(1804));
        assert!((rvr.meters() - 550.0).abs() < 0.5);

        let variable = RunwayVisualRange::parse("R09/0600V1000U").expect("valid");
        assert_eq!(variable.variable_low(), Some(1969));
        assert_eq!(variable.variable_high(), Some(3281));
        assert_eq!(variable.trend(), Some(RvrTrend::Increasing));

        let feet = RunwayVisualRange::parse("R27L/0550FT").expect("valid");
        assert_eq!(feet.visual_range_feet(), Some(550));
    }

    #[test]
    fn parses_cleared_group() {
        let rvr = RunwayVisualRange::parse("R22R/CLRD70").expect("valid");
        assert!(rvr.is_cleared());
    }

    #[test]
    fn validation_failures() {
        let err = RunwayVisualRange::of("37", 1000).unwrap_err();
        assert!(err.to_string().contains("Invalid runway identifier"));

        let err = RunwayVisualRange::new("09", None, None, None, None, None, false).unwrap_err();
        assert!(err.to_string().contains("Must have either visualRangeFeet"));

        let err = RunwayVisualRange::variable("09", 2400, 1000).unwrap_err();
        assert!(err.to_string().contains("Variable low (2400) must be less than variable high (1000)"));

        let err = RunwayVisualRange::new("09", Some(500), None, None, None, None, true).unwrap_err();
        assert!(err.to_string().contains("CLRD runway cannot have visual range values"));

        let err = RunwayVisualRange::new("09", None, None, None, Some(RvrPrefix::LessThan), None, true)
            .unwrap_err();
        assert!(err.to_string().contains("cannot have prefix"));

        assert!(RvrPrefix::try_from("X").unwrap_err().to_string().contains("Invalid prefix"));
        assert!(RvrTrend::try_from("Z").unwrap_err().to_string().contains("Invalid trend"));
    }
}
