use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    components::pressure::HPA_TO_INHG,
    error::{Result, WeatherError, ensure},
};

const SIGNIFICANT_CHANGE_HPA: f64 = 3.0;
const RAPID_CHANGE_HPA: f64 = 6.0;
const MAX_CHANGE_HPA: f64 = 50.0;

static CHANGE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{3}$").expect("change code pattern must compile"));

/// `5appp`: three-hour pressure characteristic `a` and change `ppp` in tenths of hPa.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PressureTendency {
    tendency_code: u8,
    change_hectopascals: f64,
}

impl PressureTendency {
    pub fn new(tendency_code: u8, change_hectopascals: f64) -> Result<Self> {
        ensure(tendency_code <= 8, || format!("Tendency code must be 0-8, got: {tendency_code}"))?;
        ensure(change_hectopascals >= 0.0, || {
            format!("Pressure change cannot be negative, got: {change_hectopascals:.1}")
        })?;
        ensure(change_hectopascals <= MAX_CHANGE_HPA, || {
            format!("Pressure change too large (> 50 hPa), got: {change_hectopascals:.1}")
        })?;
        Ok(Self {
            tendency_code,
            change_hectopascals,
        })
    }

    pub fn of(tendency_code: u8, change_hectopascals: f64) -> Result<Self> {
        Self::new(tendency_code, change_hectopascals)
    }

    pub fn from_metar(tendency_code: u8, change_code: &str) -> Result<Self> {
        if !CHANGE_CODE.is_match(change_code) {
            return Err(WeatherError::validation(format!(
                "Change code must be 3 digits, got: {change_code}"
            )));
        }
        let tenths: u16 = change_code
            .parse()
            .map_err(|_| WeatherError::parse("pressure tendency", change_code))?;
        Self::new(tendency_code, f64::from(tenths) / 10.0)
    }

    pub fn tendency_code(&self) -> u8 {
        self.tendency_code
    }

    pub fn change_hectopascals(&self) -> f64 {
        self.change_hectopascals
    }

    pub fn is_increasing(&self) -> bool {
        self.tendency_code <= 3
    }

    pub fn is_steady(&self) -> bool {
        self.tendency_code == 4
    }

    pub fn is_decreasing(&self) -> bool {
        self.tendency_code >= 5
    }

    pub fn is_significant(&self) -> bool {
        self.change_hectopascals >= SIGNIFICANT_CHANGE_HPA
    }

    pub fn is_rapid(&self) -> bool {
        self.change_hectopascals >= RAPID_CHANGE_HPA
    }

    pub fn is_negligible(&self) -> bool {
        self.change_hectopascals < 1.0
    }

    pub fn change_inches_hg(&self) -> f64 {
        self.change_hectopascals * HPA_TO_INHG
    }

    pub fn signed_change(&self) -> f64 {
        if self.is_decreasing() {
            -self.change_hectopascals
        } else {
            self.change_hectopascals
        }
    }

    pub fn tendency_description(&self) -> &'static str {
        match self.tendency_code {
            0 => "Increasing, then decreasing",
            1 => "Increasing, then steady",
            2 => "Increasing",
            3 => "Increasing rapidly",
            4 => "Steady",
            5 => "Decreasing, then increasing",
            6 => "Decreasing, then steady",
            7 => "Decreasing",
            _ => "Decreasing rapidly",
        }
    }

    pub fn short_description(&self) -> &'static str {
        if self.is_increasing() {
            "Rising"
        } else if self.is_steady() {
            "Steady"
        } else {
            "Falling"
        }
    }

    pub fn change_magnitude(&self) -> &'static str {
        match self.change_hectopascals {
            c if c >= RAPID_CHANGE_HPA => "Rapid",
            c if c >= SIGNIFICANT_CHANGE_HPA => "Significant",
            c if c >= 1.0 => "Moderate",
            c if c > 0.0 => "Slight",
            _ => "None",
        }
    }

    pub fn weather_implication(&self) -> &'static str {
        match (self.is_increasing(), self.is_decreasing()) {
            (true, _) if self.is_rapid() => "Rapid pressure rise - weather likely improving quickly, storm clearing",
            (_, true) if self.is_rapid() => {
                "Rapid pressure fall - severe weather approaching, deteriorating conditions"
            }
            (true, _) if self.is_significant() => "Rising pressure - improving weather, clearing conditions",
            (_, true) if self.is_significant() => {
                "Falling pressure - weather deteriorating, potential storm development"
            }
            (true, _) => "Slight pressure rise - weather becoming more settled",
            (_, true) => "Slight pressure fall - weather may deteriorate slightly",
            _ => "Pressure steady - no significant weather change expected",
        }
    }

    pub fn formatted_change(&self) -> String {
        let sign = if self.is_decreasing() {
            "-"
        } else if self.is_increasing() {
            "+"
        } else {
            ""
        };
        format!("{sign}{:.1} hPa", self.change_hectopascals)
    }

    pub fn to_metar_code(&self) -> String {
        let tenths = (self.change_hectopascals * 10.0).round() as i32;
        format!("5{}{tenths:03}", self.tendency_code)
    }

    pub fn summary(&self) -> String {
        let flag = if self.is_rapid() {
            " [RAPID]"
        } else if self.is_significant() {
            " [SIGNIFICANT]"
        } else {
            ""
        };
        format!(
            "Pressure tendency: {}, change of {} ({:.2} inHg){flag}",
            self.tendency_description(),
            self.formatted_change(),
            self.change_inches_hg()
        )
    }
}

impl std::fmt::Display for PressureTendency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_metar_group() {
        let tendency = PressureTendency::from_metar(2, "032").expect("valid");
        assert!((tendency.change_hectopascals() - 3.2).abs() < 1e-9);
        assert!(tendency.is_increasing());
        assert!(tendency.is_significant());
        assert!(!tendency.is_rapid());
        assert_eq!(tendency.to_metar_code(), "52032");
        assert_eq!(tendency.short_description(), "Rising");
        assert_eq!(
            tendency.summary(),
            "Pressure tendency: Increasing, change of +3.2 hPa (0.09 inHg) [SIGNIFICANT]"
        );
    }

    #[test]
    fn falling_and_steady() {
        let falling = PressureTendency::of(8, 6.5).expect("valid");
        assert!(falling.is_decreasing());
        assert!(falling.is_rapid());
        assert_eq!(falling.signed_change(), -6.5);
        assert_eq!(falling.change_magnitude(), "Rapid");
        assert!(falling.weather_implication().starts_with("Rapid pressure fall"));

        let steady = PressureTendency::of(4, 0.0).expect("valid");
        assert!(steady.is_steady());
        assert!(steady.is_negligible());
        assert_eq!(steady.formatted_change(), "0.0 hPa");
        assert_eq!(steady.change_magnitude(), "None");
    }

    #[test]
    fn validation() {
        assert!(PressureTendency::of(9, 1.0).unwrap_err().to_string().contains("Tendency code must be 0-8"));
        assert!(PressureTendency::of(1, -1.0).is_err());
        assert!(PressureTendency::of(1, 50.5).unwrap_err().to_string().contains("too large"));
        assert!(PressureTendency::from_metar(1, "3a2").unwrap_err().to_string().contains("3 digits"));
    }
}
