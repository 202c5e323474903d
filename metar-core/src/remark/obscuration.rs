use serde::{Deserialize, Serialize};

use crate::{
    components::SkyCoverage,
    decoder,
    error::{Result, WeatherError, ensure},
};

const LOW_LEVEL_FEET: i32 = 1000;

/// Layer of obscuring phenomenon aloft, e.g. `FEW FG 000` or `BKN FU 015`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObscurationLayer {
    coverage: SkyCoverage,
    phenomenon: String,
    height_feet: i32,
}

impl ObscurationLayer {
    pub fn new(coverage: SkyCoverage, phenomenon: &str, height_feet: i32) -> Result<Self> {
        ensure(
            matches!(
                coverage,
                SkyCoverage::Few | SkyCoverage::Sct | SkyCoverage::Bkn | SkyCoverage::Ovc
            ),
            || format!("Obscuration coverage must be FEW, SCT, BKN or OVC: {coverage}"),
        )?;
        let phenomenon = phenomenon.trim().to_uppercase();
        if phenomenon.is_empty() {
            return Err(WeatherError::validation("Phenomenon cannot be blank"));
        }
        ensure(height_feet >= 0, || "Height cannot be negative".into())?;

        Ok(Self {
            coverage,
            phenomenon,
            height_feet,
        })
    }

    pub fn from_hundreds(coverage: SkyCoverage, phenomenon: &str, hundreds: i32) -> Result<Self> {
        Self::new(coverage, phenomenon, hundreds * 100)
    }

    pub fn coverage(&self) -> SkyCoverage {
        self.coverage
    }

    pub fn phenomenon(&self) -> &str {
        &self.phenomenon
    }

    pub fn height_feet(&self) -> i32 {
        self.height_feet
    }

    pub fn is_ground_level(&self) -> bool {
        self.height_feet == 0
    }

    pub fn is_low_level(&self) -> bool {
        self.height_feet < LOW_LEVEL_FEET
    }

    pub fn summary(&self) -> String {
        let what = format!(
            "{} {}",
            self.coverage.description(),
            decoder::decode_weather_phenomenon(&self.phenomenon)
        );
        if self.is_ground_level() {
            format!("{what} at ground level")
        } else {
            format!("{what} at {} ft", self.height_feet)
        }
    }
}

impl std::fmt::Display for ObscurationLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_and_aloft_summaries() {
        let fog = ObscurationLayer::from_hundreds(SkyCoverage::Few, "fg", 0).expect("valid");
        assert!(fog.is_ground_level());
        assert_eq!(fog.summary(), "Few Fog at ground level");

        let smoke = ObscurationLayer::from_hundreds(SkyCoverage::Bkn, "FU", 15).expect("valid");
        assert!(!smoke.is_low_level());
        assert_eq!(smoke.summary(), "Broken Smoke at 1500 ft");
    }

    #[test]
    fn rejects_invalid_layers() {
        assert!(ObscurationLayer::new(SkyCoverage::Clr, "FG", 0).is_err());
        assert!(ObscurationLayer::new(SkyCoverage::Few, " ", 0).is_err());
        let err = ObscurationLayer::new(SkyCoverage::Few, "FG", -100).unwrap_err();
        assert!(err.to_string().contains("Height cannot be negative"));
    }
}
