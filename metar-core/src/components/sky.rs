use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

use crate::{
    decoder,
    error::{Result, WeatherError, ensure},
    patterns,
};

const MAX_HEIGHT_FEET: i32 = 100_000;
const FEET_TO_METERS: f64 = 0.3048;

static SKY_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<cover>SKC|CLR|NSC|NCD|FEW|SCT|BKN|OVC|VV)(?P<height>\d{3}|///)?(?P<cloud>[A-Z]{2,3}|///)?$")
        .expect("sky pattern must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SkyCoverage {
    Skc,
    Clr,
    Nsc,
    Ncd,
    Few,
    Sct,
    Bkn,
    Ovc,
    Vv,
}

impl SkyCoverage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkyCoverage::Skc => "SKC",
            SkyCoverage::Clr => "CLR",
            SkyCoverage::Nsc => "NSC",
            SkyCoverage::Ncd => "NCD",
            SkyCoverage::Few => "FEW",
            SkyCoverage::Sct => "SCT",
            SkyCoverage::Bkn => "BKN",
            SkyCoverage::Ovc => "OVC",
            SkyCoverage::Vv => "VV",
        }
    }

    pub const fn all() -> &'static [SkyCoverage] {
        &[
            SkyCoverage::Skc,
            SkyCoverage::Clr,
            SkyCoverage::Nsc,
            SkyCoverage::Ncd,
            SkyCoverage::Few,
            SkyCoverage::Sct,
            SkyCoverage::Bkn,
            SkyCoverage::Ovc,
            SkyCoverage::Vv,
        ]
    }

    /// Eighths of sky covered, using the lower bound of each band.
    pub fn oktas(&self) -> u8 {
        match self {
            SkyCoverage::Skc | SkyCoverage::Clr | SkyCoverage::Nsc | SkyCoverage::Ncd => 0,
            SkyCoverage::Few => 1,
            SkyCoverage::Sct => 3,
            SkyCoverage::Bkn => 5,
            SkyCoverage::Ovc | SkyCoverage::Vv => 8,
        }
    }

    pub fn description(&self) -> String {
        decoder::decode_sky_coverage(self.as_str())
    }

    /// Coverage codes that report no cloud and so carry no height.
    pub fn is_clear(&self) -> bool {
        matches!(
            self,
            SkyCoverage::Skc | SkyCoverage::Clr | SkyCoverage::Nsc | SkyCoverage::Ncd
        )
    }
}

impl std::fmt::Display for SkyCoverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SkyCoverage {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self> {
        let upper = value.trim().to_uppercase();
        SkyCoverage::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == upper)
            .ok_or_else(|| WeatherError::validation(format!("Unknown sky coverage code: {value}")))
    }
}

/// One reported cloud layer (or clear-sky statement).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkyCondition {
    coverage: SkyCoverage,
    height_feet: Option<i32>,
    cloud_type: Option<String>,
}

impl SkyCondition {
    pub fn new(coverage: SkyCoverage, height_feet: Option<i32>, cloud_type: Option<&str>) -> Result<Self> {
        if let Some(h) = height_feet {
            ensure((0..=MAX_HEIGHT_FEET).contains(&h), || {
                format!("Cloud height out of reasonable range (0-100000 ft): {h}")
            })?;
            ensure(!coverage.is_clear(), || {
                format!("Clear sky conditions should not have height: {coverage}")
            })?;
        }
        if coverage == SkyCoverage::Vv {
            ensure(height_feet.is_some(), || "Vertical visibility requires a height".into())?;
        }
        let cloud_type = match cloud_type.map(|c| c.trim().to_uppercase()) {
            Some(code) => {
                ensure(patterns::is_cloud_type(&code), || format!("Invalid cloud type: {code}"))?;
                Some(code)
            }
            None => None,
        };

        Ok(Self {
            coverage,
            height_feet,
            cloud_type,
        })
    }

    pub fn clear() -> Self {
        Self {
            coverage: SkyCoverage::Clr,
            height_feet: None,
            cloud_type: None,
        }
    }

    pub fn sky_clear() -> Self {
        Self {
            coverage: SkyCoverage::Skc,
            ..Self::clear()
        }
    }

    /// Parse `{COVER}hhh[TYPE]`, height in hundreds of feet (`BKN015CB`, `VV002`, `SKC`).
    pub fn parse(token: &str) -> Result<Self> {
        let token = token.trim().to_uppercase();
        let caps = SKY_GROUP
            .captures(&token)
            .ok_or_else(|| WeatherError::parse("sky condition", format!("unrecognized token '{token}'")))?;

        let coverage = SkyCoverage::try_from(&caps["cover"])?;
        let height_feet = match caps.name("height").map(|m| m.as_str()) {
            Some("///") | None => None,
            Some(hundreds) => Some(
                hundreds
                    .parse::<i32>()
                    .map_err(|_| WeatherError::parse("sky condition", hundreds))?
                    * 100,
            ),
        };
        let cloud_type = caps.name("cloud").map(|m| m.as_str()).filter(|c| *c != "///");

        Self::new(coverage, height_feet, cloud_type)
    }

    pub fn coverage(&self) -> SkyCoverage {
        self.coverage
    }

    pub fn height_feet(&self) -> Option<i32> {
        self.height_feet
    }

    pub fn cloud_type(&self) -> Option<&str> {
        self.cloud_type.as_deref()
    }

    pub fn is_clear(&self) -> bool {
        self.coverage.is_clear()
    }

    /// Broken, overcast and vertical-visibility layers form a ceiling.
    pub fn is_ceiling(&self) -> bool {
        matches!(self.coverage, SkyCoverage::Bkn | SkyCoverage::Ovc | SkyCoverage::Vv)
    }

    pub fn is_cumulonimbus(&self) -> bool {
        self.cloud_type.as_deref() == Some("CB")
    }

    pub fn is_towering_cumulus(&self) -> bool {
        self.cloud_type.as_deref() == Some("TCU")
    }

    pub fn is_convective(&self) -> bool {
        self.is_cumulonimbus() || self.is_towering_cumulus()
    }

    pub fn height_meters(&self) -> Option<i32> {
        self.height_feet.map(|ft| (f64::from(ft) * FEET_TO_METERS) as i32)
    }

    pub fn summary(&self) -> String {
        let mut out = self.coverage.description();
        if let Some(h) = self.height_feet {
            out.push_str(&format!(" at {h} ft"));
        }
        if let Some(cloud) = &self.cloud_type {
            out.push_str(&format!(" ({})", decoder::decode_cloud_type(cloud)));
        }
        out
    }
}

impl std::fmt::Display for SkyCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_layer_with_height() {
        let sky = SkyCondition::parse("FEW250").expect("valid layer");
        assert_eq!(sky.coverage(), SkyCoverage::Few);
        assert_eq!(sky.height_feet(), Some(25_000));
        assert_eq!(sky.cloud_type(), None);
        assert!(!sky.is_ceiling());
        assert_eq!(sky.summary(), "Few at 25000 ft");
    }

    #[test]
    fn parses_convective_layers() {
        let cb = SkyCondition::parse("BKN015CB").expect("valid layer");
        assert!(cb.is_ceiling());
        assert!(cb.is_cumulonimbus());
        assert!(cb.is_convective());
        assert_eq!(cb.height_meters(), Some(457));
        assert_eq!(cb.summary(), "Broken at 1500 ft (Cumulonimbus)");

        let tcu = SkyCondition::parse("SCT030TCU").expect("valid layer");
        assert!(tcu.is_towering_cumulus());
        assert!(!tcu.is_ceiling());
    }

    #[test]
    fn clear_and_vertical_visibility() {
        let skc = SkyCondition::parse("SKC").expect("clear");
        assert!(skc.is_clear());
        assert_eq!(skc, SkyCondition::sky_clear());
        assert_eq!(SkyCondition::parse("NCD").expect("clear").summary(), "No Clouds Detected");

        let vv = SkyCondition::parse("VV002").expect("valid");
        assert!(vv.is_ceiling());
        assert_eq!(vv.height_feet(), Some(200));
        assert_eq!(vv.coverage().oktas(), 8);
    }

    #[test]
    fn missing_height_is_allowed_except_for_vv() {
        let bkn = SkyCondition::parse("BKN///").expect("height not reported");
        assert_eq!(bkn.height_feet(), None);

        let err = SkyCondition::new(SkyCoverage::Vv, None, None).unwrap_err();
        assert!(err.to_string().contains("Vertical visibility requires a height"));
    }

    #[test]
    fn clear_variants_reject_height() {
        for coverage in [SkyCoverage::Skc, SkyCoverage::Clr, SkyCoverage::Nsc, SkyCoverage::Ncd] {
            let err = SkyCondition::new(coverage, Some(1000), None).unwrap_err();
            assert!(err.to_string().contains("should not have height"));
        }
    }

    #[test]
    fn height_range_and_cloud_type_are_checked() {
        let err = SkyCondition::new(SkyCoverage::Ovc, Some(100_001), None).unwrap_err();
        assert!(err.to_string().contains("Cloud height out of reasonable range"));
        assert!(SkyCondition::new(SkyCoverage::Ovc, Some(-1), None).is_err());

        let err = SkyCondition::new(SkyCoverage::Bkn, Some(3000), Some("XX")).unwrap_err();
        assert!(err.to_string().contains("Invalid cloud type"));
        assert!(SkyCondition::new(SkyCoverage::Bkn, Some(3000), Some("cb")).is_ok());
    }

    #[test]
    fn coverage_codes_roundtrip() {
        for coverage in SkyCoverage::all() {
            assert_eq!(SkyCoverage::try_from(coverage.as_str()).expect("roundtrip"), *coverage);
        }
        assert!(SkyCoverage::try_from("XYZ").is_err());
        assert_eq!(SkyCoverage::Bkn.oktas(), 5);
        assert_eq!(SkyCoverage::Sct.description(), "Scattered");
    }
}
