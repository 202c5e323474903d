use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

use super::cardinal_point;
use crate::error::{Result, WeatherError, ensure};

const KNOTS_TO_MPS: f64 = 0.514444;
const KNOTS_TO_KMH: f64 = 1.852;
const GALE_THRESHOLD_KNOTS: f64 = 34.0;
const BEAUFORT_UPPER_KNOTS: [f64; 11] = [3.0, 6.0, 10.0, 16.0, 21.0, 27.0, 33.0, 40.0, 47.0, 55.0, 63.0];

static WIND_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<dir>\d{3}|VRB)(?P<speed>\d{2,3})(?:G(?P<gust>\d{2,3}))?(?P<unit>KT|MPS|KMH)$")
        .expect("wind pattern must compile")
});
static VARIABILITY_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<from>\d{3})V(?P<to>\d{3})$").expect("variability pattern must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindUnit {
    #[serde(rename = "KT")]
    Knots,
    #[serde(rename = "MPS")]
    MetersPerSecond,
    #[serde(rename = "KMH")]
    KilometersPerHour,
}

impl WindUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindUnit::Knots => "KT",
            WindUnit::MetersPerSecond => "MPS",
            WindUnit::KilometersPerHour => "KMH",
        }
    }

    pub const fn all() -> &'static [WindUnit] {
        &[WindUnit::Knots, WindUnit::MetersPerSecond, WindUnit::KilometersPerHour]
    }

    fn to_knots(self, value: f64) -> f64 {
        match self {
            WindUnit::Knots => value,
            WindUnit::MetersPerSecond => value / KNOTS_TO_MPS,
            WindUnit::KilometersPerHour => value / KNOTS_TO_KMH,
        }
    }
}

impl std::fmt::Display for WindUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for WindUnit {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self> {
        match value.trim().to_uppercase().as_str() {
            "KT" => Ok(WindUnit::Knots),
            "MPS" => Ok(WindUnit::MetersPerSecond),
            "KMH" => Ok(WindUnit::KilometersPerHour),
            _ => Err(WeatherError::validation(format!(
                "Invalid wind unit '{value}'. Supported units: KT, MPS, KMH."
            ))),
        }
    }
}

/// Surface wind: mean direction, sustained speed, optional gust and
/// an optional variable-direction sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wind {
    direction_degrees: Option<i32>,
    speed: Option<i32>,
    gust: Option<i32>,
    variability_from: Option<i32>,
    variability_to: Option<i32>,
    unit: WindUnit,
}

impl Wind {
    pub fn new(
        direction_degrees: Option<i32>,
        speed: Option<i32>,
        gust: Option<i32>,
        variability_from: Option<i32>,
        variability_to: Option<i32>,
        unit: WindUnit,
    ) -> Result<Self> {
        if let Some(direction) = direction_degrees {
            ensure((0..=360).contains(&direction), || {
                format!("Wind direction must be between 0 and 360 degrees, got: {direction}")
            })?;
        }
        if let Some(speed) = speed {
            ensure(speed >= 0, || format!("Wind speed cannot be negative: {speed}"))?;
        }
        if let Some(gust) = gust {
            ensure(gust >= 0, || format!("Gust speed cannot be negative: {gust}"))?;
            if let Some(speed) = speed {
                ensure(gust > speed, || {
                    format!("Gust speed ({gust}) must be greater than wind speed ({speed})")
                })?;
            }
        }
        match (variability_from, variability_to) {
            (None, None) => {}
            (Some(from), Some(to)) => {
                for bound in [from, to] {
                    ensure((0..=360).contains(&bound), || {
                        format!("Variability from/to must be between 0 and 360: {bound}")
                    })?;
                }
            }
            _ => {
                return Err(WeatherError::validation(
                    "Both variabilityFrom and variabilityTo must be provided together",
                ));
            }
        }

        Ok(Self {
            direction_degrees,
            speed,
            gust,
            variability_from,
            variability_to,
            unit,
        })
    }

    pub fn of(direction_degrees: i32, speed: i32, unit: WindUnit) -> Result<Self> {
        Self::new(Some(direction_degrees), Some(speed), None, None, None, unit)
    }

    pub fn with_gusts(direction_degrees: i32, speed: i32, gust: i32, unit: WindUnit) -> Result<Self> {
        Self::new(Some(direction_degrees), Some(speed), Some(gust), None, None, unit)
    }

    pub fn calm() -> Self {
        Self {
            direction_degrees: None,
            speed: Some(0),
            gust: None,
            variability_from: None,
            variability_to: None,
            unit: WindUnit::Knots,
        }
    }

    /// Variable direction (`VRB`) at the given speed.
    pub fn variable(speed: i32, unit: WindUnit) -> Result<Self> {
        Self::new(None, Some(speed), None, None, None, unit)
    }

    /// Return a copy carrying the `dddVddd` sector.
    pub fn with_variability(self, from: i32, to: i32) -> Result<Self> {
        Self::new(self.direction_degrees, self.speed, self.gust, Some(from), Some(to), self.unit)
    }

    /// Parse `dddssGggUU`, `VRBssUU` or `00000KT`.
    pub fn parse(token: &str) -> Result<Self> {
        let token = token.trim().to_uppercase();
        let caps = WIND_GROUP
            .captures(&token)
            .ok_or_else(|| WeatherError::parse("wind", format!("unrecognized token '{token}'")))?;

        let unit = WindUnit::try_from(&caps["unit"])?;
        let speed = parse_int(&caps["speed"], "wind")?;
        let gust = caps.name("gust").map(|g| parse_int(g.as_str(), "wind")).transpose()?;

        match &caps["dir"] {
            "VRB" => Self::new(None, Some(speed), gust, None, None, unit),
            "000" if speed == 0 && gust.is_none() => Ok(Self {
                unit,
                ..Self::calm()
            }),
            dir => Self::new(Some(parse_int(dir, "wind")?), Some(speed), gust, None, None, unit),
        }
    }

    /// Parse a wind group followed by an optional `dddVddd` sector.
    pub fn parse_with_variability(token: &str, variability: Option<&str>) -> Result<Self> {
        let wind = Self::parse(token)?;
        match variability {
            None => Ok(wind),
            Some(group) => {
                let (from, to) = parse_variability(group)?;
                wind.with_variability(from, to)
            }
        }
    }

    pub fn direction_degrees(&self) -> Option<i32> {
        self.direction_degrees
    }

    pub fn speed(&self) -> Option<i32> {
        self.speed
    }

    pub fn gust(&self) -> Option<i32> {
        self.gust
    }

    pub fn variability_from(&self) -> Option<i32> {
        self.variability_from
    }

    pub fn variability_to(&self) -> Option<i32> {
        self.variability_to
    }

    pub fn unit(&self) -> WindUnit {
        self.unit
    }

    pub fn is_variable(&self) -> bool {
        self.variability_from.is_some() && self.variability_to.is_some()
    }

    pub fn has_gusts(&self) -> bool {
        self.gust.is_some()
    }

    pub fn is_calm(&self) -> bool {
        self.direction_degrees.is_none() && self.speed.is_none_or(|s| s == 0)
    }

    /// Width of the variable sector, measured clockwise from `from` to `to`.
    pub fn variability_range(&self) -> Option<i32> {
        match (self.variability_from, self.variability_to) {
            (Some(from), Some(to)) => Some((to - from).rem_euclid(360)),
            _ => None,
        }
    }

    pub fn cardinal_direction(&self) -> &'static str {
        if self.is_calm() {
            return "CALM";
        }
        match self.direction_degrees {
            None => "VRB",
            Some(direction) => cardinal_point(f64::from(direction)),
        }
    }

    pub fn speed_knots(&self) -> Option<f64> {
        self.speed.map(|s| self.unit.to_knots(f64::from(s)))
    }

    pub fn speed_mps(&self) -> Option<f64> {
        self.speed_knots().map(|kt| kt * KNOTS_TO_MPS)
    }

    pub fn speed_kmh(&self) -> Option<f64> {
        self.speed_knots().map(|kt| kt * KNOTS_TO_KMH)
    }

    pub fn gust_knots(&self) -> Option<f64> {
        self.gust.map(|g| self.unit.to_knots(f64::from(g)))
    }

    pub fn gust_mps(&self) -> Option<f64> {
        self.gust_knots().map(|kt| kt * KNOTS_TO_MPS)
    }

    pub fn gust_kmh(&self) -> Option<f64> {
        self.gust_knots().map(|kt| kt * KNOTS_TO_KMH)
    }

    /// Beaufort force from sustained speed; `None` when speed is not reported.
    pub fn beaufort_scale(&self) -> Option<u8> {
        self.speed_knots().map(beaufort_from_knots)
    }

    pub fn is_gale(&self) -> bool {
        self.speed_knots().is_some_and(|kt| kt >= GALE_THRESHOLD_KNOTS)
    }

    pub fn summary(&self) -> String {
        if self.is_calm() {
            return "Calm".to_string();
        }

        let mut out = match self.direction_degrees {
            Some(direction) => format!("{direction:03}° ({})", self.cardinal_direction()),
            None => "Variable".to_string(),
        };
        if let Some(speed) = self.speed {
            out.push_str(&format!(" at {speed} {}", self.unit));
        }
        if let Some(gust) = self.gust {
            out.push_str(&format!(", gusting to {gust} {}", self.unit));
        }
        if let (Some(from), Some(to)) = (self.variability_from, self.variability_to) {
            out.push_str(&format!(", varying {from:03}°-{to:03}°"));
        }
        out
    }
}

impl std::fmt::Display for Wind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Beaufort number for a speed in knots.
pub fn beaufort_from_knots(knots: f64) -> u8 {
    if knots < 1.0 {
        return 0;
    }
    BEAUFORT_UPPER_KNOTS
        .iter()
        .position(|upper| knots <= *upper)
        .map(|index| index as u8 + 1)
        .unwrap_or(12)
}

/// Split a `dddVddd` sector into its bounds.
pub fn parse_variability(token: &str) -> Result<(i32, i32)> {
    let caps = VARIABILITY_GROUP.captures(token.trim()).ok_or_else(|| {
        WeatherError::parse("wind variability", format!("unrecognized token '{token}'"))
    })?;
    Ok((parse_int(&caps["from"], "wind variability")?, parse_int(&caps["to"], "wind variability")?))
}

pub fn is_variability_group(token: &str) -> bool {
    VARIABILITY_GROUP.is_match(token)
}

fn parse_int(digits: &str, group: &str) -> Result<i32> {
    digits
        .parse::<i32>()
        .map_err(|e| WeatherError::parse(group, format!("'{digits}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_wind_group() {
        let wind = Wind::parse("28016KT").expect("valid wind");
        assert_eq!(wind.direction_degrees(), Some(280));
        assert_eq!(wind.speed(), Some(16));
        assert!(!wind.has_gusts());
        assert_eq!(wind.unit(), WindUnit::Knots);
        assert_eq!(wind.cardinal_direction(), "W");
    }

    #[test]
    fn parses_gusts_and_variability() {
        let wind = Wind::parse_with_variability("27015G25KT", Some("250V310")).expect("valid wind");
        assert!(wind.has_gusts());
        assert_eq!(wind.gust(), Some(25));
        assert!(wind.is_variable());
        assert_eq!(wind.variability_range(), Some(60));
        assert_eq!(wind.summary(), "270° (W) at 15 KT, gusting to 25 KT, varying 250°-310°");
    }

    #[test]
    fn variability_across_north_is_accepted() {
        let wind = Wind::parse_with_variability("01008KT", Some("350V030")).expect("valid wind");
        assert_eq!(wind.variability_range(), Some(40));
    }

    #[test]
    fn calm_and_variable_groups() {
        let calm = Wind::parse("00000KT").expect("calm wind");
        assert!(calm.is_calm());
        assert_eq!(calm.cardinal_direction(), "CALM");
        assert_eq!(calm.summary(), "Calm");

        let vrb = Wind::parse("VRB03KT").expect("variable wind");
        assert!(!vrb.is_calm());
        assert_eq!(vrb.direction_degrees(), None);
        assert_eq!(vrb.cardinal_direction(), "VRB");
        assert_eq!(Wind::variable(3, WindUnit::Knots).expect("variable"), vrb);
    }

    #[test]
    fn rejects_out_of_range_direction() {
        let err = Wind::of(361, 10, WindUnit::Knots).unwrap_err();
        assert!(err.to_string().contains("Wind direction must be between 0 and 360"));
    }

    #[test]
    fn rejects_negative_speeds() {
        let err = Wind::of(180, -1, WindUnit::Knots).unwrap_err();
        assert!(err.to_string().contains("Wind speed cannot be negative"));

        let err = Wind::new(Some(180), None, Some(-5), None, None, WindUnit::Knots).unwrap_err();
        assert!(err.to_string().contains("Gust speed cannot be negative"));
    }

    #[test]
    fn gust_must_exceed_sustained_speed() {
        let err = Wind::with_gusts(180, 20, 20, WindUnit::Knots).unwrap_err();
        assert!(err.to_string().contains("must be greater than wind speed"));
        assert!(Wind::with_gusts(180, 20, 15, WindUnit::Knots).is_err());

        let wind = Wind::with_gusts(180, 20, 30, WindUnit::Knots).expect("gust above speed");
        assert!(wind.has_gusts());
        assert!(wind.gust() > wind.speed());
    }

    #[test]
    fn variability_bounds_come_in_pairs() {
        let err = Wind::new(Some(180), Some(10), None, Some(150), None, WindUnit::Knots).unwrap_err();
        assert!(err.to_string().contains("must be provided together"));

        let err = Wind::new(Some(180), Some(10), None, Some(150), Some(400), WindUnit::Knots).unwrap_err();
        assert!(err.to_string().contains("Variability from/to must be between 0 and 360"));
    }

    #[test]
    fn cardinal_points_round_to_sixteen_sectors() {
        let at = |deg| Wind::of(deg, 5, WindUnit::Knots).expect("valid").cardinal_direction();
        assert_eq!(at(0), "N");
        assert_eq!(at(360), "N");
        assert_eq!(at(22), "NNE");
        assert_eq!(at(45), "NE");
        assert_eq!(at(180), "S");
        assert_eq!(at(350), "N");
        assert_eq!(at(337), "NNW");
    }

    #[test]
    fn unit_conversions() {
        let wind = Wind::of(90, 10, WindUnit::Knots).expect("valid");
        assert!((wind.speed_mps().expect("speed") - 5.14444).abs() < 1e-4);
        assert!((wind.speed_kmh().expect("speed") - 18.52).abs() < 1e-9);

        let metric = Wind::of(90, 10, WindUnit::MetersPerSecond).expect("valid");
        assert!((metric.speed_knots().expect("speed") - 19.4384).abs() < 1e-3);

        let kmh = Wind::of(90, 37, WindUnit::KilometersPerHour).expect("valid");
        assert!((kmh.speed_knots().expect("speed") - 19.978).abs() < 1e-2);
    }

    #[test]
    fn beaufort_thresholds() {
        assert_eq!(beaufort_from_knots(0.5), 0);
        assert_eq!(beaufort_from_knots(1.0), 1);
        assert_eq!(beaufort_from_knots(3.0), 1);
        assert_eq!(beaufort_from_knots(4.0), 2);
        assert_eq!(beaufort_from_knots(16.0), 4);
        assert_eq!(beaufort_from_knots(34.0), 8);
        assert_eq!(beaufort_from_knots(63.0), 11);
        assert_eq!(beaufort_from_knots(64.0), 12);
        assert_eq!(Wind::calm().beaufort_scale(), Some(0));
    }

    #[test]
    fn gale_threshold_is_34_knots() {
        assert!(!Wind::of(270, 33, WindUnit::Knots).expect("valid").is_gale());
        assert!(Wind::of(270, 34, WindUnit::Knots).expect("valid").is_gale());
        assert!(Wind::of(270, 18, WindUnit::MetersPerSecond).expect("valid").is_gale());
    }

    #[test]
    fn unit_roundtrip_and_rejection() {
        for unit in WindUnit::all() {
            assert_eq!(WindUnit::try_from(unit.as_str()).expect("roundtrip"), *unit);
        }
        let err = WindUnit::try_from("MPH").unwrap_err();
        assert!(err.to_string().contains("Invalid wind unit"));
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(Wind::parse("2801KT").is_err());
        assert!(Wind::parse("28016MPH").is_err());
        assert!(parse_variability("250-310").is_err());
    }
}
