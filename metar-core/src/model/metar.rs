use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

use crate::{
    components::{PresentWeather, Pressure, RunwayVisualRange, SkyCondition, Temperature, Visibility, Wind},
    error::{Result, WeatherError, ensure},
    model::{Report, ReportBase, ReportKind, conditions::lowest_ceiling},
    remark::MetarRemarks,
};

/// Observations older than this are no longer current.
pub const DEFAULT_MAX_AGE_HOURS: i64 = 3;

const CAVOK_STATUTE_MILES: f64 = 10.0;

/// FAA flight-rule category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlightCategory {
    Vfr,
    Mvfr,
    Ifr,
    Lifr,
}

impl FlightCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightCategory::Vfr => "VFR",
            FlightCategory::Mvfr => "MVFR",
            FlightCategory::Ifr => "IFR",
            FlightCategory::Lifr => "LIFR",
        }
    }

    pub const fn all() -> &'static [FlightCategory] {
        &[
            FlightCategory::Vfr,
            FlightCategory::Mvfr,
            FlightCategory::Ifr,
            FlightCategory::Lifr,
        ]
    }

    pub fn description(&self) -> &'static str {
        match self {
            FlightCategory::Vfr => "Visual Flight Rules",
            FlightCategory::Mvfr => "Marginal Visual Flight Rules",
            FlightCategory::Ifr => "Instrument Flight Rules",
            FlightCategory::Lifr => "Low Instrument Flight Rules",
        }
    }

    /// Classify from ceiling (feet) and visibility (statute miles).
    ///
    /// A missing value counts as unrestricted.
    pub fn classify(ceiling_feet: Option<i32>, visibility_sm: Option<f64>) -> Self {
        let ceiling_below = |limit: i32| ceiling_feet.is_some_and(|c| c < limit);
        let ceiling_at_most = |limit: i32| ceiling_feet.is_some_and(|c| c <= limit);
        let vis_below = |limit: f64| visibility_sm.is_some_and(|v| v < limit);
        let vis_at_most = |limit: f64| visibility_sm.is_some_and(|v| v <= limit);

        if ceiling_below(500) || vis_below(1.0) {
            FlightCategory::Lifr
        } else if ceiling_below(1000) || vis_below(3.0) {
            FlightCategory::Ifr
        } else if ceiling_at_most(3000) || vis_at_most(5.0) {
            FlightCategory::Mvfr
        } else {
            FlightCategory::Vfr
        }
    }
}

impl std::fmt::Display for FlightCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for FlightCategory {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self> {
        let upper = value.trim().to_uppercase();
        FlightCategory::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == upper)
            .ok_or_else(|| WeatherError::validation(format!("Unknown flight category: {value}")))
    }
}

/// A decoded METAR or SPECI observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetarReport {
    base: ReportBase,
    kind: ReportKind,
    wind: Option<Wind>,
    visibility: Option<Visibility>,
    runway_visual_ranges: Vec<RunwayVisualRange>,
    present_weather: Vec<PresentWeather>,
    sky_conditions: Vec<SkyCondition>,
    temperature: Option<Temperature>,
    pressure: Option<Pressure>,
    remarks: MetarRemarks,
    no_significant_change: bool,
    unparsed: Vec<String>,
}

impl MetarReport {
    pub fn new(base: ReportBase, kind: ReportKind) -> Result<Self> {
        ensure(kind.is_observation(), || {
            format!("Observation report must be METAR or SPECI, got {kind}")
        })?;

        Ok(Self {
            base,
            kind,
            wind: None,
            visibility: None,
            runway_visual_ranges: Vec::new(),
            present_weather: Vec::new(),
            sky_conditions: Vec::new(),
            temperature: None,
            pressure: None,
            remarks: MetarRemarks::empty(),
            no_significant_change: false,
            unparsed: Vec::new(),
        })
    }

    pub fn with_wind(mut self, wind: Wind) -> Self {
        self.wind = Some(wind);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn with_runway_visual_ranges(mut self, ranges: Vec<RunwayVisualRange>) -> Self {
        self.runway_visual_ranges = ranges;
        self
    }

    pub fn with_present_weather(mut self, weather: Vec<PresentWeather>) -> Self {
        self.present_weather = weather;
        self
    }

    pub fn with_sky_conditions(mut self, layers: Vec<SkyCondition>) -> Self {
        self.sky_conditions = layers;
        self
    }

    pub fn with_temperature(mut self, temperature: Temperature) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_pressure(mut self, pressure: Pressure) -> Self {
        self.pressure = Some(pressure);
        self
    }

    pub fn with_remarks(mut self, remarks: MetarRemarks) -> Self {
        self.remarks = remarks;
        self
    }

    pub fn with_no_significant_change(mut self, nosig: bool) -> Self {
        self.no_significant_change = nosig;
        self
    }

    pub fn with_unparsed(mut self, tokens: Vec<String>) -> Self {
        self.unparsed = tokens;
        self
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    pub fn wind(&self) -> Option<&Wind> {
        self.wind.as_ref()
    }

    pub fn visibility(&self) -> Option<&Visibility> {
        self.visibility.as_ref()
    }

    pub fn runway_visual_ranges(&self) -> &[RunwayVisualRange] {
        &self.runway_visual_ranges
    }

    pub fn present_weather(&self) -> &[PresentWeather] {
        &self.present_weather
    }

    pub fn sky_conditions(&self) -> &[SkyCondition] {
        &self.sky_conditions
    }

    pub fn temperature(&self) -> Option<&Temperature> {
        self.temperature.as_ref()
    }

    pub fn pressure(&self) -> Option<&Pressure> {
        self.pressure.as_ref()
    }

    pub fn remarks(&self) -> &MetarRemarks {
        &self.remarks
    }

    pub fn no_significant_change(&self) -> bool {
        self.no_significant_change
    }

    /// Tokens in the body that no group grammar recognized.
    pub fn unparsed(&self) -> &[String] {
        &self.unparsed
    }

    pub fn is_speci(&self) -> bool {
        self.kind == ReportKind::Speci
    }

    pub fn ceiling_feet(&self) -> Option<i32> {
        lowest_ceiling(&self.sky_conditions)
    }

    /// Lowest reported RVR; variable ranges count by their low end.
    pub fn minimum_rvr_feet(&self) -> Option<i32> {
        self.runway_visual_ranges
            .iter()
            .filter(|rvr| !rvr.is_cleared())
            .filter_map(|rvr| rvr.visual_range_feet().or(rvr.variable_low()))
            .min()
    }

    pub fn rvr_for_runway(&self, runway: &str) -> Option<&RunwayVisualRange> {
        let wanted = runway.trim().to_uppercase();
        self.runway_visual_ranges.iter().find(|rvr| rvr.runway() == wanted)
    }

    pub fn visibility_statute_miles(&self) -> Option<f64> {
        let vis = self.visibility.as_ref()?;
        if vis.is_cavok() {
            return Some(CAVOK_STATUTE_MILES);
        }
        vis.to_statute_miles()
    }

    /// `None` when the report carries neither visibility nor a cloud layer.
    pub fn flight_category(&self) -> Option<FlightCategory> {
        let visibility = self.visibility_statute_miles();
        if visibility.is_none() && self.sky_conditions.is_empty() {
            return None;
        }
        Some(FlightCategory::classify(self.ceiling_feet(), visibility))
    }

    pub fn has_thunderstorms(&self) -> bool {
        self.present_weather.iter().any(PresentWeather::is_thunderstorm)
            || self.sky_conditions.iter().any(SkyCondition::is_cumulonimbus)
    }

    pub fn has_precipitation(&self) -> bool {
        self.present_weather.iter().any(PresentWeather::has_precipitation)
    }

    pub fn is_current_within(&self, now: DateTime<Utc>, max_age_hours: i64) -> bool {
        self.base
            .observation_time()
            .is_some_and(|observed| now - observed <= Duration::hours(max_age_hours))
    }

    pub fn summary(&self) -> String {
        let mut header = self.base.summary(self.kind);
        let flags = self.base.quality_flags();
        if !flags.is_empty() {
            header.push_str(&format!(" [{flags}]"));
        }
        if let Some(category) = self.flight_category() {
            header.push_str(&format!(" ({category})"));
        }

        let mut parts = Vec::new();
        if let Some(wind) = &self.wind {
            parts.push(format!("Wind: {wind}"));
        }
        if let Some(vis) = &self.visibility {
            parts.push(format!("Visibility: {vis}"));
        }
        if !self.runway_visual_ranges.is_empty() {
            let rvrs: Vec<String> = self.runway_visual_ranges.iter().map(RunwayVisualRange::summary).collect();
            parts.push(format!("RVR: {}", rvrs.join(", ")));
        }
        if !self.present_weather.is_empty() {
            let wx: Vec<String> = self.present_weather.iter().map(PresentWeather::description).collect();
            parts.push(format!("Weather: {}", wx.join(", ")));
        }
        if !self.sky_conditions.is_empty() {
            let sky: Vec<String> = self.sky_conditions.iter().map(SkyCondition::summary).collect();
            parts.push(format!("Sky: {}", sky.join(", ")));
        }
        if let Some(temp) = &self.temperature {
            parts.push(temp.summary());
        }
        if let Some(pressure) = &self.pressure {
            parts.push(format!("Altimeter: {pressure}"));
        }
        if self.no_significant_change {
            parts.push("No significant change expected".to_string());
        }
        if !self.remarks.is_empty() {
            parts.push(format!("Remarks: {}", self.remarks));
        }

        if parts.is_empty() {
            header
        } else {
            format!("{header}\n  {}", parts.join("\n  "))
        }
    }
}

impl Report for MetarReport {
    fn base(&self) -> &ReportBase {
        &self.base
    }

    fn report_type(&self) -> ReportKind {
        self.kind
    }

    /// Observed no more than three hours before `now`.
    fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.is_current_within(now, DEFAULT_MAX_AGE_HOURS)
    }

    fn summary(&self) -> String {
        MetarReport::summary(self)
    }
}

impl std::fmt::Display for MetarReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::WindUnit;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).single().expect("valid instant")
    }

    fn report_at(observed: Option<DateTime<Utc>>) -> MetarReport {
        let base = ReportBase::new("KJFK", "METAR KJFK", observed).expect("valid base");
        MetarReport::new(base, ReportKind::Metar).expect("valid report")
    }

    #[test]
    fn currency_window() {
        assert!(report_at(Some(now() - Duration::hours(1))).is_current(now()));
        assert!(report_at(Some(now() - Duration::hours(3))).is_current(now()));
        assert!(!report_at(Some(now() - Duration::hours(4))).is_current(now()));
        assert!(!report_at(None).is_current(now()));
        assert!(report_at(Some(now() - Duration::hours(4))).is_current_within(now(), 6));
    }

    #[test]
    fn rejects_taf_kind() {
        let base = ReportBase::new("KJFK", "", None).expect("valid base");
        let err = MetarReport::new(base, ReportKind::Taf).unwrap_err();
        assert!(err.to_string().contains("must be METAR or SPECI"));
    }

    #[test]
    fn flight_category_thresholds() {
        assert_eq!(FlightCategory::classify(Some(400), Some(10.0)), FlightCategory::Lifr);
        assert_eq!(FlightCategory::classify(None, Some(0.5)), FlightCategory::Lifr);
        assert_eq!(FlightCategory::classify(Some(800), None), FlightCategory::Ifr);
        assert_eq!(FlightCategory::classify(Some(5000), Some(2.0)), FlightCategory::Ifr);
        assert_eq!(FlightCategory::classify(Some(3000), Some(10.0)), FlightCategory::Mvfr);
        assert_eq!(FlightCategory::classify(None, Some(5.0)), FlightCategory::Mvfr);
        assert_eq!(FlightCategory::classify(Some(3100), Some(6.0)), FlightCategory::Vfr);
        assert_eq!(FlightCategory::classify(None, None), FlightCategory::Vfr);
    }

    #[test]
    fn derived_fields() {
        let report = report_at(Some(now()))
            .with_wind(Wind::of(280, 16, WindUnit::Knots).expect("wind"))
            .with_visibility(Visibility::statute_miles(2.0).expect("vis"))
            .with_runway_visual_ranges(vec![
                RunwayVisualRange::of("04L", 2200).expect("rvr"),
                RunwayVisualRange::variable("22R", 1800, 2600).expect("rvr"),
                RunwayVisualRange::cleared("13").expect("rvr"),
            ])
            .with_sky_conditions(vec![
                SkyCondition::parse("FEW008").expect("sky"),
                SkyCondition::parse("OVC015").expect("sky"),
            ]);

        assert_eq!(report.ceiling_feet(), Some(1500));
        assert_eq!(report.minimum_rvr_feet(), Some(1800));
        assert_eq!(
            report.rvr_for_runway("04l").and_then(RunwayVisualRange::visual_range_feet),
            Some(2200)
        );
        assert!(report.rvr_for_runway("31").is_none());
        assert_eq!(report.flight_category(), Some(FlightCategory::Ifr));
        assert!(report.summary().starts_with("METAR from KJFK at 2025-03-15 12:00Z (IFR)"));
    }

    #[test]
    fn cavok_counts_as_ten_miles() {
        let report = report_at(Some(now())).with_visibility(Visibility::cavok());
        assert_eq!(report.visibility_statute_miles(), Some(10.0));
        assert_eq!(report.flight_category(), Some(FlightCategory::Vfr));
        assert_eq!(report_at(Some(now())).flight_category(), None);
    }
}
