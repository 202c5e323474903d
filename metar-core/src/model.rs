//! Decoded report aggregates.
//!
//! Every report embeds a [`ReportBase`] (station, raw text, time, position,
//! quality flags). [`WeatherReport`] is the tagged union handed to storage
//! or presentation layers.

pub mod conditions;
pub mod forecast;
pub mod location;
pub mod metar;
pub mod taf;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

use crate::{
    error::{Result, WeatherError, ensure},
    remark::AutomatedStationType,
};

pub use conditions::{WeatherConditions, WeatherConditionsBuilder};
pub use forecast::{ChangeIndicator, ForecastPeriod};
pub use location::GeoLocation;
pub use metar::{FlightCategory, MetarReport};
pub use taf::TafReport;

static STATION_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9]{3}$").expect("station pattern must compile"));

/// Report family, taken from the leading keyword of the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportKind {
    Metar,
    Speci,
    Taf,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Metar => "METAR",
            ReportKind::Speci => "SPECI",
            ReportKind::Taf => "TAF",
        }
    }

    pub const fn all() -> &'static [ReportKind] {
        &[ReportKind::Metar, ReportKind::Speci, ReportKind::Taf]
    }

    pub fn is_observation(&self) -> bool {
        matches!(self, ReportKind::Metar | ReportKind::Speci)
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ReportKind {
    type Error = WeatherError;

    fn try_from(value: &str) -> Result<Self> {
        let upper = value.trim().to_uppercase();
        ReportKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == upper)
            .ok_or_else(|| WeatherError::UnknownReportType { value: value.to_string() })
    }
}

/// Report modifier groups that follow the issue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportModifier {
    Auto,
    Cor,
    Amd,
    Nil,
    Rtd,
    Fino,
    Test,
}

impl ReportModifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportModifier::Auto => "AUTO",
            ReportModifier::Cor => "COR",
            ReportModifier::Amd => "AMD",
            ReportModifier::Nil => "NIL",
            ReportModifier::Rtd => "RTD",
            ReportModifier::Fino => "FINO",
            ReportModifier::Test => "TEST",
        }
    }

    pub const fn all() -> &'static [ReportModifier] {
        &[
            ReportModifier::Auto,
            ReportModifier::Cor,
            ReportModifier::Amd,
            ReportModifier::Nil,
            ReportModifier::Rtd,
            ReportModifier::Fino,
            ReportModifier::Test,
        ]
    }

    pub fn description(&self) -> &'static str {
        match self {
            ReportModifier::Auto => "Fully automated report",
            ReportModifier::Cor => "Corrected report",
            ReportModifier::Amd => "Amended report",
            ReportModifier::Nil => "Missing report",
            ReportModifier::Rtd => "Delayed report",
            ReportModifier::Fino => "Observation not available",
            ReportModifier::Test => "Test report",
        }
    }
}

impl std::fmt::Display for ReportModifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ReportModifier {
    type Error = WeatherError;

    /// `CCA`..`CCG` correction sequence codes map to [`ReportModifier::Cor`].
    fn try_from(value: &str) -> Result<Self> {
        let upper = value.trim().to_uppercase();
        if upper.len() == 3 && upper.starts_with("CC") && matches!(upper.as_bytes()[2], b'A'..=b'G') {
            return Ok(ReportModifier::Cor);
        }
        ReportModifier::all()
            .iter()
            .copied()
            .find(|m| m.as_str() == upper)
            .ok_or_else(|| WeatherError::validation(format!("Unknown report modifier: {value}")))
    }
}

/// Station quality-control indicators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityFlags {
    modifiers: Vec<ReportModifier>,
    station_type: Option<AutomatedStationType>,
}

impl QualityFlags {
    pub fn new(modifiers: Vec<ReportModifier>, station_type: Option<AutomatedStationType>) -> Self {
        let mut unique = Vec::with_capacity(modifiers.len());
        for m in modifiers {
            if !unique.contains(&m) {
                unique.push(m);
            }
        }
        Self {
            modifiers: unique,
            station_type,
        }
    }

    pub fn modifiers(&self) -> &[ReportModifier] {
        &self.modifiers
    }

    pub fn station_type(&self) -> Option<AutomatedStationType> {
        self.station_type
    }

    pub fn has(&self, modifier: ReportModifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn is_automated(&self) -> bool {
        self.has(ReportModifier::Auto) || self.station_type.is_some()
    }

    pub fn is_corrected(&self) -> bool {
        self.has(ReportModifier::Cor)
    }

    pub fn is_nil(&self) -> bool {
        self.has(ReportModifier::Nil)
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty() && self.station_type.is_none()
    }

    pub fn summary(&self) -> String {
        self.modifiers
            .iter()
            .map(ReportModifier::as_str)
            .chain(self.station_type.as_ref().map(AutomatedStationType::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for QualityFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Fields shared by every report kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportBase {
    station_id: String,
    raw_text: String,
    observation_time: Option<DateTime<Utc>>,
    location: Option<GeoLocation>,
    quality_flags: QualityFlags,
    ingestion_time: DateTime<Utc>,
}

impl ReportBase {
    /// Station ids are four characters, a letter followed by letters or digits.
    pub fn new(station_id: &str, raw_text: &str, observation_time: Option<DateTime<Utc>>) -> Result<Self> {
        let station_id = station_id.trim().to_uppercase();
        ensure(STATION_ID.is_match(&station_id), || {
            format!("Station ID must be 4 characters (ICAO code), got: '{station_id}'")
        })?;

        Ok(Self {
            station_id,
            raw_text: raw_text.trim().to_string(),
            observation_time,
            location: None,
            quality_flags: QualityFlags::default(),
            ingestion_time: Utc::now(),
        })
    }

    pub fn with_location(mut self, location: GeoLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_quality_flags(mut self, flags: QualityFlags) -> Self {
        self.quality_flags = flags;
        self
    }

    pub fn with_ingestion_time(mut self, time: DateTime<Utc>) -> Self {
        self.ingestion_time = time;
        self
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn observation_time(&self) -> Option<DateTime<Utc>> {
        self.observation_time
    }

    pub fn location(&self) -> Option<&GeoLocation> {
        self.location.as_ref()
    }

    pub fn quality_flags(&self) -> &QualityFlags {
        &self.quality_flags
    }

    pub fn ingestion_time(&self) -> DateTime<Utc> {
        self.ingestion_time
    }

    /// Age of the report at `now`, if its time is known.
    pub fn age(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.observation_time.map(|t| now - t)
    }

    pub fn summary(&self, kind: ReportKind) -> String {
        match self.observation_time {
            Some(t) => format!("{kind} from {} at {}", self.station_id, t.format("%Y-%m-%d %H:%MZ")),
            None => format!("{kind} from {}", self.station_id),
        }
    }
}

/// Behaviour shared by decoded reports.
pub trait Report {
    fn base(&self) -> &ReportBase;

    fn report_type(&self) -> ReportKind;

    fn is_current(&self, now: DateTime<Utc>) -> bool;

    fn summary(&self) -> String;

    fn station_id(&self) -> &str {
        self.base().station_id()
    }
}

/// Any decoded report, tagged by `reportType` when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reportType")]
pub enum WeatherReport {
    #[serde(rename = "METAR")]
    Metar(MetarReport),
    #[serde(rename = "TAF")]
    Taf(TafReport),
}

impl WeatherReport {
    pub fn as_metar(&self) -> Option<&MetarReport> {
        match self {
            WeatherReport::Metar(m) => Some(m),
            WeatherReport::Taf(_) => None,
        }
    }

    pub fn as_taf(&self) -> Option<&TafReport> {
        match self {
            WeatherReport::Taf(t) => Some(t),
            WeatherReport::Metar(_) => None,
        }
    }

    fn inner(&self) -> &dyn Report {
        match self {
            WeatherReport::Metar(m) => m,
            WeatherReport::Taf(t) => t,
        }
    }
}

impl Report for WeatherReport {
    fn base(&self) -> &ReportBase {
        self.inner().base()
    }

    fn report_type(&self) -> ReportKind {
        self.inner().report_type()
    }

    fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.inner().is_current(now)
    }

    fn summary(&self) -> String {
        self.inner().summary()
    }
}

impl From<MetarReport> for WeatherReport {
    fn from(report: MetarReport) -> Self {
        WeatherReport::Metar(report)
    }
}

impl From<TafReport> for WeatherReport {
    fn from(report: TafReport) -> Self {
        WeatherReport::Taf(report)
    }
}

impl std::fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).single().expect("valid instant")
    }

    #[test]
    fn report_kind_codes() {
        assert_eq!(ReportKind::try_from("speci").expect("speci"), ReportKind::Speci);
        let err = ReportKind::try_from("PIREP").unwrap_err();
        assert!(matches!(err, WeatherError::UnknownReportType { .. }));
        assert!(ReportKind::Metar.is_observation());
        assert!(!ReportKind::Taf.is_observation());
    }

    #[test]
    fn modifiers_accept_correction_sequence() {
        assert_eq!(ReportModifier::try_from("CCB").expect("cor"), ReportModifier::Cor);
        assert_eq!(ReportModifier::try_from("auto").expect("auto"), ReportModifier::Auto);
        assert!(ReportModifier::try_from("CCZ").is_err());
    }

    #[test]
    fn quality_flags_dedupe_and_render() {
        let flags = QualityFlags::new(
            vec![ReportModifier::Auto, ReportModifier::Cor, ReportModifier::Auto],
            Some(AutomatedStationType::Ao2),
        );
        assert_eq!(flags.modifiers(), [ReportModifier::Auto, ReportModifier::Cor]);
        assert!(flags.is_automated());
        assert!(flags.is_corrected());
        assert!(!flags.is_nil());
        assert_eq!(flags.summary(), "AUTO COR AO2");
        assert!(QualityFlags::default().is_empty());
    }

    #[test]
    fn base_validates_station() {
        let base = ReportBase::new("kjfk", "METAR KJFK ...", Some(fixed())).expect("valid");
        assert_eq!(base.station_id(), "KJFK");
        assert_eq!(base.summary(ReportKind::Metar), "METAR from KJFK at 2025-03-15 12:00Z");

        let err = ReportBase::new("JFK", "", None).unwrap_err();
        assert!(err.to_string().contains("Station ID must be 4 characters"));
        assert!(ReportBase::new("1ABC", "", None).is_err());
    }

    #[test]
    fn serialized_reports_carry_type_tag() {
        let base = ReportBase::new("KJFK", "METAR KJFK 151200Z", Some(fixed()))
            .expect("valid")
            .with_ingestion_time(fixed());
        let report = WeatherReport::from(MetarReport::new(base, ReportKind::Metar).expect("metar"));

        let json = serde_json::to_value(&report).expect("serializes");
        assert_eq!(json["reportType"], "METAR");
        assert_eq!(json["base"]["stationId"], "KJFK");

        let back: WeatherReport = serde_json::from_value(json).expect("deserializes");
        assert_eq!(back, report);
        assert_eq!(back.report_type(), ReportKind::Metar);
        assert!(back.as_taf().is_none());
    }
}
