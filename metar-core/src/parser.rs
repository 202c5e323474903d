//! Raw report text to decoded report aggregates.
//!
//! Each group grammar is an anchored regex tried at a [`cursor::Cursor`].
//! Groups that match but fail validation are logged and kept as unparsed
//! text; strict parsers reject the report instead.

pub mod cursor;
pub mod metar;
pub mod remarks;
pub mod taf;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt::Debug;
use tracing::{debug, warn};

use crate::{
    components::{PresentWeather, Pressure, SkyCondition, Temperature, Visibility, Wind},
    config::Config,
    decoder,
    error::{Result, WeatherError},
    model::WeatherReport,
};
use cursor::{Cursor, group};

pub use crate::model::ReportKind;
pub use metar::MetarParser;
pub use remarks::parse_remarks;
pub use taf::TafParser;

/// Decodes one family of reports.
pub trait ReportParser: Send + Sync + Debug {
    fn kind(&self) -> ReportKind;

    /// Cheap check on the leading groups; does not validate the body.
    fn can_parse(&self, raw: &str) -> bool;

    fn parse(&self, raw: &str) -> Result<WeatherReport>;
}

/// Parser for `kind` with default settings.
pub fn parser_for(kind: ReportKind) -> Box<dyn ReportParser> {
    match kind {
        ReportKind::Metar | ReportKind::Speci => Box::new(MetarParser::new()),
        ReportKind::Taf => Box::new(TafParser::new()),
    }
}

/// Parser for `kind` honouring the configured strictness.
pub fn parser_from_config(kind: ReportKind, config: &Config) -> Box<dyn ReportParser> {
    match kind {
        ReportKind::Metar | ReportKind::Speci => Box::new(MetarParser::new().strict(config.strict)),
        ReportKind::Taf => Box::new(TafParser::new().strict(config.strict)),
    }
}

/// Report kind from the leading keyword; bare reports are METARs.
pub fn detect_kind(raw: &str) -> ReportKind {
    let text = cursor::normalize(raw);
    match text.split(' ').next() {
        Some("TAF") => ReportKind::Taf,
        Some("SPECI") => ReportKind::Speci,
        _ => ReportKind::Metar,
    }
}

pub fn parse_report(raw: &str) -> Result<WeatherReport> {
    let kind = detect_kind(raw);
    debug!(%kind, "detected report kind");
    parser_for(kind).parse(raw)
}

static STATION: Lazy<Regex> = Lazy::new(|| group(r"(?P<station>[A-Z][A-Z0-9]{3})"));
static ISSUE_TIME: Lazy<Regex> = Lazy::new(|| group(r"(?P<day>\d{2})(?P<hour>\d{2})(?P<minute>\d{2})Z"));
static WIND: Lazy<Regex> = Lazy::new(|| {
    group(r"(?P<wind>(?:\d{3}|VRB)\d{2,3}(?:G\d{2,3})?(?:KT|MPS|KMH))(?:\s+(?P<var>\d{3}V\d{3}))?")
});
static VISIBILITY: Lazy<Regex> = Lazy::new(|| {
    group(r"CAVOK|[MP]?\d+\s+\d/\d{1,2}(?:SM|KM)|[MP]?\d{1,2}/\d{1,2}(?:SM|KM)|[MP]?\d+(?:SM|KM)|[MP]?\d{4}(?:NDV)?")
});
static WEATHER: Lazy<Regex> = Lazy::new(|| group(&weather_grammar()));
static SKY: Lazy<Regex> = Lazy::new(|| {
    group(r"SKC|CLR|NSC|NCD|(?:FEW|SCT|BKN|OVC)(?:\d{3}|///)(?:CB|TCU|///)?|VV(?:\d{3}|///)")
});
static TEMPERATURE: Lazy<Regex> = Lazy::new(|| group(r"M?\d{2}/(?:M?\d{2}|//)?"));
static ALTIMETER: Lazy<Regex> = Lazy::new(|| group(r"(?P<alt>A\d{4}|Q(?:NH)?\d{4})(?P<ins>INS)?"));

/// `[-+|VC][descriptor](phenomenon){1,4}`, a bare `TS`/`SH`, or `NSW`, built from the decoder tables.
fn weather_grammar() -> String {
    let descriptors = codes(decoder::DESCRIPTORS).join("|");
    let phenomena = [decoder::PRECIPITATION, decoder::OBSCURATION, decoder::OTHER_PHENOMENA]
        .into_iter()
        .flat_map(codes)
        .collect::<Vec<_>>()
        .join("|");
    format!(r"(?:[-+]|VC)?(?:{descriptors})?(?:{phenomena}){{1,4}}|(?:[-+]|VC)?(?:TS|SH)|NSW")
}

fn codes(table: &'static [(&'static str, &'static str)]) -> Vec<&'static str> {
    table.iter().map(|(code, _)| *code).collect()
}

/// One decoded weather-conditions group.
#[derive(Debug, Clone)]
pub(crate) enum ConditionGroup {
    Wind(Wind),
    Visibility(Visibility),
    Weather(PresentWeather),
    Sky(SkyCondition),
    Temperature(Temperature),
    Pressure(Pressure),
}

/// Try the shared condition grammars at the cursor.
///
/// `None` when nothing matched; otherwise the matched text and its decode result.
pub(crate) fn take_condition<'a>(cursor: &mut Cursor<'a>) -> Option<(&'a str, Result<ConditionGroup>)> {
    if let Some(caps) = cursor.take(&WIND) {
        let variability = caps.name("var").map(|m| m.as_str());
        let result = Wind::parse_with_variability(&caps["wind"], variability).map(ConditionGroup::Wind);
        return Some((Cursor::matched(&caps), result));
    }
    if let Some(caps) = cursor.take(&VISIBILITY) {
        let token = Cursor::matched(&caps);
        return Some((token, Visibility::parse(token).map(ConditionGroup::Visibility)));
    }
    if let Some(caps) = cursor.take(&WEATHER) {
        let token = Cursor::matched(&caps);
        return Some((token, PresentWeather::parse(token).map(ConditionGroup::Weather)));
    }
    if let Some(caps) = cursor.take(&SKY) {
        let token = Cursor::matched(&caps);
        return Some((token, SkyCondition::parse(token).map(ConditionGroup::Sky)));
    }
    if let Some(caps) = cursor.take(&TEMPERATURE) {
        let token = Cursor::matched(&caps);
        return Some((token, Temperature::parse(token).map(ConditionGroup::Temperature)));
    }
    if let Some(caps) = cursor.take(&ALTIMETER) {
        let token = Cursor::matched(&caps);
        return Some((token, decode_altimeter(&caps["alt"], caps.name("ins").is_some())));
    }
    None
}

/// `A2992`, `Q1013`, and the TAF form `QNH2992INS` (inches despite the Q).
fn decode_altimeter(alt: &str, inches: bool) -> Result<ConditionGroup> {
    let pressure = if alt.starts_with('A') {
        Pressure::from_metar_altimeter(alt)?
    } else if inches {
        let digits = alt.trim_start_matches("QNH").trim_start_matches('Q');
        let hundredths: f64 = digits
            .parse()
            .map_err(|_| WeatherError::parse("altimeter", alt))?;
        Pressure::inches_hg(hundredths / 100.0)?
    } else {
        Pressure::from_metar_qnh(alt)?
    };
    Ok(ConditionGroup::Pressure(pressure))
}

pub(crate) fn take_station(cursor: &mut Cursor<'_>) -> Option<String> {
    cursor.take(&STATION).map(|caps| caps["station"].to_string())
}

/// `ddhhmmZ` resolved to the latest matching instant not after `reference`'s day.
pub(crate) fn take_issue_time(cursor: &mut Cursor<'_>, reference: DateTime<Utc>) -> Option<Result<DateTime<Utc>>> {
    let caps = cursor.take(&ISSUE_TIME)?;
    Some(resolve_day_time(&caps, reference))
}

fn resolve_day_time(caps: &Captures<'_>, reference: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let day = capture_number(caps, "day")?;
    let hour = capture_number(caps, "hour")?;
    let minute = capture_number(caps, "minute")?;
    crate::components::validity::instant_on_or_before(reference, day, hour, minute)
}

pub(crate) fn capture_number<T: std::str::FromStr>(caps: &Captures<'_>, name: &str) -> Result<T> {
    let text = caps
        .name(name)
        .map(|m| m.as_str())
        .ok_or_else(|| WeatherError::parse(name, "missing"))?;
    text.parse().map_err(|_| WeatherError::parse(name, format!("'{text}' is not a number")))
}

/// Log a group that matched its grammar but failed validation.
pub(crate) fn reject(token: &str, err: &WeatherError, unparsed: &mut Vec<String>) {
    warn!(group = token, error = %err, "group failed validation");
    unparsed.push(token.to_string());
}

pub(crate) fn ensure_all_parsed(strict: bool, unparsed: &[String]) -> Result<()> {
    if strict && !unparsed.is_empty() {
        return Err(WeatherError::parse(
            "report body",
            format!("unrecognized groups: {}", unparsed.join(" ")),
        ));
    }
    Ok(())
}
