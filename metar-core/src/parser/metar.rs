use chrono::{DateTime, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::{
    ConditionGroup, ReportParser,
    cursor::{Cursor, group, normalize},
    ensure_all_parsed, reject, remarks, take_condition, take_issue_time, take_station,
};
use crate::{
    components::{PresentWeather, Pressure, RunwayVisualRange, SkyCondition, Temperature, Visibility, Wind},
    error::{Result, WeatherError},
    model::{MetarReport, QualityFlags, ReportBase, ReportKind, ReportModifier, WeatherReport},
    remark::{AutomatedMaintenanceIndicator, MaintenanceIndicatorType, MetarRemarks},
};

static KIND: Lazy<Regex> = Lazy::new(|| group(r"(?P<kind>METAR|SPECI)"));
static MODIFIER: Lazy<Regex> = Lazy::new(|| group(r"(?P<modifier>AUTO|COR|CC[A-G]|AMD|NIL|RTD|FINO|TEST)"));
static NO_SIGNIFICANT_CHANGE: Lazy<Regex> = Lazy::new(|| group(r"NOSIG"));
static RVR_MISSING: Lazy<Regex> = Lazy::new(|| group(r"RVRNO"));
static RVR: Lazy<Regex> = Lazy::new(|| group(r"R\d{2}[LCR]?/\S+"));
static SLASH_FILLER: Lazy<Regex> = Lazy::new(|| group(r"/{2,}"));

const TREND_KEYWORDS: [&str; 2] = ["TEMPO", "BECMG"];

/// Decoder for METAR and SPECI observations.
///
/// Day-of-month groups are resolved against `reference_time` (now by
/// default), rolling back into the previous month when the day is ahead.
#[derive(Debug, Clone, Default)]
pub struct MetarParser {
    reference_time: Option<DateTime<Utc>>,
    strict: bool,
}

#[derive(Default)]
struct Body {
    modifiers: Vec<ReportModifier>,
    wind: Option<Wind>,
    visibility: Option<Visibility>,
    runway_visual_ranges: Vec<RunwayVisualRange>,
    present_weather: Vec<PresentWeather>,
    sky_conditions: Vec<SkyCondition>,
    temperature: Option<Temperature>,
    pressure: Option<Pressure>,
    maintenance: Vec<AutomatedMaintenanceIndicator>,
    no_significant_change: bool,
    unparsed: Vec<String>,
}

impl MetarParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference_time(mut self, reference_time: DateTime<Utc>) -> Self {
        self.reference_time = Some(reference_time);
        self
    }

    /// Reject reports containing groups that could not be decoded.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn parse_metar(&self, raw: &str) -> Result<MetarReport> {
        let reference = self.reference_time.unwrap_or_else(Utc::now);
        let text = normalize(raw);
        if text.is_empty() {
            return Err(WeatherError::parse("report", "empty input"));
        }

        let (body_text, remarks_text) = Cursor::split_at_keyword(&text, "RMK");
        let body_text = strip_trend(body_text);
        let mut cursor = Cursor::new(body_text);

        let kind = match cursor.take(&KIND) {
            Some(caps) => ReportKind::try_from(&caps["kind"])?,
            None => ReportKind::Metar,
        };
        let station = take_station(&mut cursor)
            .ok_or_else(|| WeatherError::parse("station", format!("no ICAO identifier in '{text}'")))?;

        let mut body = Body::default();
        let observation_time = match take_issue_time(&mut cursor, reference) {
            Some(Ok(time)) => Some(time),
            Some(Err(err)) if self.strict => return Err(err),
            Some(Err(err)) => {
                warn!(%station, error = %err, "observation time failed validation");
                None
            }
            None => {
                warn!(%station, "report has no observation time");
                None
            }
        };

        decode_body(&mut cursor, &mut body);
        ensure_all_parsed(self.strict, &body.unparsed)?;

        let observation_hour = observation_time.map(|t| t.hour());
        let mut remarks_builder = MetarRemarks::builder();
        for indicator in body.maintenance.drain(..) {
            remarks_builder = remarks_builder.add_maintenance_indicator(indicator);
        }
        let remarks = match remarks_text {
            Some(text) => remarks::parse_into(remarks_builder, text, observation_hour),
            None => remarks_builder.build(),
        };

        let flags = QualityFlags::new(body.modifiers, remarks.automated_station_type());
        let base = ReportBase::new(&station, raw.trim(), observation_time)?
            .with_quality_flags(flags)
            .with_ingestion_time(reference);

        let mut report = MetarReport::new(base, kind)?
            .with_runway_visual_ranges(body.runway_visual_ranges)
            .with_present_weather(body.present_weather)
            .with_sky_conditions(body.sky_conditions)
            .with_remarks(remarks)
            .with_no_significant_change(body.no_significant_change)
            .with_unparsed(body.unparsed);
        if let Some(wind) = body.wind {
            report = report.with_wind(wind);
        }
        if let Some(visibility) = body.visibility {
            report = report.with_visibility(visibility);
        }
        if let Some(temperature) = body.temperature {
            report = report.with_temperature(temperature);
        }
        if let Some(pressure) = body.pressure {
            report = report.with_pressure(pressure);
        }

        debug!(%station, %kind, "decoded observation");
        Ok(report)
    }
}

fn decode_body(cursor: &mut Cursor<'_>, body: &mut Body) {
    while !cursor.is_empty() {
        if let Some(caps) = cursor.take(&MODIFIER) {
            match ReportModifier::try_from(&caps["modifier"]) {
                Ok(ReportModifier::Nil) => {
                    body.modifiers.push(ReportModifier::Nil);
                    if !cursor.is_empty() {
                        debug!(rest = cursor.rest(), "ignoring groups after NIL");
                    }
                    return;
                }
                Ok(modifier) => body.modifiers.push(modifier),
                Err(err) => reject(Cursor::matched(&caps), &err, &mut body.unparsed),
            }
            continue;
        }
        if cursor.take(&NO_SIGNIFICANT_CHANGE).is_some() {
            body.no_significant_change = true;
            continue;
        }
        if cursor.take(&RVR_MISSING).is_some() {
            body.maintenance
                .push(AutomatedMaintenanceIndicator::new(MaintenanceIndicatorType::RvrNo, None));
            continue;
        }
        if let Some(caps) = cursor.take(&RVR) {
            let token = Cursor::matched(&caps);
            match RunwayVisualRange::parse(token) {
                Ok(rvr) => body.runway_visual_ranges.push(rvr),
                Err(err) => reject(token, &err, &mut body.unparsed),
            }
            continue;
        }
        if let Some((token, decoded)) = take_condition(cursor) {
            match decoded {
                Ok(group) => body.apply(group),
                Err(err) => reject(token, &err, &mut body.unparsed),
            }
            continue;
        }
        if cursor.take(&SLASH_FILLER).is_some() {
            continue;
        }
        if let Some(token) = cursor.next_token() {
            debug!(group = token, "unrecognized group");
            body.unparsed.push(token.to_string());
        }
    }
}

impl Body {
    fn apply(&mut self, group: ConditionGroup) {
        match group {
            ConditionGroup::Wind(wind) => self.wind = Some(wind),
            ConditionGroup::Visibility(visibility) => self.visibility = Some(visibility),
            ConditionGroup::Weather(weather) => self.present_weather.push(weather),
            ConditionGroup::Sky(layer) => self.sky_conditions.push(layer),
            ConditionGroup::Temperature(temperature) => self.temperature = Some(temperature),
            ConditionGroup::Pressure(pressure) => self.pressure = Some(pressure),
        }
    }
}

/// Drop an appended `TEMPO`/`BECMG` trend forecast.
fn strip_trend(body: &str) -> &str {
    TREND_KEYWORDS
        .iter()
        .filter_map(|keyword| match Cursor::split_at_keyword(body, keyword) {
            (before, Some(trend)) => Some((before, trend)),
            _ => None,
        })
        .min_by_key(|(before, _)| before.len())
        .map_or(body, |(before, trend)| {
            debug!(trend, "ignoring trend forecast");
            before
        })
}

impl ReportParser for MetarParser {
    fn kind(&self) -> ReportKind {
        ReportKind::Metar
    }

    fn can_parse(&self, raw: &str) -> bool {
        let text = normalize(raw);
        let mut cursor = Cursor::new(&text);
        if cursor.peek_token() == Some("TAF") {
            return false;
        }
        cursor.take(&KIND);
        take_station(&mut cursor).is_some() && take_issue_time(&mut cursor, Utc::now()).is_some()
    }

    fn parse(&self, raw: &str) -> Result<WeatherReport> {
        self.parse_metar(raw).map(WeatherReport::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        components::{SkyCoverage, VisibilityUnit},
        model::{FlightCategory, Report},
        remark::AutomatedStationType,
    };
    use chrono::TimeZone;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 13, 0, 0).single().expect("valid instant")
    }

    fn parser() -> MetarParser {
        MetarParser::new().with_reference_time(reference())
    }

    #[test]
    fn decodes_full_us_observation() {
        let report = parser()
            .parse_metar(
                "METAR KJFK 151251Z 28016G25KT 250V310 10SM -RA FEW025 BKN100 OVC250 22/12 A3015 RMK AO2 SLP210 T02220122",
            )
            .expect("valid metar");

        assert_eq!(report.base().station_id(), "KJFK");
        assert_eq!(
            report.base().observation_time(),
            Utc.with_ymd_and_hms(2025, 3, 15, 12, 51, 0).single()
        );
        let wind = report.wind().expect("wind");
        assert_eq!(wind.direction_degrees(), Some(280));
        assert_eq!(wind.gust(), Some(25));
        assert_eq!(wind.variability_from(), Some(250));
        assert_eq!(report.visibility().and_then(|v| v.to_statute_miles()), Some(10.0));
        assert_eq!(report.present_weather().len(), 1);
        assert_eq!(report.sky_conditions().len(), 3);
        assert_eq!(report.ceiling_feet(), Some(10_000));
        assert_eq!(report.temperature().and_then(|t| t.celsius()), Some(22.0));
        assert!((report.pressure().expect("altimeter").to_inches_hg() - 30.15).abs() < 1e-9);
        assert_eq!(report.remarks().automated_station_type(), Some(AutomatedStationType::Ao2));
        assert!(report.base().quality_flags().is_automated());
        assert_eq!(report.flight_category(), Some(FlightCategory::Vfr));
        assert!(report.has_precipitation());
        assert!(report.unparsed().is_empty());
        assert_eq!(report.base().ingestion_time(), reference());
    }

    #[test]
    fn decodes_speci_with_runway_range() {
        let report = parser()
            .parse_metar("SPECI KORD 151315Z 36010KT 1/2SM R28L/2400V4000FT +SN FG VV003 M05/M06 A2980")
            .expect("valid speci");

        assert_eq!(report.kind(), ReportKind::Speci);
        assert!(report.is_speci());
        assert_eq!(report.minimum_rvr_feet(), Some(2400));
        assert!(report.rvr_for_runway("28l").is_some());
        assert_eq!(report.present_weather().len(), 2);
        assert_eq!(report.ceiling_feet(), Some(300));
        assert_eq!(report.flight_category(), Some(FlightCategory::Lifr));
        assert_eq!(report.report_type(), ReportKind::Speci);
    }

    #[test]
    fn decodes_automated_station() {
        let report = parser()
            .parse_metar("KDEN 151253Z AUTO 00000KT 10SM CLR 10/M05 A3001 RMK AO1 SLPNO")
            .expect("valid metar");

        let flags = report.base().quality_flags();
        assert!(flags.has(ReportModifier::Auto));
        assert_eq!(flags.station_type(), Some(AutomatedStationType::Ao1));
        assert!(report.wind().expect("wind").is_calm());
        assert_eq!(report.sky_conditions()[0].coverage(), SkyCoverage::Clr);
        assert_eq!(report.kind(), ReportKind::Metar);
    }

    #[test]
    fn international_metar_with_trend() {
        let report = parser()
            .parse_metar("METAR EGLL 151150Z 24010KT 9999 SCT030 12/07 Q1015 NOSIG=")
            .expect("valid metar");
        assert!(report.no_significant_change());
        let vis = report.visibility().expect("visibility");
        assert_eq!(vis.unit(), Some(VisibilityUnit::Meters));
        assert!(vis.is_greater_than());

        let trended = parser()
            .parse_metar("METAR EGLL 151150Z 24010KT 9999 SCT030 12/07 Q1015 BECMG 4000 RA")
            .expect("valid metar");
        assert!(trended.unparsed().is_empty());
        assert!(trended.present_weather().is_empty());
    }

    #[test]
    fn nil_report_stops_decoding() {
        let report = parser().parse_metar("METAR KXYZ 151300Z NIL").expect("nil report");
        assert!(report.base().quality_flags().is_nil());
        assert!(report.wind().is_none());
        assert_eq!(report.flight_category(), None);
    }

    #[test]
    fn unknown_groups_are_kept_unless_strict() {
        let raw = "METAR KJFK 151251Z 28016KT 10SM ZZZZ FEW250 22/12 A3015";
        let report = parser().parse_metar(raw).expect("lenient parse");
        assert_eq!(report.unparsed(), ["ZZZZ"]);
        assert_eq!(report.sky_conditions().len(), 1);

        let err = parser().strict(true).parse_metar(raw).unwrap_err();
        assert!(err.to_string().contains("ZZZZ"));
    }

    #[test]
    fn invalid_group_is_logged_and_skipped() {
        let report = parser()
            .parse_metar("METAR KJFK 151251Z 40016KT 10SM FEW250 22/12 A3015")
            .expect("lenient parse");
        assert!(report.wind().is_none());
        assert_eq!(report.unparsed(), ["40016KT"]);
    }

    #[test]
    fn day_ahead_of_reference_rolls_back_a_month() {
        let reference = Utc.with_ymd_and_hms(2025, 3, 1, 1, 0, 0).single().expect("valid instant");
        let report = MetarParser::new()
            .with_reference_time(reference)
            .parse_metar("KBOS 282354Z 18005KT 10SM SKC 05/M01 A3002")
            .expect("valid metar");
        assert_eq!(
            report.base().observation_time(),
            Utc.with_ymd_and_hms(2025, 2, 28, 23, 54, 0).single()
        );
    }

    #[test]
    fn remarks_use_observation_hour() {
        let report = parser()
            .parse_metar("KSEA 151453Z 18005KT 10SM BKN040 08/04 A3002 RMK AO2 RVRNO 60012")
            .expect("valid metar");
        let remarks = report.remarks();
        assert_eq!(remarks.six_hour_precipitation().map(|p| p.period_hours()), Some(3));
        assert!(remarks.maintenance_indicators()[0].is_rvr_not_available());
    }

    #[test]
    fn body_rvrno_becomes_maintenance_indicator() {
        let report = parser()
            .parse_metar("KSEA 151453Z 18005KT 10SM RVRNO BKN040 08/04 A3002")
            .expect("valid metar");
        assert!(report.remarks().maintenance_indicators()[0].is_rvr_not_available());
        assert!(report.unparsed().is_empty());
    }

    #[test]
    fn missing_station_is_an_error() {
        let err = parser().parse_metar("METAR 151251Z 28016KT").unwrap_err();
        assert!(err.to_string().contains("Cannot parse station group"));
        assert!(parser().parse_metar("   ").is_err());
    }

    #[test]
    fn can_parse_checks_header() {
        let parser = parser();
        assert!(parser.can_parse("KJFK 151251Z 28016KT"));
        assert!(parser.can_parse("SPECI KJFK 151251Z 28016KT"));
        assert!(!parser.can_parse("TAF KJFK 151130Z 1512/1618"));
        assert!(!parser.can_parse("hello world"));
        assert!(parser.parse("KJFK 151251Z 28016KT").expect("valid").as_metar().is_some());
    }
}
