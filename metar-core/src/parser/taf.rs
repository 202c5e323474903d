use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, warn};

use super::{
    ConditionGroup, ReportParser, capture_number,
    cursor::{Cursor, group, normalize},
    ensure_all_parsed, reject, take_condition, take_issue_time, take_station,
};
use crate::{
    components::{Temperature, ValidityPeriod, validity::instant_on_or_after},
    error::{Result, WeatherError},
    model::{
        ChangeIndicator, ForecastPeriod, QualityFlags, ReportBase, ReportKind, ReportModifier, TafReport,
        WeatherConditions, WeatherConditionsBuilder, WeatherReport,
    },
};

static TAF: Lazy<Regex> = Lazy::new(|| group(r"TAF"));
static HEADER_MODIFIER: Lazy<Regex> = Lazy::new(|| group(r"(?P<modifier>AMD|COR)"));
static NIL: Lazy<Regex> = Lazy::new(|| group(r"NIL"));
static VALIDITY: Lazy<Regex> = Lazy::new(|| group(r"\d{4}/\d{4}"));
static FROM: Lazy<Regex> = Lazy::new(|| group(r"FM(?P<day>\d{2})(?P<hour>\d{2})(?P<minute>\d{2})"));
static CHANGE: Lazy<Regex> = Lazy::new(|| {
    group(
        r"(?:PROB(?P<prob>30|40)(?:\s+(?P<tempo>TEMPO))?|(?P<kind>TEMPO|BECMG))\s+(?P<fd>\d{2})(?P<fh>\d{2})/(?P<td>\d{2})(?P<th>\d{2})",
    )
});
static EXTREME_TEMPERATURE: Lazy<Regex> = Lazy::new(|| {
    group(r"T(?P<kind>[XN])(?P<minus>M)?(?P<value>\d{2})/(?P<day>\d{2})(?P<hour>\d{2})Z")
});
static SLASH_FILLER: Lazy<Regex> = Lazy::new(|| group(r"/{2,}"));

/// Decoder for terminal aerodrome forecasts.
///
/// The issue time is resolved against `reference_time` (now by default);
/// validity and change-group times roll forward from the issue time.
#[derive(Debug, Clone, Default)]
pub struct TafParser {
    reference_time: Option<DateTime<Utc>>,
    strict: bool,
}

/// Change group being collected until the next header or the end of text.
struct PendingPeriod {
    header: String,
    indicator: ChangeIndicator,
    change_time: Option<DateTime<Utc>>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    probability: Option<u8>,
    tempo: bool,
    conditions: WeatherConditionsBuilder,
}

impl PendingPeriod {
    fn base(validity: Option<&ValidityPeriod>) -> Self {
        Self {
            header: "BASE".into(),
            indicator: ChangeIndicator::Base,
            change_time: None,
            start: validity.map(ValidityPeriod::valid_from),
            end: validity.map(ValidityPeriod::valid_to),
            probability: None,
            tempo: false,
            conditions: WeatherConditions::builder(),
        }
    }

    fn starting_at(header: &str, change_time: DateTime<Utc>) -> Self {
        Self {
            header: header.into(),
            indicator: ChangeIndicator::Fm,
            change_time: Some(change_time),
            start: None,
            end: None,
            probability: None,
            tempo: false,
            conditions: WeatherConditions::builder(),
        }
    }

    fn window(header: &str, indicator: ChangeIndicator, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            header: header.into(),
            indicator,
            change_time: None,
            start: Some(start),
            end: Some(end),
            probability: None,
            tempo: false,
            conditions: WeatherConditions::builder(),
        }
    }

    fn apply(&mut self, group: ConditionGroup) {
        let builder = std::mem::take(&mut self.conditions);
        self.conditions = match group {
            ConditionGroup::Wind(wind) => builder.wind(wind),
            ConditionGroup::Visibility(visibility) => builder.visibility(visibility),
            ConditionGroup::Weather(weather) => builder.add_present_weather(weather),
            ConditionGroup::Sky(layer) => builder.add_sky_condition(layer),
            ConditionGroup::Temperature(temperature) => builder.temperature(temperature),
            ConditionGroup::Pressure(pressure) => builder.pressure(pressure),
        };
    }

    fn finish(self) -> Result<ForecastPeriod> {
        ForecastPeriod::new(
            self.indicator,
            self.change_time,
            self.start,
            self.end,
            self.probability,
            self.tempo,
            self.conditions.build(),
        )
    }
}

#[derive(Default)]
struct Extremes {
    max: Option<(f64, DateTime<Utc>)>,
    min: Option<(f64, DateTime<Utc>)>,
}

impl TafParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference_time(mut self, reference_time: DateTime<Utc>) -> Self {
        self.reference_time = Some(reference_time);
        self
    }

    /// Reject forecasts with undecodable groups or invalid change periods.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn parse_taf(&self, raw: &str) -> Result<TafReport> {
        let reference = self.reference_time.unwrap_or_else(Utc::now);
        let text = normalize(raw);
        if text.is_empty() {
            return Err(WeatherError::parse("report", "empty input"));
        }

        let (body_text, remarks) = Cursor::split_at_keyword(&text, "RMK");
        if let Some(remarks) = remarks {
            debug!(remarks, "ignoring forecast remarks");
        }
        let mut cursor = Cursor::new(body_text);
        cursor.take(&TAF);

        let mut modifiers = take_modifiers(&mut cursor);
        let station = take_station(&mut cursor)
            .ok_or_else(|| WeatherError::parse("station", format!("no ICAO identifier in '{text}'")))?;
        modifiers.extend(take_modifiers(&mut cursor));

        let mut unparsed = Vec::new();
        let issue_time = match take_issue_time(&mut cursor, reference) {
            Some(Ok(time)) => Some(time),
            Some(Err(err)) if self.strict => return Err(err),
            Some(Err(err)) => {
                warn!(%station, error = %err, "issue time failed validation");
                None
            }
            None => {
                warn!(%station, "forecast has no issue time");
                None
            }
        };

        if cursor.take(&NIL).is_some() {
            modifiers.push(ReportModifier::Nil);
        }
        let anchor = issue_time.unwrap_or(reference);

        let validity = match cursor.take(&VALIDITY) {
            Some(caps) => {
                let token = Cursor::matched(&caps);
                match ValidityPeriod::parse(token, anchor) {
                    Ok(period) => Some(period),
                    Err(err) if self.strict => return Err(err),
                    Err(err) => {
                        reject(token, &err, &mut unparsed);
                        None
                    }
                }
            }
            None => None,
        };

        let is_nil = modifiers.contains(&ReportModifier::Nil);
        let amended = modifiers.contains(&ReportModifier::Amd);
        let corrected = modifiers.contains(&ReportModifier::Cor);
        let base = ReportBase::new(&station, raw.trim(), issue_time)?
            .with_quality_flags(QualityFlags::new(modifiers, None))
            .with_ingestion_time(reference);
        let mut report = TafReport::new(base, issue_time, validity)
            .with_amended(amended)
            .with_corrected(corrected);

        if is_nil {
            debug!(%station, "NIL forecast");
            return Ok(report);
        }

        let period_anchor = validity.as_ref().map_or(anchor, ValidityPeriod::valid_from);
        let mut extremes = Extremes::default();
        let mut periods = Vec::new();
        let mut pending = Some(PendingPeriod::base(validity.as_ref()));

        while !cursor.is_empty() {
            if let Some(caps) = cursor.take(&FROM) {
                let header = Cursor::matched(&caps);
                self.close(pending.take(), &mut periods, &mut unparsed)?;
                pending = self.open(header, from_time(&caps, period_anchor), &mut unparsed)?;
                continue;
            }
            if let Some(caps) = cursor.take(&CHANGE) {
                let header = Cursor::matched(&caps);
                self.close(pending.take(), &mut periods, &mut unparsed)?;
                pending = self.open(header, change_window(&caps, header, period_anchor), &mut unparsed)?;
                continue;
            }
            if let Some(caps) = cursor.take(&EXTREME_TEMPERATURE) {
                let token = Cursor::matched(&caps);
                match extreme(&caps, period_anchor) {
                    Ok((true, value)) => extremes.max = Some(value),
                    Ok((false, value)) => extremes.min = Some(value),
                    Err(err) => reject(token, &err, &mut unparsed),
                }
                continue;
            }
            if let Some((token, decoded)) = take_condition(&mut cursor) {
                match (decoded, pending.as_mut()) {
                    (Ok(group), Some(period)) => period.apply(group),
                    (Ok(_), None) => debug!(group = token, "dropping group of rejected change period"),
                    (Err(err), _) => reject(token, &err, &mut unparsed),
                }
                continue;
            }
            if cursor.take(&SLASH_FILLER).is_some() {
                continue;
            }
            if let Some(token) = cursor.next_token() {
                debug!(group = token, "unrecognized group");
                unparsed.push(token.to_string());
            }
        }
        self.close(pending.take(), &mut periods, &mut unparsed)?;
        ensure_all_parsed(self.strict, &unparsed)?;

        for period in periods {
            report = report.add_forecast_period(period);
        }
        if extremes.max.is_some() || extremes.min.is_some() {
            let (max, max_time) = extremes.max.unzip();
            let (min, min_time) = extremes.min.unzip();
            match Temperature::with_forecast(None, None, max, max_time, min, min_time) {
                Ok(temperature) => report = report.with_forecast_temperature(temperature),
                Err(err) if self.strict => return Err(err),
                Err(err) => warn!(%station, error = %err, "forecast extremes failed validation"),
            }
        }

        debug!(%station, periods = report.forecast_periods().len(), "decoded forecast");
        Ok(report.with_unparsed(unparsed))
    }

    /// Start a period from a decoded header; an invalid header drops the period.
    fn open(
        &self,
        header: &str,
        decoded: Result<PendingPeriod>,
        unparsed: &mut Vec<String>,
    ) -> Result<Option<PendingPeriod>> {
        match decoded {
            Ok(period) => Ok(Some(period)),
            Err(err) if self.strict => Err(err),
            Err(err) => {
                reject(header, &err, unparsed);
                Ok(None)
            }
        }
    }

    fn close(
        &self,
        pending: Option<PendingPeriod>,
        periods: &mut Vec<ForecastPeriod>,
        unparsed: &mut Vec<String>,
    ) -> Result<()> {
        let Some(pending) = pending else {
            return Ok(());
        };
        let header = pending.header.clone();
        match pending.finish() {
            Ok(period) => periods.push(period),
            Err(err) if self.strict => return Err(err),
            Err(err) => reject(&header, &err, unparsed),
        }
        Ok(())
    }
}

fn take_modifiers(cursor: &mut Cursor<'_>) -> Vec<ReportModifier> {
    let mut modifiers = Vec::new();
    while let Some(caps) = cursor.take(&HEADER_MODIFIER) {
        if let Ok(modifier) = ReportModifier::try_from(&caps["modifier"]) {
            modifiers.push(modifier);
        }
    }
    modifiers
}

fn from_time(caps: &Captures<'_>, anchor: DateTime<Utc>) -> Result<PendingPeriod> {
    let time = instant_on_or_after(
        anchor,
        capture_number(caps, "day")?,
        capture_number(caps, "hour")?,
        capture_number(caps, "minute")?,
    )?;
    Ok(PendingPeriod::starting_at(Cursor::matched(caps), time))
}

/// `TEMPO ddhh/ddhh`, `BECMG ...`, `PROB30 ...` or `PROB40 TEMPO ...`.
fn change_window(caps: &Captures<'_>, header: &str, anchor: DateTime<Utc>) -> Result<PendingPeriod> {
    let start = instant_on_or_after(anchor, capture_number(caps, "fd")?, capture_number(caps, "fh")?, 0)?;
    let end = instant_on_or_after(start, capture_number(caps, "td")?, capture_number(caps, "th")?, 0)?;

    if caps.name("prob").is_some() {
        let mut period = PendingPeriod::window(header, ChangeIndicator::Prob, start, end);
        period.probability = Some(capture_number(caps, "prob")?);
        period.tempo = caps.name("tempo").is_some();
        return Ok(period);
    }
    let indicator = ChangeIndicator::try_from(&caps["kind"])?;
    Ok(PendingPeriod::window(header, indicator, start, end))
}

/// `TX18/1515Z` or `TNM03/1606Z`; `true` for a maximum.
fn extreme(caps: &Captures<'_>, anchor: DateTime<Utc>) -> Result<(bool, (f64, DateTime<Utc>))> {
    let degrees: u8 = capture_number(caps, "value")?;
    let celsius = if caps.name("minus").is_some() {
        -f64::from(degrees)
    } else {
        f64::from(degrees)
    };
    let time = instant_on_or_after(anchor, capture_number(caps, "day")?, capture_number(caps, "hour")?, 0)?;
    Ok((&caps["kind"] == "X", (celsius, time)))
}

impl ReportParser for TafParser {
    fn kind(&self) -> ReportKind {
        ReportKind::Taf
    }

    fn can_parse(&self, raw: &str) -> bool {
        let text = normalize(raw);
        let mut cursor = Cursor::new(&text);
        if cursor.take(&TAF).is_none() {
            return false;
        }
        take_modifiers(&mut cursor);
        take_station(&mut cursor).is_some() && take_issue_time(&mut cursor, Utc::now()).is_some()
    }

    fn parse(&self, raw: &str) -> Result<WeatherReport> {
        self.parse_taf(raw).map(WeatherReport::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Report;
    use chrono::TimeZone;

    fn at(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, month, day, hour, 0, 0).single().expect("valid instant")
    }

    fn parser() -> TafParser {
        TafParser::new().with_reference_time(at(3, 15, 12))
    }

    const KJFK: &str = "TAF KJFK 151130Z 1512/1618 28012KT P6SM FEW250 \
        FM151800 30015G25KT P6SM SCT040 \
        TEMPO 1520/1602 3SM -SHRA BKN030 \
        PROB30 TEMPO 1604/1608 1SM TSRA OVC010CB \
        BECMG 1610/1612 VRB05KT TX18/1519Z TN06/1610Z=";

    #[test]
    fn decodes_change_groups_in_order() {
        let taf = parser().parse_taf(KJFK).expect("valid taf");

        assert_eq!(taf.base().station_id(), "KJFK");
        assert_eq!(taf.issue_time(), Utc.with_ymd_and_hms(2025, 3, 15, 11, 30, 0).single());
        assert_eq!(taf.validity().map(ValidityPeriod::to_taf_format).as_deref(), Some("1512/1618"));

        let kinds: Vec<ChangeIndicator> = taf.forecast_periods().iter().map(ForecastPeriod::change_indicator).collect();
        assert_eq!(
            kinds,
            [
                ChangeIndicator::Base,
                ChangeIndicator::Fm,
                ChangeIndicator::Tempo,
                ChangeIndicator::Prob,
                ChangeIndicator::Becmg,
            ]
        );
        let periods = taf.forecast_periods();
        assert_eq!(periods[1].change_time(), Some(at(3, 15, 18)));
        assert_eq!(periods[2].period_end(), Some(at(3, 16, 2)));
        assert_eq!(periods[3].probability(), Some(30));
        assert!(periods[3].is_temporary_change());
        assert!(periods[3].conditions().has_thunderstorms());
        assert_eq!(periods[3].conditions().ceiling_feet(), Some(1000));

        assert_eq!(taf.max_temperature(), Some((18.0, at(3, 15, 19))));
        assert_eq!(taf.min_temperature(), Some((6.0, at(3, 16, 10))));
        assert!(taf.unparsed().is_empty());
        assert!(taf.is_current(at(3, 15, 12)));
        assert_eq!(taf.periods_active_at(at(3, 16, 5)).len(), 3);
        assert!(taf.has_significant_weather_forecast());
    }

    #[test]
    fn header_flags() {
        let taf = parser()
            .parse_taf("TAF AMD EGLL 151400Z 1514/1618 24010KT 9999 SCT030")
            .expect("valid taf");
        assert!(taf.is_amended());
        assert_eq!(taf.corrected(), Some(false));
        assert!(taf.base().quality_flags().has(ReportModifier::Amd));
        assert_eq!(taf.report_type(), ReportKind::Taf);
    }

    #[test]
    fn times_roll_into_next_month() {
        let taf = TafParser::new()
            .with_reference_time(at(1, 31, 23))
            .parse_taf("TAF KJFK 312330Z 0100/0206 18010KT P6SM SKC FM010600 20012KT P6SM FEW050")
            .expect("valid taf");
        let validity = taf.validity().expect("validity");
        assert_eq!(validity.valid_from(), at(2, 1, 0));
        assert_eq!(validity.valid_to(), at(2, 2, 6));
        assert_eq!(taf.forecast_periods()[1].change_time(), Some(at(2, 1, 6)));
    }

    #[test]
    fn hour_24_ends_at_midnight() {
        let taf = parser()
            .parse_taf("TAF EGLL 151100Z 1512/1618 24010KT 9999 SCT030 TEMPO 1520/1524 4000 RA")
            .expect("valid taf");
        assert_eq!(taf.forecast_periods()[1].period_end(), Some(at(3, 16, 0)));
    }

    #[test]
    fn over_long_change_period_is_skipped_unless_strict() {
        let raw = "TAF EGLL 151100Z 1512/1618 24010KT 9999 SCT030 TEMPO 1506/1520 4000 RA BECMG 1600/1602 BKN010";
        let taf = parser().parse_taf(raw).expect("lenient parse");
        assert_eq!(taf.forecast_periods().len(), 2);
        assert_eq!(taf.unparsed(), ["TEMPO 1506/1520"]);

        let err = parser().strict(true).parse_taf(raw).unwrap_err();
        assert!(err.to_string().contains("Forecast period too long"));
    }

    #[test]
    fn inches_altimeter_and_nil() {
        let taf = parser()
            .parse_taf("TAF KMIA 151130Z 1512/1618 09010KT P6SM SCT025 QNH2992INS")
            .expect("valid taf");
        let pressure = taf.base_forecast().and_then(|p| p.conditions().pressure()).expect("altimeter");
        assert!((pressure.to_inches_hg() - 29.92).abs() < 1e-9);

        let nil = parser().parse_taf("TAF KMIA 151130Z NIL=").expect("nil taf");
        assert!(nil.base().quality_flags().is_nil());
        assert!(nil.forecast_periods().is_empty());
    }

    #[test]
    fn unknown_groups_are_collected() {
        let taf = parser()
            .parse_taf("TAF EGLL 151100Z 1512/1618 24010KT 9999 SCT030 WS020/27045KT")
            .expect("lenient parse");
        assert_eq!(taf.unparsed(), ["WS020/27045KT"]);
        assert!(parser().strict(true).parse_taf("TAF EGLL 151100Z 1512/1618 WS020/27045KT").is_err());
    }

    #[test]
    fn can_parse_requires_taf_header() {
        let parser = parser();
        assert!(parser.can_parse("TAF AMD EGLL 151100Z 1512/1618 24010KT"));
        assert!(!parser.can_parse("EGLL 151100Z 1512/1618"));
        assert!(parser.parse(KJFK).expect("valid").as_taf().is_some());
    }
}
