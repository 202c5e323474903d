//! Decoder for the free-order groups after `RMK`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, warn};

use super::{capture_number, cursor::{Cursor, group}};
use crate::{
    components::{Pressure, SkyCoverage, Temperature, Visibility, VisibilityUnit, visibility::parse_fractional},
    error::{Result, WeatherError},
    remark::{
        AutomatedMaintenanceIndicator, AutomatedStationType, CeilingSecondSite, CloudType, HailSize,
        MetarRemarks, MetarRemarksBuilder, ObscurationLayer, PeakWind, PrecipitationAmount, PressureTendency,
        ThunderstormLocation, VariableCeiling, VariableVisibility, WeatherEvent, WindShift,
    },
};

const THREE_HOUR_OBSERVATION_HOURS: [u32; 4] = [2, 8, 14, 20];
const COMPASS: &str = "NE|NW|SE|SW|N|E|S|W";

static STATION_TYPE: Lazy<Regex> = Lazy::new(|| group(r"A[O0](?P<n>[12])"));
static SEA_LEVEL_PRESSURE: Lazy<Regex> = Lazy::new(|| group(r"SLP(?P<p>\d{3})"));
static SEA_LEVEL_PRESSURE_MISSING: Lazy<Regex> = Lazy::new(|| group(r"SLPNO"));
static PEAK_WIND: Lazy<Regex> = Lazy::new(|| {
    group(r"PK\s+WND\s+(?P<dir>\d{3})(?P<speed>\d{2,3})/(?P<hour>\d{2})?(?P<minute>\d{2})")
});
static WIND_SHIFT: Lazy<Regex> =
    Lazy::new(|| group(r"WSHFT\s+(?P<hour>\d{2})?(?P<minute>\d{2})(?P<fropa>\s+FROPA)?"));
static SITE_VISIBILITY: Lazy<Regex> =
    Lazy::new(|| group(r"(?P<site>TWR|SFC)\s+VIS\s+(?P<vis>\d+\s+\d/\d{1,2}|\d/\d{1,2}|\d+)"));
static VARIABLE_VISIBILITY: Lazy<Regex> = Lazy::new(|| {
    group(&format!(
        r"VIS\s+(?:(?P<dir>{COMPASS})\s+)?(?P<min>M?(?:\d+\s+\d/\d{{1,2}}|\d/\d{{1,2}}|\d+))V(?P<max>P?(?:\d+\s+\d/\d{{1,2}}|\d/\d{{1,2}}|\d+))(?:\s+(?P<loc>RWY\d{{2}}[LCR]?))?"
    ))
});
static VARIABLE_CEILING: Lazy<Regex> = Lazy::new(|| group(r"CIG\s+(?P<low>\d{3})V(?P<high>\d{3})"));
static CEILING_SECOND_SITE: Lazy<Regex> =
    Lazy::new(|| group(r"CIG\s+(?P<height>\d{3})\s+(?P<loc>RWY\d{2}[LCR]?|LOC)"));
static HAIL: Lazy<Regex> = Lazy::new(|| group(r"GR\s+(?P<size>\d+\s+\d/\d{1,2}|\d/\d{1,2}|\d+)"));
static WEATHER_EVENTS: Lazy<Regex> = Lazy::new(|| group(r"(?P<events>(?:[-+]?[A-Z]{2,8}?(?:[BE](?:\d{4}|\d{2}))+)+)"));
static WEATHER_EVENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<intensity>[-+])?(?P<code>[A-Z]{2,8}?)(?P<times>(?:[BE](?:\d{4}|\d{2}))+)")
        .expect("weather event pattern must compile")
});
static EVENT_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<mark>[BE])(?P<time>\d{4}|\d{2})").expect("event time pattern must compile"));
static OBSCURATION: Lazy<Regex> = Lazy::new(|| {
    group(r"(?P<cover>FEW|SCT|BKN|OVC)\s*(?P<wx>FG|BR|FU|HZ|DU|SA|VA|PY)\s*(?P<height>\d{3})")
});
static THUNDERSTORM: Lazy<Regex> = Lazy::new(|| {
    group(&format!(
        r"(?P<cloud>CBMAM|CB|TCU|TS|ACC|VIRGA)(?:\s+(?P<qual>OHD|VC|DSNT|DSIPTD|TOP|TR))?(?:\s+(?P<dir>ALQDS|{COMPASS})(?:-(?P<range>{COMPASS}))?)?(?:\s+MOV\s+(?P<mov>{COMPASS}))?"
    ))
});
static CLOUD_TYPE: Lazy<Regex> = Lazy::new(|| {
    group(&format!(
        r"(?P<mdt>MDT\s+)?(?P<cloud>CU|CF|ST|SC|SF|NS|AS|AC|CS|CC|CI)(?P<oktas>[1-8])?(?:\s*MOVG\s*(?P<movg>{COMPASS})|\s+(?P<loc>OHD-ALQDS|ALQDS|OHD))?"
    ))
});
static PRECISE_TEMPERATURE: Lazy<Regex> = Lazy::new(|| group(r"T[01]\d{3}(?:[01]\d{3})?"));
static DAILY_EXTREMES: Lazy<Regex> =
    Lazy::new(|| group(r"4(?P<xs>[01])(?P<max>\d{3})(?P<ns>[01])(?P<min>\d{3})"));
static SIX_HOUR_EXTREME: Lazy<Regex> = Lazy::new(|| group(r"(?P<kind>[12])(?P<sign>[01])(?P<value>\d{3})"));
static HOURLY_PRECIPITATION: Lazy<Regex> = Lazy::new(|| group(r"P(?P<amount>\d{4}|/{4})"));
static PERIOD_PRECIPITATION: Lazy<Regex> = Lazy::new(|| group(r"6(?P<amount>\d{4}|/{4})"));
static DAILY_PRECIPITATION: Lazy<Regex> = Lazy::new(|| group(r"7(?P<amount>\d{4}|/{4})"));
static PRESSURE_TENDENCY: Lazy<Regex> = Lazy::new(|| group(r"5(?P<code>[0-8])(?P<change>\d{3})"));
static MAINTENANCE: Lazy<Regex> = Lazy::new(|| {
    group(r"(?P<code>RVRNO|PWINO|PNO|FZRANO|TSNO|VISNO|CHINO)(?:\s+(?P<loc>RWY\d{2}[LCR]?))?|(?P<check>\$)")
});

/// Decode a remarks section.
///
/// `observation_hour` selects the 3- or 6-hour period of a `6RRRR` group.
pub fn parse_remarks(text: &str, observation_hour: Option<u32>) -> MetarRemarks {
    parse_into(MetarRemarks::builder(), text, observation_hour)
}

/// Decode into an existing builder. Groups may come in any order; text no
/// grammar claims is kept as free text.
pub(crate) fn parse_into(mut builder: MetarRemarksBuilder, text: &str, observation_hour: Option<u32>) -> MetarRemarks {
    let mut cursor = Cursor::new(text);

    while !cursor.is_empty() {
        match take_remark(&mut cursor, builder.clone(), observation_hour) {
            Some((token, Ok(next))) => {
                debug!(group = token, "decoded remark");
                builder = next;
            }
            Some((token, Err(err))) => {
                warn!(group = token, error = %err, "remark failed validation");
                builder = builder.append_free_text(token);
            }
            None => {
                if let Some(token) = cursor.next_token() {
                    builder = builder.append_free_text(token);
                }
            }
        }
    }

    builder.build()
}

type Step<'a> = Option<(&'a str, Result<MetarRemarksBuilder>)>;

fn take_remark<'a>(cursor: &mut Cursor<'a>, builder: MetarRemarksBuilder, observation_hour: Option<u32>) -> Step<'a> {
    let grammars: [(&Lazy<Regex>, RemarkDecoder); 21] = [
        (&STATION_TYPE, decode_station_type),
        (&SEA_LEVEL_PRESSURE_MISSING, |_, b, _| Ok(b)),
        (&SEA_LEVEL_PRESSURE, decode_sea_level_pressure),
        (&PEAK_WIND, decode_peak_wind),
        (&WIND_SHIFT, decode_wind_shift),
        (&SITE_VISIBILITY, decode_site_visibility),
        (&VARIABLE_VISIBILITY, decode_variable_visibility),
        (&VARIABLE_CEILING, decode_variable_ceiling),
        (&CEILING_SECOND_SITE, decode_ceiling_second_site),
        (&HAIL, decode_hail),
        (&OBSCURATION, decode_obscuration),
        (&WEATHER_EVENTS, decode_weather_events),
        (&THUNDERSTORM, decode_thunderstorm),
        (&CLOUD_TYPE, decode_cloud_type),
        (&PRECISE_TEMPERATURE, decode_precise_temperature),
        (&DAILY_EXTREMES, decode_daily_extremes),
        (&SIX_HOUR_EXTREME, decode_six_hour_extreme),
        (&HOURLY_PRECIPITATION, |caps, b, _| {
            Ok(b.hourly_precipitation(PrecipitationAmount::from_encoded(&caps["amount"], 1)?))
        }),
        (&PERIOD_PRECIPITATION, decode_period_precipitation),
        (&DAILY_PRECIPITATION, |caps, b, _| {
            Ok(b.twenty_four_hour_precipitation(PrecipitationAmount::from_encoded(&caps["amount"], 24)?))
        }),
        (&PRESSURE_TENDENCY, decode_pressure_tendency),
    ];

    for (pattern, decode) in grammars {
        if let Some(caps) = cursor.take(pattern) {
            let token = Cursor::matched(&caps);
            return Some((token, decode(&caps, builder, observation_hour)));
        }
    }
    cursor
        .take(&MAINTENANCE)
        .map(|caps| (Cursor::matched(&caps), decode_maintenance(&caps, builder)))
}

type RemarkDecoder = fn(&Captures<'_>, MetarRemarksBuilder, Option<u32>) -> Result<MetarRemarksBuilder>;

fn decode_station_type(caps: &Captures<'_>, b: MetarRemarksBuilder, _: Option<u32>) -> Result<MetarRemarksBuilder> {
    let digit: u8 = capture_number(caps, "n")?;
    Ok(b.automated_station_type(AutomatedStationType::from_digit(digit)?))
}

/// `SLPppp`: tenths of hPa with the leading 9 or 10 dropped.
fn decode_sea_level_pressure(caps: &Captures<'_>, b: MetarRemarksBuilder, _: Option<u32>) -> Result<MetarRemarksBuilder> {
    let coded: u32 = capture_number(caps, "p")?;
    let tenths = f64::from(coded) / 10.0;
    let hpa = if coded >= 500 { 900.0 + tenths } else { 1000.0 + tenths };
    Ok(b.sea_level_pressure(Pressure::hectopascals(hpa)?))
}

fn optional_number(caps: &Captures<'_>, name: &str) -> Result<Option<i32>> {
    caps.name(name).map(|_| capture_number(caps, name)).transpose()
}

fn decode_peak_wind(caps: &Captures<'_>, b: MetarRemarksBuilder, _: Option<u32>) -> Result<MetarRemarksBuilder> {
    let peak = PeakWind::new(
        Some(capture_number(caps, "dir")?),
        Some(capture_number(caps, "speed")?),
        optional_number(caps, "hour")?,
        Some(capture_number(caps, "minute")?),
    )?;
    Ok(b.peak_wind(peak))
}

fn decode_wind_shift(caps: &Captures<'_>, b: MetarRemarksBuilder, _: Option<u32>) -> Result<MetarRemarksBuilder> {
    let shift = WindShift::new(
        optional_number(caps, "hour")?,
        Some(capture_number(caps, "minute")?),
        caps.name("fropa").is_some(),
    )?;
    Ok(b.wind_shift(shift))
}

fn statute(text: &str) -> Result<Visibility> {
    Visibility::statute_miles(parse_fractional(text)?)
}

fn decode_site_visibility(caps: &Captures<'_>, b: MetarRemarksBuilder, _: Option<u32>) -> Result<MetarRemarksBuilder> {
    let vis = statute(&caps["vis"])?;
    Ok(match &caps["site"] {
        "TWR" => b.tower_visibility(vis),
        _ => b.surface_visibility(vis),
    })
}

/// `M` and `P` prefixes become less-than / greater-than bounds.
fn bounded(text: &str) -> Result<Visibility> {
    let (less, greater, digits) = match text.as_bytes().first() {
        Some(b'M') => (true, false, &text[1..]),
        Some(b'P') => (false, true, &text[1..]),
        _ => (false, false, text),
    };
    let miles = parse_fractional(digits)?;
    Visibility::new(
        Some(miles),
        Some(VisibilityUnit::StatuteMiles),
        less,
        greater,
        None,
    )
}

fn decode_variable_visibility(caps: &Captures<'_>, b: MetarRemarksBuilder, _: Option<u32>) -> Result<MetarRemarksBuilder> {
    let variable = VariableVisibility::new(
        bounded(&caps["min"])?,
        bounded(&caps["max"])?,
        caps.name("dir").map(|m| m.as_str()),
        caps.name("loc").map(|m| m.as_str()),
    )?;
    Ok(b.variable_visibility(variable))
}

fn decode_variable_ceiling(caps: &Captures<'_>, b: MetarRemarksBuilder, _: Option<u32>) -> Result<MetarRemarksBuilder> {
    let ceiling = VariableCeiling::from_hundreds(capture_number(caps, "low")?, capture_number(caps, "high")?)?;
    Ok(b.variable_ceiling(ceiling))
}

fn decode_ceiling_second_site(caps: &Captures<'_>, b: MetarRemarksBuilder, _: Option<u32>) -> Result<MetarRemarksBuilder> {
    let site = CeilingSecondSite::from_hundreds(capture_number(caps, "height")?, caps.name("loc").map(|m| m.as_str()))?;
    Ok(b.ceiling_second_site(site))
}

fn decode_hail(caps: &Captures<'_>, b: MetarRemarksBuilder, _: Option<u32>) -> Result<MetarRemarksBuilder> {
    Ok(b.hail_size(HailSize::inches(parse_fractional(&caps["size"])?)?))
}

fn decode_obscuration(caps: &Captures<'_>, b: MetarRemarksBuilder, _: Option<u32>) -> Result<MetarRemarksBuilder> {
    let coverage = SkyCoverage::try_from(&caps["cover"])?;
    let layer = ObscurationLayer::from_hundreds(coverage, &caps["wx"], capture_number(caps, "height")?)?;
    Ok(b.add_obscuration_layer(layer))
}

/// `RAB15E30SNB30`: each phenomenon with its begin/end times. Two digits are
/// minutes past the observation hour, four are `hhmm`.
fn decode_weather_events(caps: &Captures<'_>, mut b: MetarRemarksBuilder, _: Option<u32>) -> Result<MetarRemarksBuilder> {
    for event in WEATHER_EVENT.captures_iter(&caps["events"]) {
        let intensity = event.name("intensity").map(|m| m.as_str());
        let code = &event["code"];
        let mut begin: Option<(Option<i32>, i32)> = None;

        for mark in EVENT_TIME.captures_iter(&event["times"]) {
            let time = split_time(&mark["time"])?;
            match &mark["mark"] {
                "B" => {
                    if let Some((hour, minute)) = begin.take() {
                        b = b.add_weather_event(WeatherEvent::new(code, intensity, hour, Some(minute), None, None)?);
                    }
                    begin = Some(time);
                }
                _ => {
                    let (bh, bm) = begin.take().map_or((None, None), |(h, m)| (h, Some(m)));
                    b = b.add_weather_event(WeatherEvent::new(code, intensity, bh, bm, time.0, Some(time.1))?);
                }
            }
        }
        if let Some((hour, minute)) = begin {
            b = b.add_weather_event(WeatherEvent::new(code, intensity, hour, Some(minute), None, None)?);
        }
    }
    Ok(b)
}

fn split_time(text: &str) -> Result<(Option<i32>, i32)> {
    let number = |s: &str| s.parse::<i32>().map_err(|_| WeatherError::parse("weather event", text));
    match text.len() {
        4 => Ok((Some(number(&text[..2])?), number(&text[2..])?)),
        _ => Ok((None, number(text)?)),
    }
}

fn decode_thunderstorm(caps: &Captures<'_>, b: MetarRemarksBuilder, _: Option<u32>) -> Result<MetarRemarksBuilder> {
    let text = |name: &str| caps.name(name).map(|m| m.as_str());
    let location = ThunderstormLocation::new(&caps["cloud"], text("qual"), text("dir"), text("range"), text("mov"))?;
    Ok(b.add_thunderstorm_location(location))
}

fn decode_cloud_type(caps: &Captures<'_>, b: MetarRemarksBuilder, _: Option<u32>) -> Result<MetarRemarksBuilder> {
    let oktas = caps.name("oktas").map(|_| capture_number::<u8>(caps, "oktas")).transpose()?;
    let cloud = CloudType::new(
        &caps["cloud"],
        oktas,
        caps.name("mdt").map(|_| "MDT"),
        caps.name("loc").map(|m| m.as_str()),
        caps.name("movg").map(|m| m.as_str()),
    )?;
    Ok(b.add_cloud_type(cloud))
}

fn decode_precise_temperature(caps: &Captures<'_>, b: MetarRemarksBuilder, _: Option<u32>) -> Result<MetarRemarksBuilder> {
    Ok(b.precise_temperature(Temperature::parse_precise(Cursor::matched(caps))?))
}

/// Sign digit 1 means below zero; the value is in tenths.
fn signed_tenths(sign: &str, value: &str) -> Result<f64> {
    let tenths: u32 = value
        .parse()
        .map_err(|_| WeatherError::parse("temperature extreme", value))?;
    let celsius = f64::from(tenths) / 10.0;
    Ok(if sign == "1" { -celsius } else { celsius })
}

fn decode_daily_extremes(caps: &Captures<'_>, b: MetarRemarksBuilder, _: Option<u32>) -> Result<MetarRemarksBuilder> {
    let max = signed_tenths(&caps["xs"], &caps["max"])?;
    let min = signed_tenths(&caps["ns"], &caps["min"])?;
    if min > max {
        return Err(WeatherError::validation(format!(
            "24-hour minimum ({min:.1}°C) cannot be higher than maximum ({max:.1}°C)"
        )));
    }
    Ok(b.twenty_four_hour_max_temperature(max).twenty_four_hour_min_temperature(min))
}

fn decode_six_hour_extreme(caps: &Captures<'_>, b: MetarRemarksBuilder, _: Option<u32>) -> Result<MetarRemarksBuilder> {
    let celsius = signed_tenths(&caps["sign"], &caps["value"])?;
    Ok(match &caps["kind"] {
        "1" => b.six_hour_max_temperature(celsius),
        _ => b.six_hour_min_temperature(celsius),
    })
}

/// 3-hour amount at the 02, 08, 14 and 20 UTC observations, 6-hour otherwise.
fn decode_period_precipitation(
    caps: &Captures<'_>,
    b: MetarRemarksBuilder,
    observation_hour: Option<u32>,
) -> Result<MetarRemarksBuilder> {
    let period = match observation_hour {
        Some(hour) if THREE_HOUR_OBSERVATION_HOURS.contains(&hour) => 3,
        _ => 6,
    };
    Ok(b.six_hour_precipitation(PrecipitationAmount::from_encoded(&caps["amount"], period)?))
}

fn decode_pressure_tendency(caps: &Captures<'_>, b: MetarRemarksBuilder, _: Option<u32>) -> Result<MetarRemarksBuilder> {
    let code: u8 = capture_number(caps, "code")?;
    Ok(b.pressure_tendency(PressureTendency::from_metar(code, &caps["change"])?))
}

fn decode_maintenance(caps: &Captures<'_>, b: MetarRemarksBuilder) -> Result<MetarRemarksBuilder> {
    if caps.name("check").is_some() {
        return Ok(b.add_maintenance_indicator(AutomatedMaintenanceIndicator::maintenance_check()));
    }
    let indicator = AutomatedMaintenanceIndicator::of(&caps["code"], caps.name("loc").map(|m| m.as_str()))?;
    Ok(b.add_maintenance_indicator(indicator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remark::MaintenanceIndicatorType;

    #[test]
    fn decodes_common_us_remarks() {
        let remarks = parse_remarks("AO2 SLP210 T02330139 10250 20211 58033", Some(12));
        assert_eq!(remarks.automated_station_type(), Some(AutomatedStationType::Ao2));
        let slp = remarks.sea_level_pressure().expect("sea-level pressure");
        assert!((slp.to_hectopascals() - 1021.0).abs() < 1e-9);
        let precise = remarks.precise_temperature().expect("precise temperature");
        assert_eq!(precise.celsius(), Some(23.3));
        assert_eq!(precise.dewpoint_celsius(), Some(13.9));
        assert_eq!(remarks.six_hour_max_temperature(), Some(25.0));
        assert_eq!(remarks.six_hour_min_temperature(), Some(21.1));
        assert!(remarks.pressure_tendency().is_some());
        assert_eq!(remarks.free_text(), None);
    }

    #[test]
    fn sea_level_pressure_century() {
        let high = parse_remarks("SLP982", None);
        let low = parse_remarks("SLP045", None);
        assert!((high.sea_level_pressure().expect("slp").to_hectopascals() - 998.2).abs() < 1e-9);
        assert!((low.sea_level_pressure().expect("slp").to_hectopascals() - 1004.5).abs() < 1e-9);
        assert!(parse_remarks("SLPNO", None).is_empty());
    }

    #[test]
    fn multi_word_groups() {
        let remarks = parse_remarks(
            "PK WND 28045/1955 WSHFT 1930 FROPA VIS 1/2V2 CIG 005V010 TWR VIS 1 1/2 GR 1 3/4",
            Some(20),
        );
        let peak = remarks.peak_wind().expect("peak wind");
        assert_eq!(peak.direction_degrees(), Some(280));
        assert_eq!(peak.speed_knots(), Some(45));
        assert_eq!(peak.hour(), Some(19));
        assert_eq!(peak.minute(), Some(55));
        assert!(remarks.has_frontal_passage());
        let vis = remarks.variable_visibility().expect("variable visibility");
        assert_eq!(vis.minimum().to_statute_miles(), Some(0.5));
        assert_eq!(vis.maximum().to_statute_miles(), Some(2.0));
        let cig = remarks.variable_ceiling().expect("variable ceiling");
        assert_eq!(cig.minimum_height_feet(), 500);
        assert_eq!(remarks.tower_visibility().and_then(Visibility::to_statute_miles), Some(1.5));
        assert_eq!(remarks.hail_size().map(HailSize::size_inches), Some(1.75));
        assert_eq!(remarks.free_text(), None);
    }

    #[test]
    fn weather_events_and_thunderstorms() {
        let remarks = parse_remarks("RAB15E30SNB30 TSB05 TS SE MOV NE", Some(12));
        let events = remarks.weather_events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].weather_code(), "RA");
        assert_eq!(events[0].begin_minute(), Some(15));
        assert_eq!(events[0].end_minute(), Some(30));
        assert_eq!(events[1].weather_code(), "SN");
        assert_eq!(events[1].end_minute(), None);
        assert_eq!(events[2].weather_code(), "TS");

        let storms = remarks.thunderstorm_locations();
        assert_eq!(storms.len(), 1);
        assert_eq!(storms[0].direction(), Some("SE"));
        assert_eq!(storms[0].moving_direction(), Some("NE"));
    }

    #[test]
    fn layers_and_cloud_types() {
        let remarks = parse_remarks("FG FEW000 FEW FG 000 SC1 AC MOVG NE CB DSNT NW-N", None);
        assert_eq!(remarks.obscuration_layers().len(), 1);
        assert_eq!(remarks.cloud_types().len(), 2);
        assert_eq!(remarks.cloud_types()[0].oktas(), Some(1));
        assert_eq!(remarks.thunderstorm_locations()[0].direction_range(), Some("N"));
        assert_eq!(remarks.free_text(), Some("FG FEW000"));
    }

    #[test]
    fn precipitation_periods() {
        let synoptic = parse_remarks("P0009 60217 70125", Some(8));
        assert_eq!(synoptic.hourly_precipitation().and_then(PrecipitationAmount::amount_inches), Some(0.09));
        assert_eq!(synoptic.six_hour_precipitation().map(PrecipitationAmount::period_hours), Some(3));
        assert_eq!(synoptic.twenty_four_hour_precipitation().and_then(PrecipitationAmount::amount_inches), Some(1.25));

        let six = parse_remarks("6////", Some(12));
        let amount = six.six_hour_precipitation().expect("6-group");
        assert!(amount.is_trace());
        assert_eq!(amount.period_hours(), 6);
    }

    #[test]
    fn maintenance_and_free_text() {
        let remarks = parse_remarks("NEXT OBS 1300 PWINO TSNO VISNO RWY06 $", None);
        let kinds: Vec<MaintenanceIndicatorType> = remarks
            .maintenance_indicators()
            .iter()
            .map(AutomatedMaintenanceIndicator::indicator_type)
            .collect();
        assert_eq!(
            kinds,
            [
                MaintenanceIndicatorType::PwiNo,
                MaintenanceIndicatorType::TsNo,
                MaintenanceIndicatorType::VisNo,
                MaintenanceIndicatorType::MaintenanceCheck,
            ]
        );
        assert_eq!(remarks.free_text(), Some("NEXT OBS 1300"));
        assert!(remarks.needs_maintenance());
    }

    #[test]
    fn invalid_group_falls_back_to_free_text() {
        let remarks = parse_remarks("WSHFT 2575", None);
        assert!(remarks.wind_shift().is_none());
        assert_eq!(remarks.free_text(), Some("WSHFT 2575"));
    }
}
