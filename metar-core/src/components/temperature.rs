use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WeatherError, ensure};

const MIN_CELSIUS: f64 = -100.0;
const MAX_CELSIUS: f64 = 60.0;
const HEAT_INDEX_MIN_CELSIUS: f64 = 27.0;
const FOG_SPREAD_CELSIUS: f64 = 2.0;

static TEMP_DEWPOINT_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?P<tsign>[M-])?(?P<temp>\d{1,2})|//|XX|MM)/(?:(?P<dsign>[M-])?(?P<dew>\d{1,2})|//|XX|MM)?$")
        .expect("temperature pattern must compile")
});
static PRECISE_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^T(?P<tsign>[01])(?P<temp>\d{3})(?:(?P<dsign>[01])(?P<dew>\d{3}))?$")
        .expect("precise temperature pattern must compile")
});

/// Air temperature and dewpoint in °C, plus the forecast extremes a TAF
/// can attach (`TX`/`TN`) together with their occurrence instants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Temperature {
    celsius: Option<f64>,
    dewpoint_celsius: Option<f64>,
    max_forecast_celsius: Option<f64>,
    max_forecast_time: Option<DateTime<Utc>>,
    min_forecast_celsius: Option<f64>,
    min_forecast_time: Option<DateTime<Utc>>,
}

impl Temperature {
    pub fn new(celsius: Option<f64>, dewpoint_celsius: Option<f64>) -> Result<Self> {
        Self::with_forecast(celsius, dewpoint_celsius, None, None, None, None)
    }

    pub fn of(celsius: f64, dewpoint_celsius: f64) -> Result<Self> {
        Self::new(Some(celsius), Some(dewpoint_celsius))
    }

    pub fn with_forecast(
        celsius: Option<f64>,
        dewpoint_celsius: Option<f64>,
        max_forecast_celsius: Option<f64>,
        max_forecast_time: Option<DateTime<Utc>>,
        min_forecast_celsius: Option<f64>,
        min_forecast_time: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        if let Some(t) = celsius {
            ensure(in_range(t), || {
                format!("Temperature out of reasonable range (-100 to 60°C): {t:.1}")
            })?;
        }
        if let Some(d) = dewpoint_celsius {
            ensure(in_range(d), || {
                format!("Dewpoint out of reasonable range (-100 to 60°C): {d:.1}")
            })?;
        }
        if let (Some(t), Some(d)) = (celsius, dewpoint_celsius) {
            ensure(d <= t, || {
                format!("Dewpoint ({d:.1}°C) cannot be higher than temperature ({t:.1}°C)")
            })?;
        }

        for (value, time) in [
            (max_forecast_celsius, max_forecast_time),
            (min_forecast_celsius, min_forecast_time),
        ] {
            ensure(value.is_some() == time.is_some(), || {
                "Forecast temperature and its time must both be present or both be absent".into()
            })?;
            if let Some(v) = value {
                ensure(in_range(v), || {
                    format!("Forecast temperature out of reasonable range (-100 to 60°C): {v:.1}")
                })?;
            }
        }
        if let (Some(max), Some(min)) = (max_forecast_celsius, min_forecast_celsius) {
            ensure(max >= min, || {
                format!(
                    "Maximum forecast temperature ({max:.1}°C) cannot be lower than minimum ({min:.1}°C)"
                )
            })?;
        }

        Ok(Self {
            celsius,
            dewpoint_celsius,
            max_forecast_celsius,
            max_forecast_time,
            min_forecast_celsius,
            min_forecast_time,
        })
    }

    pub fn from_fahrenheit(fahrenheit: f64, dewpoint_fahrenheit: Option<f64>) -> Result<Self> {
        Self::new(
            Some(fahrenheit_to_celsius(fahrenheit)),
            dewpoint_fahrenheit.map(fahrenheit_to_celsius),
        )
    }

    /// Parse the body group `TT/TT`; `M` marks a negative value and the
    /// dewpoint may be missing (`22/`).
    pub fn parse(token: &str) -> Result<Self> {
        let token = token.trim().to_uppercase();
        let caps = TEMP_DEWPOINT_GROUP.captures(&token).ok_or_else(|| {
            WeatherError::parse("temperature", format!("unrecognized token '{token}'"))
        })?;

        let celsius = signed_value(caps.name("tsign"), caps.name("temp"))?;
        let dewpoint = signed_value(caps.name("dsign"), caps.name("dew"))?;
        Self::new(celsius, dewpoint)
    }

    /// Parse the remarks group `TsTTTsDDD` carrying tenths of a degree.
    pub fn parse_precise(token: &str) -> Result<Self> {
        let caps = PRECISE_GROUP.captures(token.trim()).ok_or_else(|| {
            WeatherError::parse("precise temperature", format!("unrecognized token '{token}'"))
        })?;
        let celsius = tenths(&caps["tsign"], &caps["temp"]);
        let dewpoint = match (caps.name("dsign"), caps.name("dew")) {
            (Some(sign), Some(value)) => tenths(sign.as_str(), value.as_str()),
            _ => None,
        };
        Self::new(celsius, dewpoint)
    }

    pub fn celsius(&self) -> Option<f64> {
        self.celsius
    }

    pub fn dewpoint_celsius(&self) -> Option<f64> {
        self.dewpoint_celsius
    }

    pub fn max_forecast_celsius(&self) -> Option<f64> {
        self.max_forecast_celsius
    }

    pub fn max_forecast_time(&self) -> Option<DateTime<Utc>> {
        self.max_forecast_time
    }

    pub fn min_forecast_celsius(&self) -> Option<f64> {
        self.min_forecast_celsius
    }

    pub fn min_forecast_time(&self) -> Option<DateTime<Utc>> {
        self.min_forecast_time
    }

    pub fn to_fahrenheit(&self) -> Option<f64> {
        self.celsius.map(celsius_to_fahrenheit)
    }

    pub fn dewpoint_to_fahrenheit(&self) -> Option<f64> {
        self.dewpoint_celsius.map(celsius_to_fahrenheit)
    }

    /// Temperature minus dewpoint.
    pub fn spread(&self) -> Option<f64> {
        Some(self.celsius? - self.dewpoint_celsius?)
    }

    pub fn is_fog_likely(&self) -> bool {
        self.spread().is_some_and(|s| s <= FOG_SPREAD_CELSIUS)
    }

    pub fn is_freezing(&self) -> bool {
        self.celsius.is_some_and(|t| t <= 0.0)
    }

    /// Relative humidity in percent (Magnus approximation), clamped to 0..=100.
    pub fn relative_humidity(&self) -> Option<f64> {
        let t = self.celsius?;
        let d = self.dewpoint_celsius?;
        let rh = 100.0 * saturation_vapor_pressure(d) / saturation_vapor_pressure(t);
        Some(rh.clamp(0.0, 100.0))
    }

    /// Apparent temperature in °F; only defined from 27 °C upward.
    pub fn heat_index_fahrenheit(&self) -> Option<f64> {
        let t = self.celsius?;
        if t < HEAT_INDEX_MIN_CELSIUS {
            return None;
        }
        let rh = self.relative_humidity()?;
        Some(heat_index(celsius_to_fahrenheit(t), rh))
    }

    pub fn heat_index_celsius(&self) -> Option<f64> {
        self.heat_index_fahrenheit().map(fahrenheit_to_celsius)
    }

    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(t) = self.celsius {
            parts.push(format!("Temperature {t:.1}°C ({:.1}°F)", celsius_to_fahrenheit(t)));
        }
        if let Some(d) = self.dewpoint_celsius {
            parts.push(format!("dewpoint {d:.1}°C"));
        }
        if let Some(rh) = self.relative_humidity() {
            parts.push(format!("RH {rh:.0}%"));
        }
        if let Some(max) = self.max_forecast_celsius {
            parts.push(format!("max {max:.0}°C"));
        }
        if let Some(min) = self.min_forecast_celsius {
            parts.push(format!("min {min:.0}°C"));
        }
        if parts.is_empty() {
            "Temperature not reported".to_string()
        } else {
            parts.join(", ")
        }
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

fn in_range(value: f64) -> bool {
    (MIN_CELSIUS..=MAX_CELSIUS).contains(&value)
}

fn signed_value(sign: Option<regex::Match<'_>>, digits: Option<regex::Match<'_>>) -> Result<Option<f64>> {
    let Some(digits) = digits else {
        return Ok(None);
    };
    let value: f64 = digits
        .as_str()
        .parse()
        .map_err(|_| WeatherError::parse("temperature", digits.as_str()))?;
    Ok(Some(if sign.is_some() { -value } else { value }))
}

fn tenths(sign: &str, digits: &str) -> Option<f64> {
    let value = digits.parse::<f64>().ok()? / 10.0;
    Some(if sign == "1" { -value } else { value })
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

fn saturation_vapor_pressure(celsius: f64) -> f64 {
    6.112 * ((17.67 * celsius) / (celsius + 243.5)).exp()
}

/// NOAA heat index for temperature in °F and relative humidity in percent.
///
/// The Steadman estimate is used when its average with the air temperature
/// stays below 80 °F; otherwise the Rothfusz regression applies, with the
/// low- and high-humidity adjustments.
pub fn heat_index(t: f64, rh: f64) -> f64 {
    let simple = 0.5 * (t + 61.0 + (t - 68.0) * 1.2 + rh * 0.094);
    if (simple + t) / 2.0 < 80.0 {
        return simple;
    }

    let mut hi = -42.379 + 2.049_015_23 * t + 10.143_331_27 * rh
        - 0.224_755_41 * t * rh
        - 0.006_837_83 * t * t
        - 0.054_817_17 * rh * rh
        + 0.001_228_74 * t * t * rh
        + 0.000_852_82 * t * rh * rh
        - 0.000_001_99 * t * t * rh * rh;

    if rh < 13.0 && (80.0..=112.0).contains(&t) {
        hi -= ((13.0 - rh) / 4.0) * ((17.0 - (t - 95.0).abs()) / 17.0).sqrt();
    } else if rh > 85.0 && (80.0..=87.0).contains(&t) {
        hi += ((rh - 85.0) / 10.0) * ((87.0 - t) / 5.0);
    }
    hi
}
