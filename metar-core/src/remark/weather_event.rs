use serde::{Deserialize, Serialize};

use crate::error::{Result, WeatherError, ensure};

/// Begin/end time of a weather phenomenon, e.g. `RAB05E30` or `-SNB1215`.
///
/// Hours are optional in the encoding; a bare minute refers to the current hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherEvent {
    weather_code: String,
    intensity: Option<String>,
    begin_hour: Option<i32>,
    begin_minute: Option<i32>,
    end_hour: Option<i32>,
    end_minute: Option<i32>,
}

fn check_time(label: &str, hour: Option<i32>, minute: Option<i32>) -> Result<()> {
    if let Some(h) = hour {
        ensure((0..=23).contains(&h), || format!("{label} hour must be between 0 and 23: {h}"))?;
    }
    if let Some(m) = minute {
        ensure((0..=59).contains(&m), || format!("{label} minute must be between 0 and 59: {m}"))?;
    }
    Ok(())
}

fn format_time(hour: Option<i32>, minute: Option<i32>) -> String {
    match (hour, minute) {
        (_, None) => "N/A".into(),
        (Some(h), Some(m)) => format!("{h:02}:{m:02}"),
        (None, Some(m)) => format!(":{m:02}"),
    }
}

impl WeatherEvent {
    pub fn new(
        weather_code: &str,
        intensity: Option<&str>,
        begin_hour: Option<i32>,
        begin_minute: Option<i32>,
        end_hour: Option<i32>,
        end_minute: Option<i32>,
    ) -> Result<Self> {
        let weather_code = weather_code.trim().to_uppercase();
        if weather_code.is_empty() {
            return Err(WeatherError::validation("Weather code cannot be blank"));
        }
        if let Some(i) = intensity {
            ensure(i == "-" || i == "+", || {
                format!("Intensity must be '-' (light) or '+' (heavy): {i}")
            })?;
        }
        check_time("Begin", begin_hour, begin_minute)?;
        check_time("End", end_hour, end_minute)?;
        ensure(begin_minute.is_some() || end_minute.is_some(), || {
            "Weather event must have at least a begin or end time".into()
        })?;

        Ok(Self {
            weather_code,
            intensity: intensity.map(str::to_string),
            begin_hour,
            begin_minute,
            end_hour,
            end_minute,
        })
    }

    pub fn weather_code(&self) -> &str {
        &self.weather_code
    }

    pub fn intensity(&self) -> Option<&str> {
        self.intensity.as_deref()
    }

    pub fn begin_hour(&self) -> Option<i32> {
        self.begin_hour
    }

    pub fn begin_minute(&self) -> Option<i32> {
        self.begin_minute
    }

    pub fn end_hour(&self) -> Option<i32> {
        self.end_hour
    }

    pub fn end_minute(&self) -> Option<i32> {
        self.end_minute
    }

    pub fn has_begin_time(&self) -> bool {
        self.begin_minute.is_some()
    }

    pub fn has_end_time(&self) -> bool {
        self.end_minute.is_some()
    }

    pub fn formatted_begin_time(&self) -> String {
        format_time(self.begin_hour, self.begin_minute)
    }

    pub fn formatted_end_time(&self) -> String {
        format_time(self.end_hour, self.end_minute)
    }

    pub fn full_weather_code(&self) -> String {
        format!("{}{}", self.intensity.as_deref().unwrap_or_default(), self.weather_code)
    }

    pub fn summary(&self) -> String {
        let mut out = self.full_weather_code();
        if self.has_begin_time() {
            out.push_str(&format!(" began {}", self.formatted_begin_time()));
        }
        if self.has_end_time() {
            if self.has_begin_time() {
                out.push(',');
            }
            out.push_str(&format!(" ended {}", self.formatted_end_time()));
        }
        out
    }
}

impl std::fmt::Display for WeatherEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minute_only_summary() {
        let event = WeatherEvent::new("RA", None, None, Some(5), None, Some(30)).expect("valid");
        assert_eq!(event.summary(), "RA began :05, ended :30");
    }

    #[test]
    fn full_times_and_intensity() {
        let event = WeatherEvent::new("sn", Some("-"), Some(12), Some(15), None, None).expect("valid");
        assert_eq!(event.full_weather_code(), "-SN");
        assert_eq!(event.formatted_begin_time(), "12:15");
        assert_eq!(event.formatted_end_time(), "N/A");
        assert_eq!(event.summary(), "-SN began 12:15");

        let ended = WeatherEvent::new("TS", None, None, None, Some(14), Some(2)).expect("valid");
        assert_eq!(ended.summary(), "TS ended 14:02");
    }

    #[test]
    fn validation_messages() {
        let err = WeatherEvent::new(" ", None, None, Some(1), None, None).unwrap_err();
        assert_eq!(err.to_string(), "Weather code cannot be blank");
        let err = WeatherEvent::new("RA", Some("x"), None, Some(1), None, None).unwrap_err();
        assert!(err.to_string().contains("Intensity must be '-' (light) or '+' (heavy): x"));
        let err = WeatherEvent::new("RA", None, Some(24), Some(1), None, None).unwrap_err();
        assert!(err.to_string().contains("Begin hour must be between 0 and 23: 24"));
        let err = WeatherEvent::new("RA", None, None, None, None, Some(60)).unwrap_err();
        assert!(err.to_string().contains("End minute"));
        let err = WeatherEvent::new("RA", None, Some(3), None, None, None).unwrap_err();
        assert!(err.to_string().contains("at least a begin or end time"));
    }
}
