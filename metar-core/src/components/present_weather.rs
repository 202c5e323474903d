use serde::{Deserialize, Serialize};

use crate::{
    decoder::{self, PhenomenonCategory},
    error::{Result, WeatherError, ensure},
};

const MAX_PHENOMENA: usize = 4;
const INTENSITY_CODES: [&str; 3] = ["-", "+", "VC"];

/// One present-weather group, split into its coded parts.
///
/// `raw_code` is always kept. Codes the tables do not know end up in `other`
/// verbatim instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentWeather {
    intensity: Option<String>,
    descriptor: Option<String>,
    precipitation: Vec<String>,
    obscuration: Vec<String>,
    other: Vec<String>,
    raw_code: String,
}

impl PresentWeather {
    /// Build from already-split parts.
    ///
    /// An intensity or descriptor outside the fixed tables is moved to the
    /// front of `other`.
    pub fn new(
        intensity: Option<&str>,
        descriptor: Option<&str>,
        precipitation: Vec<String>,
        obscuration: Vec<String>,
        other: Vec<String>,
        raw_code: &str,
    ) -> Result<Self> {
        let raw_code = raw_code.trim().to_uppercase();
        ensure(!raw_code.is_empty(), || "Raw weather code cannot be blank".into())?;

        let normalize = |v: Option<&str>| v.map(|s| s.trim().to_uppercase()).filter(|s| !s.is_empty());
        let normalize_all = |list: Vec<String>| -> Vec<String> {
            list.into_iter()
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect()
        };

        let mut unknown = Vec::new();
        let intensity = match normalize(intensity) {
            Some(code) if INTENSITY_CODES.contains(&code.as_str()) => Some(code),
            Some(code) => {
                unknown.push(code);
                None
            }
            None => None,
        };
        let descriptor = match normalize(descriptor) {
            Some(code) if decoder::is_descriptor(&code) => Some(code),
            Some(code) => {
                unknown.push(code);
                None
            }
            None => None,
        };
        unknown.extend(normalize_all(other));

        Ok(Self {
            intensity,
            descriptor,
            precipitation: normalize_all(precipitation),
            obscuration: normalize_all(obscuration),
            other: unknown,
            raw_code,
        })
    }

    /// Keep only the raw code; nothing is split out.
    pub fn of(raw_code: &str) -> Result<Self> {
        Self::new(None, None, Vec::new(), Vec::new(), Vec::new(), raw_code)
    }

    /// Split a packed token such as `-SHRASNGR` or `VCTS`.
    ///
    /// Up to four two-letter phenomena are read after an optional intensity
    /// and descriptor; whatever is left over is kept as one `other` entry.
    pub fn parse(token: &str) -> Result<Self> {
        let code = token.trim().to_uppercase();
        if code.is_empty() {
            return Err(WeatherError::validation("Weather code cannot be blank"));
        }

        let (intensity, mut rest) = if let Some(stripped) = code.strip_prefix(['-', '+']) {
            (Some(&code[..1]), stripped)
        } else if let Some(stripped) = code.strip_prefix("VC") {
            (Some("VC"), stripped)
        } else {
            (None, code.as_str())
        };

        if rest == "NSW" {
            return Self::new(intensity, None, Vec::new(), Vec::new(), vec!["NSW".into()], &code);
        }

        let mut descriptor = None;
        if let Some(pair) = rest.get(..2).filter(|p| decoder::is_descriptor(p)) {
            descriptor = Some(pair);
            rest = &rest[2..];
        }

        let mut precipitation = Vec::new();
        let mut obscuration = Vec::new();
        let mut other = Vec::new();
        let mut consumed = 0;
        while consumed < MAX_PHENOMENA {
            let Some(pair) = rest.get(..2) else { break };
            match PhenomenonCategory::of(pair) {
                Some(PhenomenonCategory::Precipitation) => precipitation.push(pair.to_string()),
                Some(PhenomenonCategory::Obscuration) => obscuration.push(pair.to_string()),
                Some(PhenomenonCategory::Other) => other.push(pair.to_string()),
                None => break,
            }
            rest = &rest[2..];
            consumed += 1;
        }
        if !rest.is_empty() {
            other.push(rest.to_string());
        }

        Self::new(intensity, descriptor, precipitation, obscuration, other, &code)
    }

    pub fn intensity(&self) -> Option<&str> {
        self.intensity.as_deref()
    }

    pub fn descriptor(&self) -> Option<&str> {
        self.descriptor.as_deref()
    }

    pub fn precipitation(&self) -> &[String] {
        &self.precipitation
    }

    pub fn obscuration(&self) -> &[String] {
        &self.obscuration
    }

    pub fn other(&self) -> &[String] {
        &self.other
    }

    pub fn raw_code(&self) -> &str {
        &self.raw_code
    }

    pub fn is_no_significant_weather(&self) -> bool {
        self.other.iter().any(|c| c == "NSW") || self.raw_code == "NSW"
    }

    pub fn is_light(&self) -> bool {
        self.intensity.as_deref() == Some("-")
    }

    pub fn is_heavy(&self) -> bool {
        self.intensity.as_deref() == Some("+")
    }

    pub fn is_vicinity(&self) -> bool {
        self.intensity.as_deref() == Some("VC")
    }

    pub fn is_thunderstorm(&self) -> bool {
        self.descriptor.as_deref() == Some("TS")
    }

    pub fn is_freezing(&self) -> bool {
        self.descriptor.as_deref() == Some("FZ")
    }

    pub fn is_showers(&self) -> bool {
        self.descriptor.as_deref() == Some("SH")
    }

    pub fn has_precipitation(&self) -> bool {
        !self.precipitation.is_empty()
    }

    pub fn has_obscuration(&self) -> bool {
        !self.obscuration.is_empty()
    }

    pub fn intensity_description(&self) -> &'static str {
        match self.intensity.as_deref() {
            Some("-") => "Light",
            Some("+") => "Heavy",
            Some("VC") => "Vicinity",
            _ => "Moderate",
        }
    }

    fn is_unsplit(&self) -> bool {
        self.intensity.is_none()
            && self.descriptor.is_none()
            && self.precipitation.is_empty()
            && self.obscuration.is_empty()
            && self.other.is_empty()
    }

    pub fn description(&self) -> String {
        if self.is_no_significant_weather() {
            return decoder::NO_SIGNIFICANT_WEATHER.to_string();
        }
        if self.is_unsplit() {
            return decoder::decode_weather(&self.raw_code);
        }

        let mut parts = vec![self.intensity_description().to_string()];
        if let Some(descriptor) = &self.descriptor {
            parts.push(decoder::decode_descriptor(descriptor));
        }
        parts.extend(
            self.precipitation
                .iter()
                .chain(&self.obscuration)
                .chain(&self.other)
                .map(|code| decoder::decode_weather_phenomenon(code)),
        );
        parts.join(" ")
    }
}

impl std::fmt::Display for PresentWeather {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw_code)
    }
}
