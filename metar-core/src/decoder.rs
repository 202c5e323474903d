//! Lookup tables for abbreviated weather codes and the packed-token decoder.
//!
//! Every single-code lookup is lenient: a code missing from its table is
//! returned unchanged so regional extensions still read sensibly.
//!
//! The composite decoder reads a token such as `-SHRA` left to right in
//! fixed two-letter steps, with no backtracking:
//! - an optional intensity (`-`, `+`) or proximity (`VC`) prefix
//! - any number of descriptors
//! - any number of phenomena, each window checked against precipitation,
//!   then obscuration, then other
//! - whatever is left, verbatim

pub const IN_THE_VICINITY: &str = "In the Vicinity";
pub const NO_SIGNIFICANT_WEATHER: &str = "No Significant Weather";

pub const SKY_COVERAGE: &[(&str, &str)] = &[
    ("SKC", "Sky Clear"),
    ("CLR", "Clear"),
    ("NSC", "No Significant Clouds"),
    ("NCD", "No Clouds Detected"),
    ("FEW", "Few"),
    ("SCT", "Scattered"),
    ("BKN", "Broken"),
    ("OVC", "Overcast"),
    ("VV", "Vertical Visibility"),
    ("///", "Sky Obscured"),
];

pub const PRECIPITATION: &[(&str, &str)] = &[
    ("DZ", "Drizzle"),
    ("RA", "Rain"),
    ("SN", "Snow"),
    ("SG", "Snow Grains"),
    ("IC", "Ice Crystals"),
    ("PL", "Ice Pellets"),
    ("GR", "Hail"),
    ("GS", "Small Hail"),
    ("UP", "Unknown Precipitation"),
];

pub const OBSCURATION: &[(&str, &str)] = &[
    ("BR", "Mist"),
    ("FG", "Fog"),
    ("FU", "Smoke"),
    ("VA", "Volcanic Ash"),
    ("DU", "Widespread Dust"),
    ("SA", "Sand"),
    ("HZ", "Haze"),
    ("PY", "Spray"),
];

pub const OTHER_PHENOMENA: &[(&str, &str)] = &[
    ("PO", "Dust/Sand Whirls"),
    ("SQ", "Squalls"),
    ("FC", "Funnel Cloud"),
    ("SS", "Sandstorm"),
    ("DS", "Duststorm"),
];

pub const INTENSITY: &[(&str, &str)] = &[("-", "Light"), ("+", "Heavy"), ("VC", IN_THE_VICINITY)];

pub const DESCRIPTORS: &[(&str, &str)] = &[
    ("MI", "Shallow"),
    ("PR", "Partial"),
    ("BC", "Patches"),
    ("DR", "Low Drifting"),
    ("BL", "Blowing"),
    ("SH", "Shower(s)"),
    ("TS", "Thunderstorm"),
    ("FZ", "Freezing"),
];

pub const CLOUD_TYPES: &[(&str, &str)] = &[
    ("CB", "Cumulonimbus"),
    ("TCU", "Towering Cumulus"),
    ("CU", "Cumulus"),
    ("SC", "Stratocumulus"),
    ("ST", "Stratus"),
    ("NS", "Nimbostratus"),
    ("AS", "Altostratus"),
    ("AC", "Altocumulus"),
    ("CI", "Cirrus"),
    ("CC", "Cirrocumulus"),
    ("CS", "Cirrostratus"),
];

/// Which of the three phenomenon families a two-letter code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhenomenonCategory {
    Precipitation,
    Obscuration,
    Other,
}

impl PhenomenonCategory {
    /// Classify a code, testing precipitation first, then obscuration, then other.
    pub fn of(code: &str) -> Option<Self> {
        if lookup(PRECIPITATION, code).is_some() {
            Some(PhenomenonCategory::Precipitation)
        } else if lookup(OBSCURATION, code).is_some() {
            Some(PhenomenonCategory::Obscuration)
        } else if lookup(OTHER_PHENOMENA, code).is_some() {
            Some(PhenomenonCategory::Other)
        } else {
            None
        }
    }
}

pub fn lookup(table: &[(&str, &'static str)], code: &str) -> Option<&'static str> {
    table.iter().find(|(key, _)| *key == code).map(|(_, value)| *value)
}

pub fn is_descriptor(code: &str) -> bool {
    lookup(DESCRIPTORS, code).is_some()
}

fn decode_with(table: &[(&str, &'static str)], code: &str) -> String {
    if code.trim().is_empty() {
        return String::new();
    }
    let normalized = code.trim().to_uppercase();
    match lookup(table, &normalized) {
        Some(description) => description.to_string(),
        None => code.to_string(),
    }
}

pub fn decode_sky_coverage(code: &str) -> String {
    decode_with(SKY_COVERAGE, code)
}

pub fn decode_weather_phenomenon(code: &str) -> String {
    if code.trim().is_empty() {
        return String::new();
    }
    let normalized = code.trim().to_uppercase();
    phenomenon_description(&normalized)
        .map(str::to_string)
        .unwrap_or_else(|| code.to_string())
}

/// Intensity is the one table that does not echo: unknown markers decode to "".
pub fn decode_intensity(code: &str) -> String {
    lookup(INTENSITY, code.trim()).unwrap_or_default().to_string()
}

pub fn decode_descriptor(code: &str) -> String {
    decode_with(DESCRIPTORS, code)
}

pub fn decode_cloud_type(code: &str) -> String {
    decode_with(CLOUD_TYPES, code)
}

pub(crate) fn phenomenon_description(code: &str) -> Option<&'static str> {
    lookup(PRECIPITATION, code)
        .or_else(|| lookup(OBSCURATION, code))
        .or_else(|| lookup(OTHER_PHENOMENA, code))
}

/// Decode a packed present-weather token into a phrase.
///
/// `"-SHRA"` becomes `"Light Shower(s) Rain"`, `"VCFG"` becomes
/// `"Fog In the Vicinity"` and `"RAXX"` keeps its unknown tail: `"Rain XX"`.
pub fn decode_weather(code: &str) -> String {
    let normalized = code.trim().to_uppercase();
    if normalized.is_empty() {
        return String::new();
    }
    if normalized == "NSW" {
        return NO_SIGNIFICANT_WEATHER.to_string();
    }

    let mut parts: Vec<&str> = Vec::new();
    let mut rest = normalized.as_str();
    let mut vicinity = false;

    if let Some(stripped) = rest.strip_prefix('+') {
        parts.push("Heavy");
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('-') {
        parts.push("Light");
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix("VC") {
        vicinity = true;
        rest = stripped;
    }

    rest = consume_pairs(rest, &mut parts, |pair| lookup(DESCRIPTORS, pair));
    rest = consume_pairs(rest, &mut parts, phenomenon_description);

    if vicinity {
        parts.push(IN_THE_VICINITY);
    }
    if !rest.is_empty() {
        parts.push(rest);
    }

    parts.join(" ").trim().to_string()
}

/// Consume leading two-letter codes while `decode` recognizes them.
fn consume_pairs<'a>(
    mut rest: &'a str,
    parts: &mut Vec<&'a str>,
    decode: impl Fn(&str) -> Option<&'static str>,
) -> &'a str {
    while let Some(pair) = rest.get(..2) {
        match decode(pair) {
            Some(description) => {
                parts.push(description);
                rest = &rest[2..];
            }
            None => break,
        }
    }
    rest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_documented_weather_tokens() {
        assert_eq!(decode_weather("-SHRA"), "Light Shower(s) Rain");
        assert_eq!(decode_weather("+TSRA"), "Heavy Thunderstorm Rain");
        assert_eq!(decode_weather("VCFG"), "Fog In the Vicinity");
        assert_eq!(decode_weather("BR"), "Mist");
        assert_eq!(decode_weather("RAXX"), "Rain XX");
    }

    #[test]
    fn nsw_and_blank_tokens() {
        assert_eq!(decode_weather("NSW"), "No Significant Weather");
        assert_eq!(decode_weather(" nsw "), "No Significant Weather");
        assert_eq!(decode_weather("   "), "");
    }

    #[test]
    fn packed_token_with_several_phenomena() {
        assert_eq!(
            decode_weather("-SHRASNGR"),
            "Light Shower(s) Rain Snow Hail"
        );
        assert_eq!(decode_weather("FZFG"), "Freezing Fog");
        assert_eq!(decode_weather("+FC"), "Heavy Funnel Cloud");
    }

    #[test]
    fn lowercase_input_is_canonicalized() {
        assert_eq!(decode_weather("-shra"), "Light Shower(s) Rain");
    }

    #[test]
    fn descriptor_only_token() {
        assert_eq!(decode_weather("TS"), "Thunderstorm");
        assert_eq!(decode_weather("VCTS"), "Thunderstorm In the Vicinity");
    }

    #[test]
    fn single_lookups_echo_unknown_codes() {
        assert_eq!(decode_sky_coverage("BKN"), "Broken");
        assert_eq!(decode_sky_coverage("///"), "Sky Obscured");
        assert_eq!(decode_sky_coverage("XYZ"), "XYZ");
        assert_eq!(decode_weather_phenomenon("ra"), "Rain");
        assert_eq!(decode_weather_phenomenon("QQ"), "QQ");
        assert_eq!(decode_descriptor("FZ"), "Freezing");
        assert_eq!(decode_descriptor("ZZ"), "ZZ");
        assert_eq!(decode_cloud_type("TCU"), "Towering Cumulus");
        assert_eq!(decode_cloud_type("ACC"), "ACC");
        assert_eq!(decode_cloud_type(""), "");
    }

    #[test]
    fn intensity_lookup_does_not_echo() {
        assert_eq!(decode_intensity("-"), "Light");
        assert_eq!(decode_intensity("+"), "Heavy");
        assert_eq!(decode_intensity("VC"), "In the Vicinity");
        assert_eq!(decode_intensity("?"), "");
    }

    #[test]
    fn categories_follow_priority_order() {
        assert_eq!(PhenomenonCategory::of("RA"), Some(PhenomenonCategory::Precipitation));
        assert_eq!(PhenomenonCategory::of("HZ"), Some(PhenomenonCategory::Obscuration));
        assert_eq!(PhenomenonCategory::of("SQ"), Some(PhenomenonCategory::Other));
        assert_eq!(PhenomenonCategory::of("XX"), None);
    }
}
