use serde::{Deserialize, Serialize};

use crate::error::{Result, WeatherError, ensure};

const CLOUD_TYPES: [(&str, &str); 6] = [
    ("TS", "Thunderstorm"),
    ("CB", "Cumulonimbus"),
    ("TCU", "Towering Cumulus"),
    ("ACC", "Altocumulus Castellanus"),
    ("CBMAM", "Cumulonimbus Mammatus"),
    ("VIRGA", "Virga"),
];

const QUALIFIERS: [(&str, &str); 6] = [
    ("OHD", "Overhead"),
    ("VC", "In vicinity"),
    ("DSNT", "Distant"),
    ("DSIPTD", "Dissipated"),
    ("TOP", "At or above level"),
    ("TR", "At all quadrants"),
];

fn describe(table: &[(&str, &'static str)], code: &str) -> Option<&'static str> {
    table.iter().find(|(key, _)| *key == code).map(|(_, text)| *text)
}

/// Location and movement of convective cloud, e.g. `CB DSNT NW MOV E` or `TS SE-S`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThunderstormLocation {
    cloud_type: String,
    location_qualifier: Option<String>,
    direction: Option<String>,
    direction_range: Option<String>,
    moving_direction: Option<String>,
}

impl ThunderstormLocation {
    pub fn new(
        cloud_type: &str,
        location_qualifier: Option<&str>,
        direction: Option<&str>,
        direction_range: Option<&str>,
        moving_direction: Option<&str>,
    ) -> Result<Self> {
        let cloud_type = cloud_type.trim().to_uppercase();
        if describe(&CLOUD_TYPES, &cloud_type).is_none() {
            return Err(WeatherError::validation(format!(
                "Invalid thunderstorm cloud type: {cloud_type}"
            )));
        }
        let normalize = |v: Option<&str>| v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_uppercase);
        let location_qualifier = normalize(location_qualifier);
        if let Some(q) = &location_qualifier {
            ensure(describe(&QUALIFIERS, q).is_some(), || {
                format!("Invalid location qualifier: {q}")
            })?;
        }
        let direction = normalize(direction);
        let direction_range = normalize(direction_range);
        ensure(direction_range.is_none() || direction.is_some(), || {
            "Direction range requires a starting direction".into()
        })?;

        Ok(Self {
            cloud_type,
            location_qualifier,
            direction,
            direction_range,
            moving_direction: normalize(moving_direction),
        })
    }

    pub fn of(cloud_type: &str, direction: &str) -> Result<Self> {
        Self::new(cloud_type, None, Some(direction), None, None)
    }

    pub fn with_movement(cloud_type: &str, direction: &str, moving_direction: &str) -> Result<Self> {
        Self::new(cloud_type, None, Some(direction), None, Some(moving_direction))
    }

    pub fn cloud_type(&self) -> &str {
        &self.cloud_type
    }

    pub fn location_qualifier(&self) -> Option<&str> {
        self.location_qualifier.as_deref()
    }

    pub fn direction(&self) -> Option<&str> {
        self.direction.as_deref()
    }

    pub fn direction_range(&self) -> Option<&str> {
        self.direction_range.as_deref()
    }

    pub fn moving_direction(&self) -> Option<&str> {
        self.moving_direction.as_deref()
    }

    pub fn is_moving(&self) -> bool {
        self.moving_direction.is_some()
    }

    pub fn is_thunderstorm(&self) -> bool {
        self.cloud_type == "TS"
    }

    pub fn has_direction_range(&self) -> bool {
        self.direction_range.is_some()
    }

    pub fn has_location_qualifier(&self) -> bool {
        self.location_qualifier.is_some()
    }

    pub fn summary(&self) -> String {
        let mut out = describe(&CLOUD_TYPES, &self.cloud_type)
            .unwrap_or(self.cloud_type.as_str())
            .to_string();
        if let Some(q) = &self.location_qualifier {
            out.push(' ');
            out.push_str(describe(&QUALIFIERS, q).unwrap_or(q.as_str()));
        }
        if let Some(dir) = &self.direction {
            out.push(' ');
            out.push_str(dir);
            if let Some(range) = &self.direction_range {
                out.push('-');
                out.push_str(range);
            }
        }
        if let Some(moving) = &self.moving_direction {
            out.push_str(" Moving ");
            out.push_str(moving);
        }
        out
    }
}

impl std::fmt::Display for ThunderstormLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_forms() {
        let ts = ThunderstormLocation::with_movement("TS", "SE", "NE").expect("valid");
        assert!(ts.is_thunderstorm());
        assert!(ts.is_moving());
        assert_eq!(ts.summary(), "Thunderstorm SE Moving NE");

        let cb = ThunderstormLocation::new("cb", Some("DSNT"), Some("W"), Some("NW"), None).expect("valid");
        assert!(cb.has_direction_range());
        assert!(cb.has_location_qualifier());
        assert_eq!(cb.summary(), "Cumulonimbus Distant W-NW");

        let ohd = ThunderstormLocation::new("CBMAM", Some("OHD"), None, None, None).expect("valid");
        assert_eq!(ohd.summary(), "Cumulonimbus Mammatus Overhead");
    }

    #[test]
    fn rejects_unknown_codes() {
        assert!(ThunderstormLocation::of("CU", "N").unwrap_err().to_string().contains("cloud type"));
        assert!(
            ThunderstormLocation::new("TS", Some("FAR"), None, None, None)
                .unwrap_err()
                .to_string()
                .contains("Invalid location qualifier")
        );
        assert!(ThunderstormLocation::new("TS", None, None, Some("N"), None).is_err());
    }
}
