use serde::{Deserialize, Serialize};

use crate::{
    components::{
        Visibility,
        visibility::format_distance,
    },
    error::{Result, ensure},
};

const DIRECTIONS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
const SIGNIFICANT_SPREAD_SM: f64 = 1.0;

/// `VIS 1/2V2` or, with a sector, `VIS NE 2V4`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableVisibility {
    minimum: Visibility,
    maximum: Visibility,
    direction: Option<String>,
    location: Option<String>,
}

impl VariableVisibility {
    pub fn new(
        minimum: Visibility,
        maximum: Visibility,
        direction: Option<&str>,
        location: Option<&str>,
    ) -> Result<Self> {
        if let (Some(min), Some(max)) = (minimum.to_statute_miles(), maximum.to_statute_miles()) {
            ensure(min <= max, || {
                format!("Minimum visibility ({min:.2} SM) cannot be greater than maximum ({max:.2} SM)")
            })?;
        }
        let normalize = |v: Option<&str>| v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_uppercase);
        let direction = normalize(direction);
        if let Some(dir) = &direction {
            ensure(DIRECTIONS.contains(&dir.as_str()), || {
                format!("Invalid direction: {dir}. Must be N, NE, E, SE, S, SW, W, or NW")
            })?;
        }

        Ok(Self {
            minimum,
            maximum,
            direction,
            location: normalize(location),
        })
    }

    pub fn of(minimum: Visibility, maximum: Visibility) -> Result<Self> {
        Self::new(minimum, maximum, None, None)
    }

    pub fn with_direction(minimum: Visibility, maximum: Visibility, direction: &str) -> Result<Self> {
        Self::new(minimum, maximum, Some(direction), None)
    }

    pub fn with_location(minimum: Visibility, maximum: Visibility, location: &str) -> Result<Self> {
        Self::new(minimum, maximum, None, Some(location))
    }

    pub fn minimum(&self) -> &Visibility {
        &self.minimum
    }

    pub fn maximum(&self) -> &Visibility {
        &self.maximum
    }

    pub fn direction(&self) -> Option<&str> {
        self.direction.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn spread(&self) -> Option<f64> {
        Some(self.maximum.to_statute_miles()? - self.minimum.to_statute_miles()?)
    }

    pub fn has_significant_variability(&self) -> bool {
        self.spread().is_some_and(|s| s > SIGNIFICANT_SPREAD_SM)
    }

    pub fn range(&self) -> String {
        format!("{} to {}", format_bound(&self.minimum), format_bound(&self.maximum))
    }

    pub fn description(&self) -> String {
        let mut out = String::new();
        if let Some(dir) = &self.direction {
            out.push_str(dir);
            out.push(' ');
        }
        out.push_str("visibility varying from ");
        out.push_str(&self.range());
        if let Some(loc) = &self.location {
            out.push_str(&format!(" ({loc})"));
        }
        out
    }
}

impl std::fmt::Display for VariableVisibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description())
    }
}

fn format_bound(vis: &Visibility) -> String {
    if let Some(special) = vis.special_condition() {
        return special.as_str().to_string();
    }
    let (Some(distance), Some(unit)) = (vis.distance(), vis.unit()) else {
        return "unknown".into();
    };
    let modifier = if vis.is_less_than() {
        "less than "
    } else if vis.is_greater_than() {
        "greater than "
    } else {
        ""
    };
    format!("{modifier}{} {unit}", format_distance(distance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sm(miles: f64) -> Visibility {
        Visibility::statute_miles(miles).expect("valid visibility")
    }

    #[test]
    fn describes_fractional_range() {
        let vis = VariableVisibility::of(sm(0.5), sm(2.0)).expect("valid");
        assert_eq!(vis.description(), "visibility varying from 1/2 SM to 2 SM");
        assert_eq!(vis.spread(), Some(1.5));
        assert!(vis.has_significant_variability());
    }

    #[test]
    fn directional_form() {
        let vis = VariableVisibility::with_direction(sm(2.0), sm(2.5), "ne").expect("valid");
        assert_eq!(vis.direction(), Some("NE"));
        assert_eq!(vis.description(), "NE visibility varying from 2 SM to 2 1/2 SM");
        assert!(!vis.has_significant_variability());

        let err = VariableVisibility::with_direction(sm(1.0), sm(2.0), "NNE").unwrap_err();
        assert!(err.to_string().contains("Invalid direction: NNE"));
    }

    #[test]
    fn minimum_cannot_exceed_maximum() {
        let err = VariableVisibility::of(sm(3.0), sm(1.0)).unwrap_err();
        assert!(err.to_string().contains("Minimum visibility (3.00 SM) cannot be greater than maximum (1.00 SM)"));
    }
}
