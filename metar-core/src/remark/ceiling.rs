use serde::{Deserialize, Serialize};

use crate::error::{Result, ensure};

const LOW_CEILING_FEET: i32 = 1000;
const SIGNIFICANT_VARIATION_FEET: i32 = 500;

/// `CIG lllVhhh`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableCeiling {
    minimum_height_feet: i32,
    maximum_height_feet: i32,
}

impl VariableCeiling {
    pub fn new(minimum_height_feet: i32, maximum_height_feet: i32) -> Result<Self> {
        ensure(minimum_height_feet >= 0 && maximum_height_feet >= 0, || {
            "Ceiling heights cannot be negative".into()
        })?;
        ensure(minimum_height_feet <= maximum_height_feet, || {
            format!("Minimum ceiling ({minimum_height_feet} ft) cannot exceed maximum ({maximum_height_feet} ft)")
        })?;
        Ok(Self {
            minimum_height_feet,
            maximum_height_feet,
        })
    }

    pub fn from_hundreds(min_hundreds: i32, max_hundreds: i32) -> Result<Self> {
        Self::new(min_hundreds * 100, max_hundreds * 100)
    }

    pub fn minimum_height_feet(&self) -> i32 {
        self.minimum_height_feet
    }

    pub fn maximum_height_feet(&self) -> i32 {
        self.maximum_height_feet
    }

    pub fn range_feet(&self) -> i32 {
        self.maximum_height_feet - self.minimum_height_feet
    }

    pub fn is_low_ceiling(&self) -> bool {
        self.minimum_height_feet < LOW_CEILING_FEET
    }

    pub fn is_significant_variation(&self) -> bool {
        self.range_feet() >= SIGNIFICANT_VARIATION_FEET
    }

    pub fn summary(&self) -> String {
        format!(
            "Variable ceiling: {}-{} ft",
            self.minimum_height_feet, self.maximum_height_feet
        )
    }
}

impl std::fmt::Display for VariableCeiling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

/// `CIG hhh RWYnn`: ceiling measured at a second sensor site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CeilingSecondSite {
    height_feet: i32,
    location: Option<String>,
}

impl CeilingSecondSite {
    pub fn new(height_feet: i32, location: Option<&str>) -> Result<Self> {
        ensure(height_feet >= 0, || "Ceiling height cannot be negative".into())?;
        Ok(Self {
            height_feet,
            location: location.map(str::trim).filter(|l| !l.is_empty()).map(str::to_uppercase),
        })
    }

    pub fn from_hundreds(hundreds: i32, location: Option<&str>) -> Result<Self> {
        Self::new(hundreds * 100, location)
    }

    pub fn height_feet(&self) -> i32 {
        self.height_feet
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn is_low_ceiling(&self) -> bool {
        self.height_feet < LOW_CEILING_FEET
    }

    pub fn summary(&self) -> String {
        match &self.location {
            Some(loc) => format!("Ceiling {} ft at {loc}", self.height_feet),
            None => format!("Ceiling {} ft", self.height_feet),
        }
    }
}

impl std::fmt::Display for CeilingSecondSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}
