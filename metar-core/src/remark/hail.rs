use serde::{Deserialize, Serialize};

use crate::error::{Result, ensure};

const CM_PER_INCH: f64 = 2.54;
const MAX_INCHES: f64 = 10.0;
const SEVERE_INCHES: f64 = 1.0;
const SIGNIFICANTLY_SEVERE_INCHES: f64 = 2.0;

const SIZE_CATEGORIES: [(f64, &str); 9] = [
    (0.25, "Pea-sized"),
    (0.50, "Marble-sized"),
    (0.75, "Penny-sized"),
    (0.88, "Nickel-sized"),
    (1.50, "Quarter-sized"),
    (1.75, "Golf ball-sized"),
    (2.50, "Tennis ball-sized"),
    (2.75, "Baseball-sized"),
    (4.00, "Softball-sized"),
];

/// `GR 1 3/4`: largest hailstone diameter, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HailSize {
    inches: f64,
}

impl HailSize {
    pub fn new(inches: f64) -> Result<Self> {
        ensure(inches > 0.0, || format!("Hail size must be positive, got: {inches}"))?;
        ensure(inches <= MAX_INCHES, || format!("Hail size unreasonably large, got: {inches}"))?;
        Ok(Self { inches })
    }

    pub fn inches(inches: f64) -> Result<Self> {
        Self::new(inches)
    }

    pub fn centimeters(cm: f64) -> Result<Self> {
        Self::new(cm / CM_PER_INCH)
    }

    pub fn millimeters(mm: f64) -> Result<Self> {
        Self::new(mm / (CM_PER_INCH * 10.0))
    }

    pub fn size_inches(&self) -> f64 {
        self.inches
    }

    pub fn to_centimeters(&self) -> f64 {
        self.inches * CM_PER_INCH
    }

    pub fn to_millimeters(&self) -> f64 {
        self.inches * CM_PER_INCH * 10.0
    }

    pub fn size_category(&self) -> &'static str {
        SIZE_CATEGORIES
            .iter()
            .find(|(limit, _)| self.inches < *limit)
            .map(|(_, name)| *name)
            .unwrap_or("Grapefruit-sized or larger")
    }

    pub fn is_severe(&self) -> bool {
        self.inches >= SEVERE_INCHES
    }

    pub fn is_significantly_severe(&self) -> bool {
        self.inches >= SIGNIFICANTLY_SEVERE_INCHES
    }

    pub fn description(&self) -> String {
        format!("{:.2} inches ({})", self.inches, self.size_category())
    }

    pub fn summary(&self) -> String {
        let severity = if self.is_significantly_severe() {
            " (significantly severe)"
        } else if self.is_severe() {
            " (severe)"
        } else {
            ""
        };
        format!("{:.2}\"{severity}", self.inches)
    }
}

impl std::fmt::Display for HailSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_thresholds() {
        let size = |inches| HailSize::new(inches).expect("valid").size_category();
        assert_eq!(size(0.1), "Pea-sized");
        assert_eq!(size(0.25), "Marble-sized");
        assert_eq!(size(1.0), "Quarter-sized");
        assert_eq!(size(1.75), "Tennis ball-sized");
        assert_eq!(size(4.0), "Grapefruit-sized or larger");
    }

    #[test]
    fn severity_and_formatting() {
        let hail = HailSize::new(1.75).expect("valid");
        assert!(hail.is_severe());
        assert!(!hail.is_significantly_severe());
        assert_eq!(hail.summary(), "1.75\" (severe)");
        assert_eq!(hail.description(), "1.75 inches (Tennis ball-sized)");
        assert_eq!(HailSize::new(2.5).expect("valid").summary(), "2.50\" (significantly severe)");
        assert!((HailSize::centimeters(2.54).expect("valid").size_inches() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_non_positive_and_huge() {
        assert!(HailSize::new(0.0).unwrap_err().to_string().contains("must be positive"));
        assert!(HailSize::new(10.5).unwrap_err().to_string().contains("unreasonably large"));
    }
}
