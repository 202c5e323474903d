use serde::{Deserialize, Serialize};

use crate::error::{Result, WeatherError, ensure};

const MM_PER_INCH: f64 = 25.4;
const MEASURABLE_INCHES: f64 = 0.01;

/// Accumulated precipitation over 1, 3, 6 or 24 hours.
///
/// A trace carries no amount; `inches` is `None` and `trace` is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecipitationAmount {
    inches: Option<f64>,
    period_hours: u8,
    trace: bool,
}

impl PrecipitationAmount {
    pub fn new(inches: Option<f64>, period_hours: u8, trace: bool) -> Result<Self> {
        ensure(matches!(period_hours, 1 | 3 | 6 | 24), || {
            format!("Period must be 1, 3, 6, or 24 hours, got: {period_hours}")
        })?;
        if let Some(amount) = inches {
            ensure(amount >= 0.0, || format!("Precipitation amount cannot be negative: {amount}"))?;
            ensure(!trace || amount < MEASURABLE_INCHES, || {
                format!("Trace precipitation should have no amount or < 0.01 inches, got: {amount}")
            })?;
        }
        Ok(Self {
            inches,
            period_hours,
            trace,
        })
    }

    pub fn inches(inches: f64, period_hours: u8) -> Result<Self> {
        Self::new(Some(inches), period_hours, false)
    }

    pub fn trace(period_hours: u8) -> Result<Self> {
        Self::new(None, period_hours, true)
    }

    /// Decode hundredths of an inch (`0009`, `125`), or all slashes for a trace.
    pub fn from_encoded(encoded: &str, period_hours: u8) -> Result<Self> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(WeatherError::validation("Encoded value cannot be blank"));
        }
        if encoded.chars().all(|c| c == '/') {
            return Self::trace(period_hours);
        }
        let hundredths: u32 = encoded
            .parse()
            .map_err(|_| WeatherError::validation(format!("Invalid encoded value: {encoded}")))?;
        Self::inches(f64::from(hundredths) / 100.0, period_hours)
    }

    pub fn amount_inches(&self) -> Option<f64> {
        self.inches
    }

    pub fn period_hours(&self) -> u8 {
        self.period_hours
    }

    pub fn is_trace(&self) -> bool {
        self.trace
    }

    pub fn to_millimeters(&self) -> Option<f64> {
        self.inches.map(|i| i * MM_PER_INCH)
    }

    pub fn is_measurable(&self) -> bool {
        !self.trace && self.inches.is_some_and(|i| i >= MEASURABLE_INCHES)
    }

    pub fn is_hourly(&self) -> bool {
        self.period_hours == 1
    }

    pub fn is_six_hour(&self) -> bool {
        self.period_hours == 6
    }

    pub fn is_twenty_four_hour(&self) -> bool {
        self.period_hours == 24
    }

    pub fn description(&self) -> String {
        match (self.trace, self.inches) {
            (true, _) => format!("Trace precipitation ({} hour)", self.period_hours),
            (false, None) => format!("Precipitation data missing ({} hour)", self.period_hours),
            (false, Some(i)) => format!("{i:.2} inches ({} hour)", self.period_hours),
        }
    }
}

impl std::fmt::Display for PrecipitationAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_hundredths() {
        let amount = PrecipitationAmount::from_encoded("0009", 1).expect("valid");
        assert_eq!(amount.amount_inches(), Some(0.09));
        assert!(amount.is_hourly());
        assert!(amount.is_measurable());
        assert_eq!(amount.description(), "0.09 inches (1 hour)");

        let big = PrecipitationAmount::from_encoded("0125", 24).expect("valid");
        assert!(big.is_twenty_four_hour());
        assert!((big.to_millimeters().expect("amount") - 31.75).abs() < 1e-9);
    }

    #[test]
    fn slashes_mean_trace() {
        let trace = PrecipitationAmount::from_encoded("////", 6).expect("valid");
        assert!(trace.is_trace());
        assert!(!trace.is_measurable());
        assert_eq!(trace.description(), "Trace precipitation (6 hour)");
    }

    #[test]
    fn validation() {
        let err = PrecipitationAmount::inches(0.5, 2).unwrap_err();
        assert!(err.to_string().contains("Period must be 1, 3, 6, or 24 hours"));
        assert!(PrecipitationAmount::inches(-0.1, 1).is_err());
        assert!(PrecipitationAmount::new(Some(0.5), 3, true).is_err());
        assert!(PrecipitationAmount::from_encoded("12A4", 3).is_err());
        assert!(PrecipitationAmount::from_encoded(" ", 3).is_err());
        assert_eq!(
            PrecipitationAmount::new(None, 3, false).expect("valid").description(),
            "Precipitation data missing (3 hour)"
        );
    }
}
