use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

use crate::{
    error::{Result, WeatherError, ensure},
    model::conditions::WeatherConditions,
};

const MAX_CHANGE_PERIOD_HOURS: i64 = 12;
const VALID_PROBABILITIES: [u8; 2] = [30, 40];

/// Kind of a TAF forecast period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeIndicator {
    Base,
    Fm,
    Tempo,
    Becmg,
    Prob,
}

impl ChangeIndicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeIndicator::Base => "BASE",
            ChangeIndicator::Fm => "FM",
            ChangeIndicator::Tempo => "TEMPO",
            ChangeIndicator::Becmg => "BECMG",
            ChangeIndicator::Prob => "PROB",
        }
    }

    pub const fn all() -> &'static [ChangeIndicator] {
        &[
            ChangeIndicator::Base,
            ChangeIndicator::Fm,
            ChangeIndicator::Tempo,
            ChangeIndicator::Becmg,
            ChangeIndicator::Prob,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChangeIndicator::Base => "Base Forecast",
            ChangeIndicator::Fm => "From",
            ChangeIndicator::Tempo => "Temporary",
            ChangeIndicator::Becmg => "Becoming",
            ChangeIndicator::Prob => "Probability",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ChangeIndicator::Base => "Initial conditions for the forecast period",
            ChangeIndicator::Fm => "Permanent change starting at exact time",
            ChangeIndicator::Tempo => "Temporary fluctuations (< 1hr at a time, < half of period)",
            ChangeIndicator::Becmg => "Gradual change over the specified period",
            ChangeIndicator::Prob => "Probabilistic forecast (PROB30 or PROB40)",
        }
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self, ChangeIndicator::Base | ChangeIndicator::Fm)
    }

    pub fn is_temporary(&self) -> bool {
        *self == ChangeIndicator::Tempo
    }

    pub fn is_gradual(&self) -> bool {
        *self == ChangeIndicator::Becmg
    }

    pub fn is_probabilistic(&self) -> bool {
        *self == ChangeIndicator::Prob
    }

    /// TEMPO, BECMG and PROB cover a `ddHH/ddHH` window.
    pub fn requires_time_period(&self) -> bool {
        matches!(
            self,
            ChangeIndicator::Tempo | ChangeIndicator::Becmg | ChangeIndicator::Prob
        )
    }

    pub fn uses_exact_time(&self) -> bool {
        *self == ChangeIndicator::Fm
    }

    pub fn summary(&self) -> String {
        format!("{} ({}): {}", self.as_str(), self.display_name(), self.description())
    }
}

impl std::fmt::Display for ChangeIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ChangeIndicator {
    type Error = WeatherError;

    /// Accepts `PROB30`/`PROB40` as well as the bare codes.
    fn try_from(value: &str) -> Result<Self> {
        let upper = value.trim().to_uppercase();
        if upper.starts_with("PROB") {
            return Ok(ChangeIndicator::Prob);
        }
        ChangeIndicator::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == upper)
            .ok_or_else(|| WeatherError::validation(format!("Unknown change indicator: {value}")))
    }
}

/// One TAF period: the base forecast or a change group.
///
/// FM periods carry a single change time; TEMPO, BECMG and PROB periods carry
/// a half-open `[period_start, period_end)` window of at most 12 hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    change_indicator: ChangeIndicator,
    change_time: Option<DateTime<Utc>>,
    period_start: Option<DateTime<Utc>>,
    period_end: Option<DateTime<Utc>>,
    probability: Option<u8>,
    tempo: bool,
    conditions: WeatherConditions,
}

impl ForecastPeriod {
    pub fn new(
        change_indicator: ChangeIndicator,
        change_time: Option<DateTime<Utc>>,
        period_start: Option<DateTime<Utc>>,
        period_end: Option<DateTime<Utc>>,
        probability: Option<u8>,
        tempo: bool,
        conditions: WeatherConditions,
    ) -> Result<Self> {
        match change_indicator {
            ChangeIndicator::Fm => {
                ensure(change_time.is_some(), || "FM forecast must have a change time".into())?;
                ensure(period_start.is_none() && period_end.is_none(), || {
                    "FM forecast should not have period start/end".into()
                })?;
            }
            ChangeIndicator::Tempo | ChangeIndicator::Becmg | ChangeIndicator::Prob => {
                let (Some(start), Some(end)) = (period_start, period_end) else {
                    return Err(WeatherError::validation(format!(
                        "{change_indicator} forecast must have period start and end"
                    )));
                };
                ensure(change_time.is_none(), || {
                    format!("{change_indicator} forecast should not have a change time")
                })?;
                ensure(start < end, || "Period start must be before period end".into())?;
                let hours = (end - start).num_hours();
                ensure(hours <= MAX_CHANGE_PERIOD_HOURS, || {
                    format!("Forecast period too long ({hours} hours). Maximum is {MAX_CHANGE_PERIOD_HOURS}")
                })?;
            }
            ChangeIndicator::Base => {
                if let (Some(start), Some(end)) = (period_start, period_end) {
                    ensure(start < end, || "Period start must be before period end".into())?;
                }
            }
        }

        if change_indicator == ChangeIndicator::Prob {
            let p = probability.ok_or_else(|| WeatherError::validation("PROB forecast must have a probability"))?;
            ensure(VALID_PROBABILITIES.contains(&p), || {
                format!("Invalid probability: {p}. Must be 30 or 40")
            })?;
        } else {
            ensure(probability.is_none(), || {
                format!("Only PROB forecasts should have probability, got {change_indicator}")
            })?;
            ensure(!tempo, || "Only PROB forecasts can carry a TEMPO qualifier".into())?;
        }

        Ok(Self {
            change_indicator,
            change_time,
            period_start,
            period_end,
            probability,
            tempo,
            conditions,
        })
    }

    pub fn base(
        period_start: Option<DateTime<Utc>>,
        period_end: Option<DateTime<Utc>>,
        conditions: WeatherConditions,
    ) -> Result<Self> {
        Self::new(ChangeIndicator::Base, None, period_start, period_end, None, false, conditions)
    }

    pub fn from(change_time: DateTime<Utc>, conditions: WeatherConditions) -> Result<Self> {
        Self::new(ChangeIndicator::Fm, Some(change_time), None, None, None, false, conditions)
    }

    pub fn tempo(start: DateTime<Utc>, end: DateTime<Utc>, conditions: WeatherConditions) -> Result<Self> {
        Self::new(ChangeIndicator::Tempo, None, Some(start), Some(end), None, false, conditions)
    }

    pub fn becoming(start: DateTime<Utc>, end: DateTime<Utc>, conditions: WeatherConditions) -> Result<Self> {
        Self::new(ChangeIndicator::Becmg, None, Some(start), Some(end), None, false, conditions)
    }

    pub fn prob(
        probability: u8,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        conditions: WeatherConditions,
    ) -> Result<Self> {
        Self::new(ChangeIndicator::Prob, None, Some(start), Some(end), Some(probability), false, conditions)
    }

    /// `PROB30 TEMPO` / `PROB40 TEMPO`.
    pub fn prob_tempo(
        probability: u8,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        conditions: WeatherConditions,
    ) -> Result<Self> {
        Self::new(ChangeIndicator::Prob, None, Some(start), Some(end), Some(probability), true, conditions)
    }

    pub fn change_indicator(&self) -> ChangeIndicator {
        self.change_indicator
    }

    pub fn change_time(&self) -> Option<DateTime<Utc>> {
        self.change_time
    }

    pub fn period_start(&self) -> Option<DateTime<Utc>> {
        self.period_start
    }

    pub fn period_end(&self) -> Option<DateTime<Utc>> {
        self.period_end
    }

    pub fn probability(&self) -> Option<u8> {
        self.probability
    }

    pub fn conditions(&self) -> &WeatherConditions {
        &self.conditions
    }

    pub fn is_base_forecast(&self) -> bool {
        self.change_indicator == ChangeIndicator::Base
    }

    pub fn is_permanent_change(&self) -> bool {
        self.change_indicator == ChangeIndicator::Fm
    }

    pub fn is_temporary_change(&self) -> bool {
        self.change_indicator == ChangeIndicator::Tempo || self.tempo
    }

    pub fn is_gradual_change(&self) -> bool {
        self.change_indicator == ChangeIndicator::Becmg
    }

    pub fn is_probabilistic(&self) -> bool {
        self.change_indicator == ChangeIndicator::Prob
    }

    pub fn has_time_range(&self) -> bool {
        self.period_start.is_some() && self.period_end.is_some()
    }

    pub fn effective_start_time(&self) -> Option<DateTime<Utc>> {
        self.change_time.or(self.period_start)
    }

    pub fn effective_end_time(&self) -> Option<DateTime<Utc>> {
        self.period_end
    }

    pub fn period_duration(&self) -> Option<Duration> {
        match (self.period_start, self.period_end) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    pub fn period_duration_hours(&self) -> Option<i64> {
        self.period_duration().map(|d| d.num_hours())
    }

    /// FM periods hold from their change time onwards; windowed periods are half-open.
    pub fn is_active_at(&self, time: DateTime<Utc>) -> bool {
        if let Some(change) = self.change_time {
            return time >= change;
        }
        match (self.period_start, self.period_end) {
            (Some(start), Some(end)) => start <= time && time < end,
            _ => false,
        }
    }

    pub fn has_significant_weather(&self) -> bool {
        self.conditions.has_significant_weather()
    }

    pub fn to_taf_format(&self) -> String {
        let window = match (self.period_start, self.period_end) {
            (Some(start), Some(end)) => Some(format!("{}/{}", start.format("%d%H"), end.format("%d%H"))),
            _ => None,
        };

        let head = match self.change_indicator {
            ChangeIndicator::Fm => {
                return match self.change_time {
                    Some(t) => format!("FM{}", t.format("%d%H%M")),
                    None => "FM".to_string(),
                };
            }
            ChangeIndicator::Prob => {
                let mut head = format!("PROB{}", self.probability.unwrap_or_default());
                if self.tempo {
                    head.push_str(" TEMPO");
                }
                head
            }
            other => other.as_str().to_string(),
        };

        match window {
            Some(window) => format!("{head} {window}"),
            None => head,
        }
    }

    pub fn summary(&self) -> String {
        format!("{}: {}", self.to_taf_format(), self.conditions.summary())
    }
}

impl std::fmt::Display for ForecastPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).single().expect("valid instant")
    }

    #[test]
    fn indicator_codes() {
        assert_eq!(ChangeIndicator::try_from("PROB40").expect("prob"), ChangeIndicator::Prob);
        assert_eq!(ChangeIndicator::try_from("becmg").expect("becmg"), ChangeIndicator::Becmg);
        assert!(ChangeIndicator::try_from("INTER").is_err());
        assert!(ChangeIndicator::Fm.is_permanent());
        assert!(ChangeIndicator::Fm.uses_exact_time());
        assert!(ChangeIndicator::Tempo.requires_time_period());
        assert_eq!(
            ChangeIndicator::Becmg.summary(),
            "BECMG (Becoming): Gradual change over the specified period"
        );
    }

    #[test]
    fn fm_period_is_open_ended() {
        let fm = ForecastPeriod::from(at(15, 18), WeatherConditions::empty()).expect("valid");
        assert!(fm.is_permanent_change());
        assert!(!fm.has_time_range());
        assert!(fm.is_active_at(at(15, 18)));
        assert!(fm.is_active_at(at(16, 6)));
        assert!(!fm.is_active_at(at(15, 17)));
        assert_eq!(fm.to_taf_format(), "FM151800");

        let err = ForecastPeriod::new(
            ChangeIndicator::Fm,
            Some(at(15, 18)),
            Some(at(15, 18)),
            Some(at(15, 20)),
            None,
            false,
            WeatherConditions::empty(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("should not have period start/end"));
    }

    #[test]
    fn windowed_periods_are_half_open() {
        let tempo = ForecastPeriod::tempo(at(15, 20), at(16, 2), WeatherConditions::empty()).expect("valid");
        assert!(tempo.is_temporary_change());
        assert_eq!(tempo.period_duration_hours(), Some(6));
        assert!(tempo.is_active_at(at(15, 20)));
        assert!(!tempo.is_active_at(at(16, 2)));
        assert_eq!(tempo.to_taf_format(), "TEMPO 1520/1602");
    }

    #[test]
    fn change_window_limits() {
        let err = ForecastPeriod::becoming(at(15, 0), at(15, 14), WeatherConditions::empty()).unwrap_err();
        assert!(err.to_string().contains("Forecast period too long (14 hours). Maximum is 12"));

        let err = ForecastPeriod::tempo(at(15, 6), at(15, 6), WeatherConditions::empty()).unwrap_err();
        assert!(err.to_string().contains("must be before"));
    }

    #[test]
    fn probability_rules() {
        let prob = ForecastPeriod::prob_tempo(30, at(16, 0), at(16, 4), WeatherConditions::empty()).expect("valid");
        assert!(prob.is_probabilistic());
        assert!(prob.is_temporary_change());
        assert_eq!(prob.to_taf_format(), "PROB30 TEMPO 1600/1604");

        let err = ForecastPeriod::prob(50, at(16, 0), at(16, 4), WeatherConditions::empty()).unwrap_err();
        assert!(err.to_string().contains("Invalid probability: 50. Must be 30 or 40"));

        let err = ForecastPeriod::new(
            ChangeIndicator::Tempo,
            None,
            Some(at(16, 0)),
            Some(at(16, 4)),
            Some(30),
            false,
            WeatherConditions::empty(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Only PROB forecasts should have probability"));
    }

    #[test]
    fn base_period_summary() {
        let base = ForecastPeriod::base(Some(at(15, 12)), Some(at(16, 12)), WeatherConditions::empty()).expect("valid");
        assert!(base.is_base_forecast());
        assert_eq!(base.effective_start_time(), Some(at(15, 12)));
        assert_eq!(base.summary(), "BASE 1512/1612: No conditions reported");
    }
}
