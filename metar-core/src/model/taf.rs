use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    components::{Temperature, ValidityPeriod},
    model::{ChangeIndicator, ForecastPeriod, Report, ReportBase, ReportKind},
};

/// A decoded terminal aerodrome forecast.
///
/// Forecast periods stay in document order: the base forecast first, then
/// change groups as they appear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TafReport {
    base: ReportBase,
    issue_time: Option<DateTime<Utc>>,
    validity: Option<ValidityPeriod>,
    amended: Option<bool>,
    corrected: Option<bool>,
    forecast_periods: Vec<ForecastPeriod>,
    forecast_temperature: Option<Temperature>,
    unparsed: Vec<String>,
}

impl TafReport {
    pub fn new(base: ReportBase, issue_time: Option<DateTime<Utc>>, validity: Option<ValidityPeriod>) -> Self {
        Self {
            base,
            issue_time,
            validity,
            amended: None,
            corrected: None,
            forecast_periods: Vec::new(),
            forecast_temperature: None,
            unparsed: Vec::new(),
        }
    }

    pub fn with_amended(mut self, amended: bool) -> Self {
        self.amended = Some(amended);
        self
    }

    pub fn with_corrected(mut self, corrected: bool) -> Self {
        self.corrected = Some(corrected);
        self
    }

    pub fn add_forecast_period(mut self, period: ForecastPeriod) -> Self {
        self.forecast_periods.push(period);
        self
    }

    /// `TX`/`TN` extremes, each paired with its time.
    pub fn with_forecast_temperature(mut self, temperature: Temperature) -> Self {
        self.forecast_temperature = Some(temperature);
        self
    }

    /// Groups that matched no grammar, in document order.
    pub fn with_unparsed(mut self, tokens: Vec<String>) -> Self {
        self.unparsed = tokens;
        self
    }

    pub fn issue_time(&self) -> Option<DateTime<Utc>> {
        self.issue_time
    }

    pub fn validity(&self) -> Option<&ValidityPeriod> {
        self.validity.as_ref()
    }

    pub fn amended(&self) -> Option<bool> {
        self.amended
    }

    pub fn corrected(&self) -> Option<bool> {
        self.corrected
    }

    pub fn forecast_periods(&self) -> &[ForecastPeriod] {
        &self.forecast_periods
    }

    pub fn forecast_temperature(&self) -> Option<&Temperature> {
        self.forecast_temperature.as_ref()
    }

    pub fn unparsed(&self) -> &[String] {
        &self.unparsed
    }

    pub fn max_temperature(&self) -> Option<(f64, DateTime<Utc>)> {
        let t = self.forecast_temperature.as_ref()?;
        t.max_forecast_celsius().zip(t.max_forecast_time())
    }

    pub fn min_temperature(&self) -> Option<(f64, DateTime<Utc>)> {
        let t = self.forecast_temperature.as_ref()?;
        t.min_forecast_celsius().zip(t.min_forecast_time())
    }

    pub fn is_amended(&self) -> bool {
        self.amended == Some(true)
    }

    pub fn is_corrected(&self) -> bool {
        self.corrected == Some(true)
    }

    /// Only an explicit `true` flag counts.
    pub fn is_modified(&self) -> bool {
        self.is_amended() || self.is_corrected()
    }

    pub fn base_forecast(&self) -> Option<&ForecastPeriod> {
        self.forecast_periods.iter().find(|p| p.is_base_forecast())
    }

    pub fn change_groups(&self) -> impl Iterator<Item = &ForecastPeriod> {
        self.forecast_periods.iter().filter(|p| !p.is_base_forecast())
    }

    pub fn periods_of(&self, indicator: ChangeIndicator) -> impl Iterator<Item = &ForecastPeriod> {
        self.forecast_periods
            .iter()
            .filter(move |p| p.change_indicator() == indicator)
    }

    pub fn periods_active_at(&self, time: DateTime<Utc>) -> Vec<&ForecastPeriod> {
        self.forecast_periods.iter().filter(|p| p.is_active_at(time)).collect()
    }

    pub fn has_significant_weather_forecast(&self) -> bool {
        self.forecast_periods.iter().any(ForecastPeriod::has_significant_weather)
    }

    pub fn summary(&self) -> String {
        let mut header = String::from("TAF");
        if self.is_amended() {
            header.push_str(" AMD");
        }
        if self.is_corrected() {
            header.push_str(" COR");
        }
        header.push(' ');
        header.push_str(self.base.station_id());
        if let Some(validity) = &self.validity {
            header.push(' ');
            header.push_str(&validity.to_taf_format());
        }
        header.push_str(&format!(" ({} periods)", self.forecast_periods.len()));

        let mut extremes = Vec::new();
        if let Some((max, _)) = self.max_temperature() {
            extremes.push(format!("TX{max:.0}"));
        }
        if let Some((min, _)) = self.min_temperature() {
            extremes.push(format!("TN{min:.0}"));
        }
        if !extremes.is_empty() {
            header.push_str(&format!(" [{}]", extremes.join(" ")));
        }

        let mut lines = vec![header];
        lines.extend(self.forecast_periods.iter().map(|p| format!("  {}", p.summary())));
        lines.join("\n")
    }
}

impl Report for TafReport {
    fn base(&self) -> &ReportBase {
        &self.base
    }

    fn report_type(&self) -> ReportKind {
        ReportKind::Taf
    }

    /// `valid_from <= now < valid_to`; a forecast without validity is never current.
    fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.validity.as_ref().is_some_and(|v| v.contains(now))
    }

    fn summary(&self) -> String {
        TafReport::summary(self)
    }
}

impl std::fmt::Display for TafReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}
