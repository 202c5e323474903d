use serde::{Deserialize, Serialize};

use super::{
    AutomatedMaintenanceIndicator, AutomatedStationType, CeilingSecondSite, CloudType, HailSize,
    ObscurationLayer, PeakWind, PrecipitationAmount, PressureTendency, ThunderstormLocation,
    VariableCeiling, VariableVisibility, WeatherEvent, WindShift,
};
use crate::components::{Pressure, Temperature, Visibility};

/// Everything decoded from a METAR remarks section.
///
/// Every field is optional and every list may be empty; build one through
/// [`MetarRemarks::builder`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetarRemarks {
    automated_station_type: Option<AutomatedStationType>,
    sea_level_pressure: Option<Pressure>,
    precise_temperature: Option<Temperature>,
    peak_wind: Option<PeakWind>,
    wind_shift: Option<WindShift>,
    variable_visibility: Option<VariableVisibility>,
    tower_visibility: Option<Visibility>,
    surface_visibility: Option<Visibility>,
    variable_ceiling: Option<VariableCeiling>,
    ceiling_second_site: Option<CeilingSecondSite>,
    obscuration_layers: Vec<ObscurationLayer>,
    cloud_types: Vec<CloudType>,
    hourly_precipitation: Option<PrecipitationAmount>,
    six_hour_precipitation: Option<PrecipitationAmount>,
    twenty_four_hour_precipitation: Option<PrecipitationAmount>,
    hail_size: Option<HailSize>,
    weather_events: Vec<WeatherEvent>,
    thunderstorm_locations: Vec<ThunderstormLocation>,
    pressure_tendency: Option<PressureTendency>,
    six_hour_max_temperature: Option<f64>,
    six_hour_min_temperature: Option<f64>,
    twenty_four_hour_max_temperature: Option<f64>,
    twenty_four_hour_min_temperature: Option<f64>,
    maintenance_indicators: Vec<AutomatedMaintenanceIndicator>,
    free_text: Option<String>,
}

impl MetarRemarks {
    pub fn builder() -> MetarRemarksBuilder {
        MetarRemarksBuilder::default()
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.automated_station_type.is_none()
            && self.sea_level_pressure.is_none()
            && self.precise_temperature.is_none()
            && self.peak_wind.is_none()
            && self.wind_shift.is_none()
            && self.variable_visibility.is_none()
            && self.tower_visibility.is_none()
            && self.surface_visibility.is_none()
            && self.variable_ceiling.is_none()
            && self.ceiling_second_site.is_none()
            && self.obscuration_layers.is_empty()
            && self.cloud_types.is_empty()
            && self.hourly_precipitation.is_none()
            && self.six_hour_precipitation.is_none()
            && self.twenty_four_hour_precipitation.is_none()
            && self.hail_size.is_none()
            && self.weather_events.is_empty()
            && self.thunderstorm_locations.is_empty()
            && self.pressure_tendency.is_none()
            && self.six_hour_max_temperature.is_none()
            && self.six_hour_min_temperature.is_none()
            && self.twenty_four_hour_max_temperature.is_none()
            && self.twenty_four_hour_min_temperature.is_none()
            && self.maintenance_indicators.is_empty()
            && self.free_text.as_deref().is_none_or(|t| t.trim().is_empty())
    }

    pub fn has_precipitation_discriminator(&self) -> bool {
        self.automated_station_type
            .is_some_and(|t| t.has_precipitation_discriminator())
    }

    pub fn has_frontal_passage(&self) -> bool {
        self.wind_shift.is_some_and(|w| w.is_frontal_passage())
    }

    pub fn needs_maintenance(&self) -> bool {
        self.maintenance_indicators.iter().any(|m| m.is_maintenance_check())
    }

    pub fn automated_station_type(&self) -> Option<AutomatedStationType> {
        self.automated_station_type
    }

    pub fn sea_level_pressure(&self) -> Option<&Pressure> {
        self.sea_level_pressure.as_ref()
    }

    /// Temperature and dewpoint to a tenth of a degree, from the `T` group.
    pub fn precise_temperature(&self) -> Option<&Temperature> {
        self.precise_temperature.as_ref()
    }

    pub fn peak_wind(&self) -> Option<&PeakWind> {
        self.peak_wind.as_ref()
    }

    pub fn wind_shift(&self) -> Option<&WindShift> {
        self.wind_shift.as_ref()
    }

    pub fn variable_visibility(&self) -> Option<&VariableVisibility> {
        self.variable_visibility.as_ref()
    }

    pub fn tower_visibility(&self) -> Option<&Visibility> {
        self.tower_visibility.as_ref()
    }

    pub fn surface_visibility(&self) -> Option<&Visibility> {
        self.surface_visibility.as_ref()
    }

    pub fn variable_ceiling(&self) -> Option<&VariableCeiling> {
        self.variable_ceiling.as_ref()
    }

    pub fn ceiling_second_site(&self) -> Option<&CeilingSecondSite> {
        self.ceiling_second_site.as_ref()
    }

    pub fn obscuration_layers(&self) -> &[ObscurationLayer] {
        &self.obscuration_layers
    }

    pub fn cloud_types(&self) -> &[CloudType] {
        &self.cloud_types
    }

    pub fn hourly_precipitation(&self) -> Option<&PrecipitationAmount> {
        self.hourly_precipitation.as_ref()
    }

    /// The `6rrrr` amount; its period is 3 or 6 hours depending on the observation time.
    pub fn six_hour_precipitation(&self) -> Option<&PrecipitationAmount> {
        self.six_hour_precipitation.as_ref()
    }

    pub fn twenty_four_hour_precipitation(&self) -> Option<&PrecipitationAmount> {
        self.twenty_four_hour_precipitation.as_ref()
    }

    pub fn hail_size(&self) -> Option<&HailSize> {
        self.hail_size.as_ref()
    }

    pub fn weather_events(&self) -> &[WeatherEvent] {
        &self.weather_events
    }

    pub fn thunderstorm_locations(&self) -> &[ThunderstormLocation] {
        &self.thunderstorm_locations
    }

    pub fn pressure_tendency(&self) -> Option<&PressureTendency> {
        self.pressure_tendency.as_ref()
    }

    pub fn six_hour_max_temperature(&self) -> Option<f64> {
        self.six_hour_max_temperature
    }

    pub fn six_hour_min_temperature(&self) -> Option<f64> {
        self.six_hour_min_temperature
    }

    pub fn twenty_four_hour_max_temperature(&self) -> Option<f64> {
        self.twenty_four_hour_max_temperature
    }

    pub fn twenty_four_hour_min_temperature(&self) -> Option<f64> {
        self.twenty_four_hour_min_temperature
    }

    pub fn maintenance_indicators(&self) -> &[AutomatedMaintenanceIndicator] {
        &self.maintenance_indicators
    }

    pub fn free_text(&self) -> Option<&str> {
        self.free_text.as_deref()
    }

    fn rendered_parts(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(t) = self.automated_station_type {
            parts.push(format!("{t} ({})", t.description()));
        }
        if let Some(p) = &self.sea_level_pressure {
            parts.push(format!("Sea-level pressure {:.1} hPa", p.to_hectopascals()));
        }
        if let Some(t) = &self.precise_temperature {
            let mut text = String::from("Precise temperature");
            if let Some(c) = t.celsius() {
                text.push_str(&format!(" {c:.1}°C"));
            }
            if let Some(d) = t.dewpoint_celsius() {
                text.push_str(&format!(", dewpoint {d:.1}°C"));
            }
            parts.push(text);
        }
        parts.extend(self.peak_wind.iter().map(PeakWind::summary));
        parts.extend(self.wind_shift.iter().map(WindShift::summary));
        parts.extend(self.variable_visibility.iter().map(VariableVisibility::description));
        if let Some(v) = &self.tower_visibility {
            parts.push(format!("Tower visibility {}", v.summary()));
        }
        if let Some(v) = &self.surface_visibility {
            parts.push(format!("Surface visibility {}", v.summary()));
        }
        parts.extend(self.variable_ceiling.iter().map(VariableCeiling::summary));
        parts.extend(self.ceiling_second_site.iter().map(CeilingSecondSite::summary));
        parts.extend(self.obscuration_layers.iter().map(ObscurationLayer::summary));
        parts.extend(self.cloud_types.iter().map(CloudType::summary));
        for (label, amount) in [
            ("Hourly precipitation", &self.hourly_precipitation),
            ("Period precipitation", &self.six_hour_precipitation),
            ("24-hour precipitation", &self.twenty_four_hour_precipitation),
        ] {
            if let Some(a) = amount {
                parts.push(format!("{label} {}", a.description()));
            }
        }
        if let Some(h) = &self.hail_size {
            parts.push(format!("Hail {}", h.summary()));
        }
        parts.extend(self.weather_events.iter().map(WeatherEvent::summary));
        parts.extend(self.thunderstorm_locations.iter().map(ThunderstormLocation::summary));
        parts.extend(self.pressure_tendency.iter().map(PressureTendency::summary));
        for (label, value) in [
            ("6-hour maximum", self.six_hour_max_temperature),
            ("6-hour minimum", self.six_hour_min_temperature),
            ("24-hour maximum", self.twenty_four_hour_max_temperature),
            ("24-hour minimum", self.twenty_four_hour_min_temperature),
        ] {
            if let Some(v) = value {
                parts.push(format!("{label} {v:.1}°C"));
            }
        }
        parts.extend(self.maintenance_indicators.iter().map(AutomatedMaintenanceIndicator::description));
        if let Some(text) = self.free_text.as_deref().filter(|t| !t.trim().is_empty()) {
            parts.push(format!("Other: {text}"));
        }
        parts
    }
}

impl std::fmt::Display for MetarRemarks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("No remarks");
        }
        f.write_str(&self.rendered_parts().join("; "))
    }
}

/// Accumulates remark values; [`build`](MetarRemarksBuilder::build) freezes them.
#[derive(Debug, Clone, Default)]
pub struct MetarRemarksBuilder {
    remarks: MetarRemarks,
}

impl MetarRemarksBuilder {
    pub fn automated_station_type(mut self, value: AutomatedStationType) -> Self {
        self.remarks.automated_station_type = Some(value);
        self
    }

    pub fn sea_level_pressure(mut self, value: Pressure) -> Self {
        self.remarks.sea_level_pressure = Some(value);
        self
    }

    pub fn precise_temperature(mut self, value: Temperature) -> Self {
        self.remarks.precise_temperature = Some(value);
        self
    }

    pub fn peak_wind(mut self, value: PeakWind) -> Self {
        self.remarks.peak_wind = Some(value);
        self
    }

    pub fn wind_shift(mut self, value: WindShift) -> Self {
        self.remarks.wind_shift = Some(value);
        self
    }

    pub fn variable_visibility(mut self, value: VariableVisibility) -> Self {
        self.remarks.variable_visibility = Some(value);
        self
    }

    pub fn tower_visibility(mut self, value: Visibility) -> Self {
        self.remarks.tower_visibility = Some(value);
        self
    }

    pub fn surface_visibility(mut self, value: Visibility) -> Self {
        self.remarks.surface_visibility = Some(value);
        self
    }

    pub fn variable_ceiling(mut self, value: VariableCeiling) -> Self {
        self.remarks.variable_ceiling = Some(value);
        self
    }

    pub fn ceiling_second_site(mut self, value: CeilingSecondSite) -> Self {
        self.remarks.ceiling_second_site = Some(value);
        self
    }

    pub fn add_obscuration_layer(mut self, value: ObscurationLayer) -> Self {
        self.remarks.obscuration_layers.push(value);
        self
    }

    pub fn add_cloud_type(mut self, value: CloudType) -> Self {
        self.remarks.cloud_types.push(value);
        self
    }

    pub fn hourly_precipitation(mut self, value: PrecipitationAmount) -> Self {
        self.remarks.hourly_precipitation = Some(value);
        self
    }

    pub fn six_hour_precipitation(mut self, value: PrecipitationAmount) -> Self {
        self.remarks.six_hour_precipitation = Some(value);
        self
    }

    pub fn twenty_four_hour_precipitation(mut self, value: PrecipitationAmount) -> Self {
        self.remarks.twenty_four_hour_precipitation = Some(value);
        self
    }

    pub fn hail_size(mut self, value: HailSize) -> Self {
        self.remarks.hail_size = Some(value);
        self
    }

    pub fn add_weather_event(mut self, value: WeatherEvent) -> Self {
        self.remarks.weather_events.push(value);
        self
    }

    pub fn add_thunderstorm_location(mut self, value: ThunderstormLocation) -> Self {
        self.remarks.thunderstorm_locations.push(value);
        self
    }

    pub fn pressure_tendency(mut self, value: PressureTendency) -> Self {
        self.remarks.pressure_tendency = Some(value);
        self
    }

    pub fn six_hour_max_temperature(mut self, celsius: f64) -> Self {
        self.remarks.six_hour_max_temperature = Some(celsius);
        self
    }

    pub fn six_hour_min_temperature(mut self, celsius: f64) -> Self {
        self.remarks.six_hour_min_temperature = Some(celsius);
        self
    }

    pub fn twenty_four_hour_max_temperature(mut self, celsius: f64) -> Self {
        self.remarks.twenty_four_hour_max_temperature = Some(celsius);
        self
    }

    pub fn twenty_four_hour_min_temperature(mut self, celsius: f64) -> Self {
        self.remarks.twenty_four_hour_min_temperature = Some(celsius);
        self
    }

    pub fn add_maintenance_indicator(mut self, value: AutomatedMaintenanceIndicator) -> Self {
        self.remarks.maintenance_indicators.push(value);
        self
    }

    /// Appends to any text already collected, separated by a space.
    pub fn append_free_text(mut self, text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return self;
        }
        match &mut self.remarks.free_text {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(text);
            }
            None => self.remarks.free_text = Some(text.to_string()),
        }
        self
    }

    pub fn free_text(mut self, text: &str) -> Self {
        self.remarks.free_text = Some(text.to_string());
        self
    }

    pub fn build(self) -> MetarRemarks {
        self.remarks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_remarks() {
        let remarks = MetarRemarks::empty();
        assert!(remarks.is_empty());
        assert_eq!(remarks.to_string(), "No remarks");
        assert!(MetarRemarks::builder().free_text("   ").build().is_empty());
    }

    #[test]
    fn any_single_field_makes_it_non_empty() {
        let samples = [
            MetarRemarks::builder().automated_station_type(AutomatedStationType::Ao2),
            MetarRemarks::builder().sea_level_pressure(Pressure::standard()),
            MetarRemarks::builder().hail_size(HailSize::new(0.5).expect("valid")),
            MetarRemarks::builder().six_hour_max_temperature(21.4),
            MetarRemarks::builder().add_maintenance_indicator(AutomatedMaintenanceIndicator::maintenance_check()),
            MetarRemarks::builder().add_cloud_type(CloudType::of("SC").expect("valid")),
            MetarRemarks::builder().append_free_text("LAST"),
        ];
        for builder in samples {
            assert!(!builder.build().is_empty());
        }
    }

    #[test]
    fn flags() {
        let remarks = MetarRemarks::builder()
            .automated_station_type(AutomatedStationType::Ao2)
            .wind_shift(WindShift::new(Some(15), Some(30), true).expect("valid"))
            .add_maintenance_indicator(AutomatedMaintenanceIndicator::maintenance_check())
            .build();
        assert!(remarks.has_precipitation_discriminator());
        assert!(remarks.has_frontal_passage());
        assert!(remarks.needs_maintenance());

        let plain = MetarRemarks::builder()
            .automated_station_type(AutomatedStationType::Ao1)
            .build();
        assert!(!plain.has_precipitation_discriminator());
        assert!(!plain.has_frontal_passage());
        assert!(!plain.needs_maintenance());
    }

    #[test]
    fn rendering_order_is_fixed() {
        let remarks = MetarRemarks::builder()
            .append_free_text("LAST")
            .add_maintenance_indicator(AutomatedMaintenanceIndicator::maintenance_check())
            .hail_size(HailSize::new(1.0).expect("valid"))
            .sea_level_pressure(Pressure::hectopascals(1013.2).expect("valid"))
            .automated_station_type(AutomatedStationType::Ao2)
            .build();
        let text = remarks.to_string();
        let pos = |needle: &str| text.find(needle).expect("rendered part present");
        assert!(text.starts_with("AO2"));
        assert!(pos("AO2") < pos("Sea-level pressure"));
        assert!(pos("Sea-level pressure") < pos("Hail"));
        assert!(pos("Hail") < pos("Station requires maintenance"));
        assert!(text.ends_with("Other: LAST"));
    }

    #[test]
    fn free_text_accumulates() {
        let remarks = MetarRemarks::builder()
            .append_free_text("FIRST")
            .append_free_text(" ")
            .append_free_text("SECOND")
            .build();
        assert_eq!(remarks.free_text(), Some("FIRST SECOND"));
    }

    #[test]
    fn builder_lists_are_owned_by_the_snapshot() {
        let builder = MetarRemarks::builder().add_cloud_type(CloudType::of("SC").expect("valid"));
        let first = builder.clone().build();
        let second = builder
            .add_cloud_type(CloudType::of("CI").expect("valid"))
            .build();
        assert_eq!(first.cloud_types().len(), 1);
        assert_eq!(second.cloud_types().len(), 2);
    }
}
