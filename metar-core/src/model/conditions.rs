use serde::{Deserialize, Serialize};

use crate::components::{PresentWeather, Pressure, SkyCondition, Temperature, Visibility, VisibilityUnit, Wind};

const IMC_CEILING_FEET: i32 = 1000;
const IMC_VISIBILITY_SM: f64 = 3.0;
const IMC_VISIBILITY_KM: f64 = 5.0;

/// The set of observed or forecast conditions carried by a TAF period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherConditions {
    wind: Option<Wind>,
    visibility: Option<Visibility>,
    present_weather: Vec<PresentWeather>,
    sky_conditions: Vec<SkyCondition>,
    temperature: Option<Temperature>,
    pressure: Option<Pressure>,
}

impl WeatherConditions {
    pub fn builder() -> WeatherConditionsBuilder {
        WeatherConditionsBuilder::default()
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of_basic(wind: Wind, visibility: Visibility, sky_conditions: Vec<SkyCondition>) -> Self {
        Self {
            wind: Some(wind),
            visibility: Some(visibility),
            sky_conditions,
            ..Self::default()
        }
    }

    pub fn wind(&self) -> Option<&Wind> {
        self.wind.as_ref()
    }

    pub fn visibility(&self) -> Option<&Visibility> {
        self.visibility.as_ref()
    }

    pub fn present_weather(&self) -> &[PresentWeather] {
        &self.present_weather
    }

    pub fn sky_conditions(&self) -> &[SkyCondition] {
        &self.sky_conditions
    }

    pub fn temperature(&self) -> Option<&Temperature> {
        self.temperature.as_ref()
    }

    pub fn pressure(&self) -> Option<&Pressure> {
        self.pressure.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_any_conditions()
    }

    pub fn has_any_conditions(&self) -> bool {
        self.wind.is_some()
            || self.visibility.is_some()
            || !self.present_weather.is_empty()
            || !self.sky_conditions.is_empty()
            || self.temperature.is_some()
            || self.pressure.is_some()
    }

    /// Calm wind, unrestricted visibility and clear sky, with no weather.
    pub fn is_clear_and_calm(&self) -> bool {
        let calm = self.wind.as_ref().is_some_and(Wind::is_calm);
        let clear_vis = self.visibility.as_ref().is_some_and(Visibility::is_unlimited);
        let clear_sky = self.sky_conditions.is_empty() || self.sky_conditions.iter().all(SkyCondition::is_clear);
        calm && clear_vis && clear_sky && self.present_weather.is_empty()
    }

    pub fn has_ceiling(&self) -> bool {
        self.sky_conditions.iter().any(SkyCondition::is_ceiling)
    }

    /// Lowest broken, overcast or vertical-visibility layer.
    pub fn ceiling_feet(&self) -> Option<i32> {
        lowest_ceiling(&self.sky_conditions)
    }

    pub fn has_precipitation(&self) -> bool {
        self.present_weather.iter().any(PresentWeather::has_precipitation)
    }

    pub fn has_thunderstorms(&self) -> bool {
        self.present_weather.iter().any(PresentWeather::is_thunderstorm)
    }

    pub fn has_freezing_conditions(&self) -> bool {
        self.present_weather.iter().any(PresentWeather::is_freezing)
            || self.temperature.as_ref().is_some_and(Temperature::is_freezing)
    }

    /// Visibility under 3 SM (5 km when reported in kilometers) or ceiling under 1000 ft.
    pub fn is_likely_imc(&self) -> bool {
        let low_visibility = self.visibility.as_ref().is_some_and(|v| {
            if v.is_cavok() {
                return false;
            }
            match v.unit() {
                Some(VisibilityUnit::Kilometers) => v.distance().is_some_and(|km| km < IMC_VISIBILITY_KM),
                _ => v.to_statute_miles().is_some_and(|sm| sm < IMC_VISIBILITY_SM),
            }
        });
        let low_ceiling = self.ceiling_feet().is_some_and(|c| c < IMC_CEILING_FEET);
        low_visibility || low_ceiling
    }

    pub fn is_likely_vmc(&self) -> bool {
        self.has_any_conditions() && !self.is_likely_imc()
    }

    /// True when any weather is reported or a convective layer is forecast.
    pub fn has_significant_weather(&self) -> bool {
        self.present_weather.iter().any(|wx| !wx.is_no_significant_weather())
            || self.sky_conditions.iter().any(SkyCondition::is_convective)
    }

    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(wind) = &self.wind {
            parts.push(format!("Wind: {wind}"));
        }
        if let Some(vis) = &self.visibility {
            parts.push(format!("Vis: {vis}"));
        }
        if !self.present_weather.is_empty() {
            let codes: Vec<String> = self.present_weather.iter().map(PresentWeather::description).collect();
            parts.push(format!("Weather: {}", codes.join(", ")));
        }
        if !self.sky_conditions.is_empty() {
            let layers: Vec<String> = self.sky_conditions.iter().map(SkyCondition::summary).collect();
            parts.push(format!("Sky: {}", layers.join(", ")));
        }
        if let Some(temp) = &self.temperature {
            parts.push(format!("Temp: {temp}"));
        }
        if let Some(pressure) = &self.pressure {
            parts.push(format!("Press: {pressure}"));
        }

        if parts.is_empty() {
            "No conditions reported".to_string()
        } else {
            parts.join("; ")
        }
    }
}

impl std::fmt::Display for WeatherConditions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

pub(crate) fn lowest_ceiling(layers: &[SkyCondition]) -> Option<i32> {
    layers
        .iter()
        .filter(|layer| layer.is_ceiling())
        .filter_map(SkyCondition::height_feet)
        .min()
}

#[derive(Debug, Clone, Default)]
pub struct WeatherConditionsBuilder {
    inner: WeatherConditions,
}

impl WeatherConditionsBuilder {
    pub fn wind(mut self, wind: Wind) -> Self {
        self.inner.wind = Some(wind);
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.inner.visibility = Some(visibility);
        self
    }

    pub fn add_present_weather(mut self, weather: PresentWeather) -> Self {
        self.inner.present_weather.push(weather);
        self
    }

    pub fn present_weather(mut self, weather: Vec<PresentWeather>) -> Self {
        self.inner.present_weather = weather;
        self
    }

    pub fn add_sky_condition(mut self, layer: SkyCondition) -> Self {
        self.inner.sky_conditions.push(layer);
        self
    }

    pub fn sky_conditions(mut self, layers: Vec<SkyCondition>) -> Self {
        self.inner.sky_conditions = layers;
        self
    }

    pub fn temperature(mut self, temperature: Temperature) -> Self {
        self.inner.temperature = Some(temperature);
        self
    }

    pub fn pressure(mut self, pressure: Pressure) -> Self {
        self.inner.pressure = Some(pressure);
        self
    }

    pub fn build(self) -> WeatherConditions {
        self.inner
    }
}
