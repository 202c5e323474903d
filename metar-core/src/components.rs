//! Self-validating value objects decoded from single report groups.

pub mod present_weather;
pub mod pressure;
pub mod runway;
pub mod sky;
pub mod temperature;
pub mod validity;
pub mod visibility;
pub mod wind;

pub use present_weather::PresentWeather;
pub use pressure::{Pressure, PressureUnit};
pub use runway::{RunwayVisualRange, RvrPrefix, RvrTrend};
pub use sky::{SkyCondition, SkyCoverage};
pub use temperature::Temperature;
pub use validity::ValidityPeriod;
pub use visibility::{SpecialCondition, Visibility, VisibilityUnit};
pub use wind::{Wind, WindUnit};

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW", "NNW",
];

/// Sixteen-point compass name for a bearing in degrees.
pub(crate) fn cardinal_point(degrees: f64) -> &'static str {
    let sector = (degrees.rem_euclid(360.0) / 22.5).round() as usize % COMPASS_POINTS.len();
    COMPASS_POINTS[sector]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compass_wraps_at_north() {
        assert_eq!(cardinal_point(0.0), "N");
        assert_eq!(cardinal_point(11.0), "N");
        assert_eq!(cardinal_point(12.0), "NNE");
        assert_eq!(cardinal_point(270.0), "W");
        assert_eq!(cardinal_point(355.0), "N");
        assert_eq!(cardinal_point(360.0), "N");
    }
}
