//! Value types for the groups that follow `RMK`, and their aggregate.

pub mod ceiling;
pub mod cloud_type;
pub mod hail;
pub mod maintenance;
pub mod obscuration;
pub mod peak_wind;
pub mod precipitation;
pub mod pressure_tendency;
pub mod remarks;
pub mod station_type;
pub mod thunderstorm;
pub mod variable_visibility;
pub mod weather_event;
pub mod wind_shift;

pub use ceiling::{CeilingSecondSite, VariableCeiling};
pub use cloud_type::CloudType;
pub use hail::HailSize;
pub use maintenance::{AutomatedMaintenanceIndicator, MaintenanceIndicatorType};
pub use obscuration::ObscurationLayer;
pub use peak_wind::PeakWind;
pub use precipitation::PrecipitationAmount;
pub use pressure_tendency::PressureTendency;
pub use remarks::{MetarRemarks, MetarRemarksBuilder};
pub use station_type::AutomatedStationType;
pub use thunderstorm::ThunderstormLocation;
pub use variable_visibility::VariableVisibility;
pub use weather_event::WeatherEvent;
pub use wind_shift::WindShift;

use crate::error::{Result, ensure};

/// Hour 0-23 and minute 0-59, each optional.
pub(crate) fn ensure_clock(hour: Option<i32>, minute: Option<i32>) -> Result<()> {
    if let Some(h) = hour {
        ensure((0..=23).contains(&h), || format!("Hour must be between 0 and 23: {h}"))?;
    }
    if let Some(m) = minute {
        ensure((0..=59).contains(&m), || format!("Minute must be between 0 and 59: {m}"))?;
    }
    Ok(())
}
