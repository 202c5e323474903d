use serde::{Deserialize, Serialize};

use crate::error::{Result, ensure};

const EARTH_RADIUS_KM: f64 = 6371.0;
const FEET_TO_METERS: f64 = 0.3048;

/// Station position. Elevation is kept in whole meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLocation {
    latitude: f64,
    longitude: f64,
    elevation_meters: Option<i32>,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64, elevation_meters: Option<i32>) -> Result<Self> {
        ensure((-90.0..=90.0).contains(&latitude), || {
            format!("Latitude must be between -90 and 90, got: {latitude:.4}")
        })?;
        ensure((-180.0..=180.0).contains(&longitude), || {
            format!("Longitude must be between -180 and 180, got: {longitude:.4}")
        })?;

        Ok(Self {
            latitude,
            longitude,
            elevation_meters,
        })
    }

    pub fn of(latitude: f64, longitude: f64) -> Result<Self> {
        Self::new(latitude, longitude, None)
    }

    pub fn from_feet(latitude: f64, longitude: f64, elevation_feet: i32) -> Result<Self> {
        let meters = (f64::from(elevation_feet) * FEET_TO_METERS).round() as i32;
        Self::new(latitude, longitude, Some(meters))
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn elevation_meters(&self) -> Option<i32> {
        self.elevation_meters
    }

    pub fn elevation_feet(&self) -> Option<i32> {
        self.elevation_meters
            .map(|m| (f64::from(m) / FEET_TO_METERS).round() as i32)
    }

    /// Great-circle distance in kilometers (haversine).
    pub fn distance_to(&self, other: &GeoLocation) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos() * other.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }

    pub fn summary(&self) -> String {
        match self.elevation_meters {
            Some(m) => format!("{:.4}, {:.4} ({m} m)", self.latitude, self.longitude),
            None => format!("{:.4}, {:.4}", self.latitude, self.longitude),
        }
    }
}

impl std::fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}
