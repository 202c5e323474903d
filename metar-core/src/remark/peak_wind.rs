use serde::{Deserialize, Serialize};

use super::ensure_clock;
use crate::{
    components::cardinal_point,
    error::{Result, ensure},
};

const KNOTS_TO_MPH: f64 = 1.1508;

/// `PK WND dddff/hhmm`: strongest gust since the last routine report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakWind {
    direction_degrees: Option<i32>,
    speed_knots: Option<i32>,
    hour: Option<i32>,
    minute: Option<i32>,
}

impl PeakWind {
    pub fn new(
        direction_degrees: Option<i32>,
        speed_knots: Option<i32>,
        hour: Option<i32>,
        minute: Option<i32>,
    ) -> Result<Self> {
        if let Some(d) = direction_degrees {
            ensure((0..=360).contains(&d), || {
                format!("Peak wind direction must be between 0 and 360 degrees: {d}")
            })?;
        }
        if let Some(s) = speed_knots {
            ensure(s >= 0, || format!("Peak wind speed cannot be negative: {s}"))?;
        }
        ensure_clock(hour, minute)?;

        Ok(Self {
            direction_degrees,
            speed_knots,
            hour,
            minute,
        })
    }

    pub fn direction_degrees(&self) -> Option<i32> {
        self.direction_degrees
    }

    pub fn speed_knots(&self) -> Option<i32> {
        self.speed_knots
    }

    pub fn hour(&self) -> Option<i32> {
        self.hour
    }

    pub fn minute(&self) -> Option<i32> {
        self.minute
    }

    pub fn to_mph(&self) -> Option<f64> {
        self.speed_knots.map(|kt| (f64::from(kt) * KNOTS_TO_MPH).round())
    }

    pub fn cardinal_direction(&self) -> &'static str {
        self.direction_degrees
            .map(|d| cardinal_point(f64::from(d)))
            .unwrap_or("UNKNOWN")
    }

    pub fn summary(&self) -> String {
        let mut out = String::from("Peak wind");
        if let Some(d) = self.direction_degrees {
            out.push_str(&format!(" {d:03}° ({})", self.cardinal_direction()));
        }
        if let Some(s) = self.speed_knots {
            out.push_str(&format!(" at {s} KT"));
        }
        if let Some(m) = self.minute {
            match self.hour {
                Some(h) => out.push_str(&format!(" at {h:02}:{m:02}")),
                None => out.push_str(&format!(" at :{m:02}")),
            }
        }
        out
    }
}

impl std::fmt::Display for PeakWind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}
