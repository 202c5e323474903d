use serde::{Deserialize, Serialize};

use super::ensure_clock;
use crate::error::Result;

/// `WSHFT (hh)mm [FROPA]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindShift {
    hour: Option<i32>,
    minute: Option<i32>,
    frontal_passage: bool,
}

impl WindShift {
    pub fn new(hour: Option<i32>, minute: Option<i32>, frontal_passage: bool) -> Result<Self> {
        ensure_clock(hour, minute)?;
        Ok(Self {
            hour,
            minute,
            frontal_passage,
        })
    }

    pub fn hour(&self) -> Option<i32> {
        self.hour
    }

    pub fn minute(&self) -> Option<i32> {
        self.minute
    }

    pub fn is_frontal_passage(&self) -> bool {
        self.frontal_passage
    }

    pub fn summary(&self) -> String {
        let time = match (self.hour, self.minute) {
            (Some(h), Some(m)) => format!(" at {h:02}:{m:02}"),
            (None, Some(m)) => format!(" at :{m:02}"),
            _ => String::new(),
        };
        let fropa = if self.frontal_passage { " (frontal passage)" } else { "" };
        format!("Wind shift{time}{fropa}")
    }
}

impl std::fmt::Display for WindShift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}
