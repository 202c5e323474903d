//! Error types for decoding and validation.
//!
//! Validation failures carry the exact message of the broken invariant so
//! callers can surface it unchanged. Unknown codes and missing fields are not
//! errors: the former are echoed verbatim, the latter are `None`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeatherError {
    /// A decoded value violates a range, pairing or exclusivity rule.
    #[error("{message}")]
    Validation { message: String },

    #[error("Cannot parse {group} group: {message}")]
    Parse { group: String, message: String },

    #[error("Unknown report type '{value}'. Supported types: METAR, SPECI, TAF.")]
    UnknownReportType { value: String },
}

impl WeatherError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn parse(group: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            group: group.into(),
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

pub type Result<T> = std::result::Result<T, WeatherError>;

/// Fail with a validation error unless `condition` holds.
pub(crate) fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(WeatherError::validation(message()))
    }
}
