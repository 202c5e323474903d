//! Core library for the `metar` CLI.
//!
//! This crate defines:
//! - Validated value objects for METAR/SPECI/TAF groups (wind, visibility, sky, ...)
//! - The METAR remarks model and its decoder
//! - Report aggregates (observations and forecasts) behind the [`Report`] trait
//! - Parsers from raw report text, plus decoder configuration
//!
//! It is used by `metar-cli`, but can also be reused by ingestion services.

pub mod components;
pub mod config;
pub mod decoder;
pub mod error;
pub mod model;
pub mod parser;
pub mod patterns;
pub mod remark;

pub use config::{Config, OutputFormat};
pub use error::{Result, WeatherError};
pub use model::{
    ChangeIndicator, FlightCategory, ForecastPeriod, GeoLocation, MetarReport, QualityFlags, Report, ReportBase,
    ReportKind, ReportModifier, TafReport, WeatherConditions, WeatherReport,
};
pub use parser::{MetarParser, ReportParser, TafParser, detect_kind, parse_report, parser_for};
pub use remark::MetarRemarks;
